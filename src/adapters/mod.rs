//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                    |
//! |---------------|---------------------|--------------------------------|
//! | `sysfs_gpio`  | GpioPort            | `/sys/class/gpio` file API     |
//! | `iio_climate` | ClimateSensorPort   | Linux IIO `dht11` driver       |
//! | `sim`         | GpioPort            | In-memory pin table            |
//! |               | ClimateSensorPort   | Scripted readings              |
//! | `log_sink`    | StatusSink          | `log` output                   |

pub mod iio_climate;
pub mod log_sink;
pub mod sim;
pub mod sysfs_gpio;
