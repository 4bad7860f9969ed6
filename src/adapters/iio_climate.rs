//! DHT22 climate sensor via the Linux IIO `dht11` driver.
//!
//! The kernel driver does the single-wire bit decoding; this adapter only
//! reads the two processed channels of the device directory:
//!
//! - `in_temp_input`: milli-degrees Celsius
//! - `in_humidityrelative_input`: milli-percent relative humidity
//!
//! Each read triggers a fresh conversion in the driver.  The driver
//! answers `EIO`/`ETIMEDOUT` when the sensor misses its handshake, which
//! surfaces here as [`SensorError::ReadFailed`].

use std::fs;
use std::path::PathBuf;

use log::debug;

use crate::app::ports::{ClimateReading, ClimateSensorPort};
use crate::error::SensorError;

pub struct IioClimateSensor {
    device: PathBuf,
}

impl IioClimateSensor {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self { device: device.into() }
    }

    fn read_milli(&self, channel: &str) -> Result<f32, SensorError> {
        let text = fs::read_to_string(self.device.join(channel)).map_err(|e| {
            debug!("iio: {}: {}", channel, e);
            SensorError::ReadFailed
        })?;
        let milli: i32 = text.trim().parse().map_err(|_| SensorError::Malformed)?;
        Ok(milli as f32 / 1000.0)
    }
}

impl ClimateSensorPort for IioClimateSensor {
    fn read_once(&mut self) -> Result<ClimateReading, SensorError> {
        let temperature_c = self.read_milli("in_temp_input")?;
        let humidity_pct = self.read_milli("in_humidityrelative_input")?;
        Ok(ClimateReading {
            temperature_c,
            humidity_pct,
        })
    }
}
