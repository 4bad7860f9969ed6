//! GPIO pin assignments for the fire-monitor carrier board.
//!
//! Single source of truth for the factory wiring.  The numbers are Linux
//! GPIO line numbers (sysfs numbering), not header positions.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ---------------------------------------------------------------------------
// Flame / smoke detector inputs (active HIGH)
// ---------------------------------------------------------------------------

/// Digital detector inputs, polled in this order.
pub const FLAME_INPUT_GPIOS: [u32; 5] = [66, 67, 69, 68, 45];

// ---------------------------------------------------------------------------
// Buzzer output (active HIGH)
// ---------------------------------------------------------------------------

/// Digital output driving the buzzer transistor.
pub const BUZZER_GPIO: u32 = 26;

/// Upper bound on detector inputs (stack-allocated).
pub const MAX_INPUT_PINS: usize = 16;

const _: () = assert!(FLAME_INPUT_GPIOS.len() <= MAX_INPUT_PINS);

/// Ordered set of distinct input pins plus the single buzzer output.
///
/// Invariants, checked by [`PinSet::new`]:
/// - at least one input,
/// - inputs are distinct,
/// - the output is not one of the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPinSet", into = "RawPinSet")]
pub struct PinSet {
    inputs: Vec<u32, MAX_INPUT_PINS>,
    output: u32,
}

impl PinSet {
    pub fn new(inputs: &[u32], output: u32) -> Result<Self, Error> {
        if inputs.is_empty() {
            return Err(Error::Config("no input pins configured"));
        }
        let mut set: Vec<u32, MAX_INPUT_PINS> = Vec::new();
        for &pin in inputs {
            if set.contains(&pin) {
                return Err(Error::Config("duplicate input pin"));
            }
            set.push(pin)
                .map_err(|_| Error::Config("too many input pins"))?;
        }
        if set.contains(&output) {
            return Err(Error::Config("output pin is also an input pin"));
        }
        Ok(Self {
            inputs: set,
            output,
        })
    }

    pub fn inputs(&self) -> &[u32] {
        &self.inputs
    }

    pub fn output(&self) -> u32 {
        self.output
    }
}

impl Default for PinSet {
    fn default() -> Self {
        Self {
            inputs: Vec::from_slice(&FLAME_INPUT_GPIOS).expect("factory inputs fit MAX_INPUT_PINS"),
            output: BUZZER_GPIO,
        }
    }
}

/// Unchecked wire form, validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawPinSet {
    inputs: Vec<u32, MAX_INPUT_PINS>,
    output: u32,
}

impl TryFrom<RawPinSet> for PinSet {
    type Error = Error;

    fn try_from(raw: RawPinSet) -> Result<Self, Self::Error> {
        Self::new(&raw.inputs, raw.output)
    }
}

impl From<PinSet> for RawPinSet {
    fn from(p: PinSet) -> Self {
        Self {
            inputs: p.inputs,
            output: p.output,
        }
    }
}
