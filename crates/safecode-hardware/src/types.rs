//! Driver identification.

use std::fmt;

use serde::{Deserialize, Serialize};

use safecode_core::constants::PIN_COUNT;

/// What is driving the panel lines.
///
/// Logged once when the panel is initialized so a run's log shows whether
/// real hardware was touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Driver name, e.g. "LabJack U3".
    pub name: String,

    /// Hardware model or mock revision.
    pub model: String,

    /// Output lines the driver controls.
    pub lines: usize,

    /// True when no physical panel is attached.
    pub simulated: bool,

    pub serial_number: Option<String>,
}

impl DeviceInfo {
    /// Describe a hardware driver for the full five-line panel.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            lines: PIN_COUNT,
            simulated: false,
            serial_number: None,
        }
    }

    /// Mark the driver as a simulation.
    pub fn simulated(mut self) -> Self {
        self.simulated = true;
        self
    }

    /// Set the serial number.
    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {} lines", self.name, self.model, self.lines)?;
        if let Some(serial) = &self.serial_number {
            write!(f, ", serial {serial}")?;
        }
        if self.simulated {
            write!(f, ", simulated")?;
        }
        write!(f, ")")
    }
}
