//! Error types for hardware operations.
//!
//! This module defines error types specific to driving the panel lines,
//! covering device initialization, individual pin writes, and loss of
//! synchronization between the in-memory model and the physical panel.

use safecode_core::{Pin, PinLevel};

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
///
/// Every variant is fatal for the current run. Button presses are not
/// idempotent, so nothing in this crate retries a failed operation.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device could not be acquired or configured at startup.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// A single digital output write failed.
    #[error("Failed to drive pin {pin} {level}: {message}")]
    PinWrite {
        pin: Pin,
        level: PinLevel,
        message: String,
    },

    /// An earlier failure left the panel model out of step with the device.
    ///
    /// Cleared only by a successful reset of the panel.
    #[error("Panel state is desynchronized from the device; reset required")]
    Desynchronized,

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// A line or position outside the panel geometry was addressed.
    #[error("Invalid line: {0}")]
    InvalidLine(#[from] safecode_core::Error),
}

impl HardwareError {
    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new pin write error.
    pub fn pin_write(pin: Pin, level: PinLevel, message: impl Into<String>) -> Self {
        Self::PinWrite {
            pin,
            level,
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialization_failed_error() {
        let error = HardwareError::initialization_failed("no LabJack found");
        assert!(matches!(error, HardwareError::InitializationFailed { .. }));
        assert_eq!(error.to_string(), "Initialization failed: no LabJack found");
    }

    #[test]
    fn test_pin_write_error() {
        let error = HardwareError::pin_write(Pin::EXECUTE, PinLevel::Closed, "stall");
        assert!(matches!(error, HardwareError::PinWrite { .. }));
        assert_eq!(error.to_string(), "Failed to drive pin 4 closed: stall");
    }

    #[test]
    fn test_desynchronized_error() {
        let error = HardwareError::Desynchronized;
        assert!(error.to_string().contains("reset required"));
    }

    #[test]
    fn test_communication_error() {
        let error = HardwareError::communication("Bad checksum");
        assert!(matches!(error, HardwareError::CommunicationError { .. }));
        assert_eq!(error.to_string(), "Communication error: Bad checksum");
    }

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("LabJack U3");
        assert!(matches!(error, HardwareError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: LabJack U3");
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            HardwareError::disconnected("U3"),
            HardwareError::initialization_failed("config"),
            HardwareError::Desynchronized,
        ];

        for error in errors {
            let _ = format!("{}", error);
            let _ = format!("{:?}", error);
        }
    }
}
