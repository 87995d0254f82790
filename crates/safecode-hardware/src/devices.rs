//! Enum wrapper for pin driver dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn PinDriver>`
//! is not available. [`AnyPinDriver`] gives the binary a single concrete
//! type while the backend is still chosen at runtime, and hardware backends
//! stay behind cargo features.
//!
//! # Examples
//!
//! ```
//! use safecode_hardware::devices::AnyPinDriver;
//! use safecode_hardware::mock::MockPins;
//!
//! let (pins, _handle) = MockPins::new();
//! let driver = AnyPinDriver::Mock(pins);
//! assert!(driver.is_mock());
//! ```

use safecode_core::{Pin, PinLevel};

#[cfg(feature = "hardware-labjack")]
use crate::labjack::LabJackU3;
use crate::mock::MockPins;
use crate::traits::PinDriver;
use crate::{DeviceInfo, Result};

/// Enum wrapper for pin driver dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyPinDriver {
    /// Mock driver for development, dry runs and testing.
    Mock(MockPins),

    /// LabJack U3 over USB.
    #[cfg(feature = "hardware-labjack")]
    LabJack(LabJackU3),
}

impl AnyPinDriver {
    /// Whether this wraps the mock driver.
    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }
}

impl PinDriver for AnyPinDriver {
    async fn configure(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.configure().await,
            #[cfg(feature = "hardware-labjack")]
            Self::LabJack(device) => device.configure().await,
        }
    }

    async fn set_pin(&mut self, pin: Pin, level: PinLevel) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_pin(pin, level).await,
            #[cfg(feature = "hardware-labjack")]
            Self::LabJack(device) => device.set_pin(pin, level).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            #[cfg(feature = "hardware-labjack")]
            Self::LabJack(device) => device.get_info().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_driver_forwards_to_mock() {
        let (pins, handle) = MockPins::new();
        let mut driver = AnyPinDriver::Mock(pins);

        driver.configure().await.unwrap();
        driver.set_pin(Pin::EXECUTE, PinLevel::Closed).await.unwrap();

        assert!(handle.is_configured());
        assert_eq!(handle.level(Pin::EXECUTE), Some(PinLevel::Closed));
        assert_eq!(driver.get_info().await.unwrap().model, "Mock Pins v1.0");
    }
}
