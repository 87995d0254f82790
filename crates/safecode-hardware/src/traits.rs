//! Hardware capability trait definitions.
//!
//! This module defines the two capabilities the control loop consumes: a
//! digital output driver that can set one line at a time, and a clock that
//! can suspend the flow of control for a requested duration. Both are
//! injected, so tests substitute the mocks from [`crate::mock`] and assert
//! on recorded writes and requested waits instead of real hardware and
//! elapsed time.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use safecode_core::{Pin, PinLevel};

use crate::error::Result;
use crate::types::DeviceInfo;

/// Digital output driver abstraction.
///
/// Represents a device that drives the five panel lines (presets 0-3 and
/// execute 4). Levels are inverted: [`PinLevel::Closed`] writes `0` and
/// presses the button, [`PinLevel::Open`] writes `1` and releases it.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. For dynamic selection of a backend at runtime, use the enum
/// wrapper [`AnyPinDriver`](crate::devices::AnyPinDriver).
///
/// # Examples
///
/// ```no_run
/// use safecode_core::{Pin, PinLevel};
/// use safecode_hardware::traits::PinDriver;
/// use safecode_hardware::error::Result;
///
/// async fn release_all<D: PinDriver>(driver: &mut D) -> Result<()> {
///     for pin in Pin::ALL {
///         driver.set_pin(pin, PinLevel::Open).await?;
///     }
///     Ok(())
/// }
/// ```
pub trait PinDriver: Send + Sync {
    /// Prepare the device for use.
    ///
    /// Configures every panel line as a digital output. Called once before
    /// the first write.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InitializationFailed`](crate::HardwareError::InitializationFailed)
    /// if the device cannot be configured.
    async fn configure(&mut self) -> Result<()>;

    /// Drive a single output line to the given level.
    ///
    /// A returned error means the write may or may not have reached the
    /// device; callers must treat the physical state as unknown.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::PinWrite`](crate::HardwareError::PinWrite)
    /// if the write fails.
    async fn set_pin(&mut self, pin: Pin, level: PinLevel) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Source of blocking waits.
///
/// Every settle delay, execute hold and cooldown goes through this trait.
/// An implementation must not return before the requested duration has
/// passed on its own timeline.
pub trait Clock: Send + Sync {
    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}
