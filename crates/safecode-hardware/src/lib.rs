//! Hardware abstraction layer for the safecode panel controller.
//!
//! This crate provides the two capabilities the control loop is built on:
//!
//! - [`PinDriver`]: drives the five digital output lines wired to the
//!   panel (four rotary preset buttons on lines 0-3, execute on line 4).
//! - [`Clock`]: performs every blocking wait (settle delays, the execute
//!   hold, cooldowns).
//!
//! Both are injected into the panel and the scheduler, so the same code runs
//! against a LabJack U3 in production and against [`mock::MockPins`] and
//! [`mock::MockClock`] in tests and dry runs.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Fail-fast**: All operations return `Result<T>`; nothing here retries,
//!   because a partially applied button press cannot be undone.
//! - **Enum dispatch**: [`devices::AnyPinDriver`] selects a backend at
//!   runtime without trait objects.
//!
//! # Example
//!
//! ```no_run
//! use safecode_core::{Pin, PinLevel};
//! use safecode_hardware::traits::{Clock, PinDriver};
//! use safecode_hardware::error::Result;
//! use std::time::Duration;
//!
//! async fn tap<D: PinDriver, C: Clock>(driver: &mut D, clock: &C, pin: Pin) -> Result<()> {
//!     driver.set_pin(pin, PinLevel::Closed).await?;
//!     clock.sleep(Duration::from_millis(200)).await;
//!     driver.set_pin(pin, PinLevel::Open).await?;
//!     clock.sleep(Duration::from_millis(200)).await;
//!     Ok(())
//! }
//! ```
//!
//! [`PinDriver`]: traits::PinDriver
//! [`Clock`]: traits::Clock

pub mod clock;
pub mod devices;
pub mod error;
#[cfg(feature = "hardware-labjack")]
pub mod labjack;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use clock::TokioClock;
pub use devices::AnyPinDriver;
pub use error::{HardwareError, Result};
pub use traits::{Clock, PinDriver};
pub use types::DeviceInfo;
