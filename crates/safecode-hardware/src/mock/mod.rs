//! Mock device implementations for testing and development.
//!
//! This module provides a simulated panel driver and a recording clock that
//! can be inspected programmatically without requiring physical hardware.

pub mod clock;
pub mod pins;

// Re-export commonly used types
pub use clock::MockClock;
pub use pins::{MockPins, MockPinsHandle, PinWrite};
