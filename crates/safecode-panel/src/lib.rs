//! Panel model and button protocols for the safecode controller.
//!
//! This crate turns line writes into the three operations the search needs:
//!
//! - [`ButtonPanel`] tracks the digit each rotary preset shows and presses
//!   one preset at a time, or clears the panel back to `1000`.
//! - [`CodeEntrySequencer`] dials a target code with the minimum number of
//!   presses per preset.
//! - [`ExecutionController`] performs the long press on execute and waits
//!   for the device to finish responding.
//!
//! # Example
//!
//! ```
//! use safecode_core::SecurityCode;
//! use safecode_hardware::mock::{MockClock, MockPins};
//! use safecode_panel::{ButtonPanel, CodeEntrySequencer, ExecutionController};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> safecode_hardware::Result<()> {
//!     let (pins, handle) = MockPins::new();
//!     let mut panel = ButtonPanel::new(pins, MockClock::new());
//!     panel.initialize().await?;
//!
//!     let code = SecurityCode::new(5).unwrap();
//!     CodeEntrySequencer::new().dial(&mut panel, code).await?;
//!     ExecutionController::default().execute(&mut panel).await?;
//!     panel.reset().await?;
//!
//!     assert_eq!(handle.submissions(), vec![code]);
//!     Ok(())
//! }
//! ```

pub mod execute;
pub mod panel;
pub mod sequencer;
pub mod wheel;

pub use execute::{ExecuteTiming, ExecutionController};
pub use panel::{ButtonPanel, PanelTiming};
pub use sequencer::{CodeEntrySequencer, DialReport};
pub use wheel::{DigitWheel, PanelState};
