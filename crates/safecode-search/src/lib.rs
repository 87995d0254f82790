//! Search loop for the rotary-button security panel.
//!
//! [`SearchScheduler`] enumerates untried codes, dials and submits each one
//! through a [`ButtonPanel`](safecode_panel::ButtonPanel), records it in an
//! [`AttemptStore`](safecode_storage::AttemptStore), and waits out the
//! device's lockout after every window of attempts.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use safecode_hardware::mock::{MockClock, MockPins};
//! use safecode_search::{SearchConfig, SearchOutcome, SearchScheduler};
//! use safecode_storage::MemoryAttemptStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> safecode_search::Result<()> {
//!     let (pins, _handle) = MockPins::new();
//!     let config = SearchConfig::new(3).cooldown(Duration::from_secs(60)).seed(1);
//!     let mut scheduler =
//!         SearchScheduler::new(pins, MockClock::new(), MemoryAttemptStore::new(), config)?;
//!
//!     let summary = scheduler.run().await?;
//!     assert_eq!(summary.outcome, SearchOutcome::Exhausted);
//!     assert_eq!(summary.attempts, 3);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod scheduler;
pub mod state_machine;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use rate_limit::RateLimiter;
pub use scheduler::{SearchOutcome, SearchScheduler, SearchSummary};
pub use state_machine::{SearchMachine, SearchState, StateTransition};
