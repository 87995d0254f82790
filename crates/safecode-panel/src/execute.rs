//! Execute button protocol.
//!
//! The device only accepts a code on a long press of execute, then spends
//! a long time flashing its response during which input is ignored:
//!
//! ```text
//! execute  ‾‾‾‾\________________/‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!              |<--- hold 5s -->|<--------- settle 30s ---------->|
//! ```
//!
//! The whole sequence blocks the caller. The panel is left needing a reset,
//! since the device reverts its display after consuming the code.

use std::time::Duration;

use tracing::info;

use safecode_core::PinLevel;
use safecode_core::constants::{EXECUTE_HOLD_MS, EXECUTE_SETTLE_MS};
use safecode_hardware::{Clock, PinDriver, Result};

use crate::panel::ButtonPanel;

/// Hold and settle durations for the execute press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteTiming {
    /// How long execute is held closed.
    pub hold: Duration,

    /// Wait after release before any further interaction.
    pub settle: Duration,
}

impl Default for ExecuteTiming {
    fn default() -> Self {
        Self {
            hold: Duration::from_millis(EXECUTE_HOLD_MS),
            settle: Duration::from_millis(EXECUTE_SETTLE_MS),
        }
    }
}

impl ExecuteTiming {
    /// Set the hold duration.
    pub fn hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Set the settle duration.
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}

/// Submits the dialed code with a timed long press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionController {
    timing: ExecuteTiming,
}

impl ExecutionController {
    /// Create a controller with the given timing.
    pub fn new(timing: ExecuteTiming) -> Self {
        Self { timing }
    }

    /// The configured timing.
    pub fn timing(&self) -> &ExecuteTiming {
        &self.timing
    }

    /// Press and hold execute, release it, and wait for the device to settle.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Desynchronized`](safecode_hardware::HardwareError::Desynchronized)
    /// if the panel needs a reset, or a pin write error if either edge fails.
    pub async fn execute<D: PinDriver, C: Clock>(&self, panel: &mut ButtonPanel<D, C>) -> Result<()> {
        let dialed = panel.state();
        info!(code = %dialed, "Executing");

        panel.drive_execute(PinLevel::Closed).await?;
        panel.clock().sleep(self.timing.hold).await;
        panel.drive_execute(PinLevel::Open).await?;
        panel.mark_submitted();
        panel.clock().sleep(self.timing.settle).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safecode_core::{Pin, SecurityCode};
    use safecode_hardware::HardwareError;
    use safecode_hardware::mock::{MockClock, MockPins};

    #[tokio::test]
    async fn test_execute_protocol_order_and_timing() {
        let (pins, handle) = MockPins::new();
        let clock = MockClock::new();
        let mut panel = ButtonPanel::new(pins, clock.clone());
        panel.initialize().await.unwrap();
        handle.clear_writes();
        clock.clear();

        ExecutionController::default().execute(&mut panel).await.unwrap();

        let writes: Vec<_> = handle.writes().iter().map(|w| (w.pin, w.level)).collect();
        assert_eq!(
            writes,
            vec![(Pin::EXECUTE, PinLevel::Closed), (Pin::EXECUTE, PinLevel::Open)]
        );
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(5), Duration::from_secs(30)]
        );
        assert_eq!(handle.submissions(), vec![SecurityCode::new(1000).unwrap()]);
    }

    #[tokio::test]
    async fn test_execute_requires_reset_afterwards() {
        let (pins, _handle) = MockPins::new();
        let mut panel = ButtonPanel::new(pins, MockClock::new());
        panel.initialize().await.unwrap();
        let controller = ExecutionController::default();

        controller.execute(&mut panel).await.unwrap();

        assert!(matches!(panel.advance(0).await, Err(HardwareError::Desynchronized)));
        assert!(matches!(
            controller.execute(&mut panel).await,
            Err(HardwareError::Desynchronized)
        ));

        panel.reset().await.unwrap();
        controller.execute(&mut panel).await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_release_failure_is_fatal() {
        let (pins, handle) = MockPins::new();
        let clock = MockClock::new();
        let mut panel = ButtonPanel::new(pins, clock.clone());
        panel.initialize().await.unwrap();
        clock.clear();
        handle.fail_on(Pin::EXECUTE, PinLevel::Open);

        let result = ExecutionController::default().execute(&mut panel).await;

        assert!(matches!(result, Err(HardwareError::PinWrite { .. })));
        assert!(!panel.is_synchronized());
        // Only the hold was waited; no settle after a failed release
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(5)]);
    }

    #[test]
    fn test_custom_timing() {
        let timing = ExecuteTiming::default()
            .hold(Duration::from_secs(6))
            .settle(Duration::from_secs(40));
        let controller = ExecutionController::new(timing);
        assert_eq!(controller.timing().hold, Duration::from_secs(6));
        assert_eq!(controller.timing().settle, Duration::from_secs(40));
    }
}
