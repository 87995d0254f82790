//! Code entry: dial a target code with the fewest presses.
//!
//! Each preset only counts upwards, so moving a wheel from `current` to
//! `target` takes `(target - current) mod 10` presses. Wheels are
//! independent of each other; presses on one wheel are strictly sequential.

use tracing::debug;

use safecode_core::SecurityCode;
use safecode_core::constants::CODE_LENGTH;
use safecode_hardware::{Clock, PinDriver, Result};

use crate::panel::ButtonPanel;
use crate::wheel::PanelState;

/// Presses issued while dialing one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialReport {
    /// The code that was dialed.
    pub code: SecurityCode,

    /// Presses issued per preset position.
    pub presses: [u8; CODE_LENGTH],
}

impl DialReport {
    /// Presses issued across all presets.
    pub fn total(&self) -> u32 {
        self.presses.iter().map(|p| u32::from(*p)).sum()
    }
}

/// Converts a target code into preset presses.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeEntrySequencer;

impl CodeEntrySequencer {
    /// Create a sequencer.
    pub fn new() -> Self {
        Self
    }

    /// Presses needed per position to move from `state` to `code`.
    ///
    /// ```
    /// use safecode_core::SecurityCode;
    /// use safecode_panel::{CodeEntrySequencer, PanelState};
    ///
    /// let plan = CodeEntrySequencer::plan(&PanelState::default(), SecurityCode::new(5).unwrap());
    /// assert_eq!(plan, [9, 0, 0, 5]);
    /// ```
    pub fn plan(state: &PanelState, code: SecurityCode) -> [u8; CODE_LENGTH] {
        let current = state.digits();
        let target = code.digits();
        let mut plan = [0u8; CODE_LENGTH];
        for (position, steps) in plan.iter_mut().enumerate() {
            *steps = current[position].steps_to(target[position]);
        }
        plan
    }

    /// Dial `code` on the panel without executing it.
    ///
    /// Wheels already showing their target digit receive no presses, so
    /// dialing the same code twice in a row presses nothing the second time.
    ///
    /// # Errors
    ///
    /// Stops at the first failed press and returns its error; the panel is
    /// then desynchronized and must be reset.
    pub async fn dial<D: PinDriver, C: Clock>(
        &self,
        panel: &mut ButtonPanel<D, C>,
        code: SecurityCode,
    ) -> Result<DialReport> {
        let presses = Self::plan(&panel.state(), code);

        for (position, steps) in presses.iter().enumerate() {
            for _ in 0..*steps {
                panel.advance(position).await?;
            }
        }

        debug_assert_eq!(panel.state().code(), code);
        let report = DialReport { code, presses };
        debug!(%code, presses = report.total(), "Code dialed");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use safecode_core::{Digit, Pin, PinLevel};
    use safecode_hardware::HardwareError;
    use safecode_hardware::mock::{MockClock, MockPins, MockPinsHandle};

    async fn ready_panel() -> (ButtonPanel<MockPins, MockClock>, MockPinsHandle) {
        let (pins, handle) = MockPins::new();
        let mut panel = ButtonPanel::new(pins, MockClock::new());
        panel.initialize().await.unwrap();
        handle.clear_writes();
        (panel, handle)
    }

    fn code(value: u16) -> SecurityCode {
        SecurityCode::new(value).unwrap()
    }

    #[rstest]
    #[case(1000, [0, 0, 0, 0])]
    #[case(5, [9, 0, 0, 5])]
    #[case(1999, [0, 9, 9, 9])]
    #[case(0, [9, 0, 0, 0])]
    #[case(2345, [1, 3, 4, 5])]
    fn test_plan_from_cleared_panel(#[case] target: u16, #[case] expected: [u8; 4]) {
        assert_eq!(CodeEntrySequencer::plan(&PanelState::default(), code(target)), expected);
    }

    #[test]
    fn test_plan_from_arbitrary_state() {
        let digits = [9, 9, 0, 3].map(|d| Digit::new(d).unwrap());
        let state = PanelState::new(digits);
        assert_eq!(CodeEntrySequencer::plan(&state, code(123)), [1, 2, 2, 0]);
    }

    #[tokio::test]
    async fn test_dial_0005_from_default() {
        let (mut panel, handle) = ready_panel().await;

        let report = CodeEntrySequencer::new().dial(&mut panel, code(5)).await.unwrap();

        assert_eq!(report.presses, [9, 0, 0, 5]);
        assert_eq!(report.total(), 14);
        assert_eq!(handle.presses(Pin::preset(0).unwrap()), 9);
        assert_eq!(handle.presses(Pin::preset(1).unwrap()), 0);
        assert_eq!(handle.presses(Pin::preset(2).unwrap()), 0);
        assert_eq!(handle.presses(Pin::preset(3).unwrap()), 5);
        assert_eq!(panel.state().code(), code(5));
        assert_eq!(handle.displayed_digits(), [0, 0, 0, 5]);
    }

    #[tokio::test]
    async fn test_dial_is_idempotent_once_converged() {
        let (mut panel, handle) = ready_panel().await;
        let sequencer = CodeEntrySequencer::new();

        sequencer.dial(&mut panel, code(4821)).await.unwrap();
        let writes_after_first = handle.write_count();
        let second = sequencer.dial(&mut panel, code(4821)).await.unwrap();

        assert_eq!(second.total(), 0);
        assert_eq!(handle.write_count(), writes_after_first);
    }

    #[tokio::test]
    async fn test_dial_every_press_count_matches_plan() {
        let (mut panel, handle) = ready_panel().await;
        let sequencer = CodeEntrySequencer::new();

        for target in [7, 1999, 1000, 320, 9876] {
            handle.clear_writes();
            let expected = CodeEntrySequencer::plan(&panel.state(), code(target));

            let report = sequencer.dial(&mut panel, code(target)).await.unwrap();

            assert_eq!(report.presses, expected);
            for (position, steps) in expected.iter().enumerate() {
                assert_eq!(handle.presses(Pin::preset(position).unwrap()), usize::from(*steps));
            }
            assert_eq!(panel.state().code(), code(target));
        }
    }

    #[tokio::test]
    async fn test_dial_stops_on_write_failure() {
        let (mut panel, handle) = ready_panel().await;
        handle.fail_on(Pin::preset(3).unwrap(), PinLevel::Closed);

        let result = CodeEntrySequencer::new().dial(&mut panel, code(5)).await;

        assert!(matches!(result, Err(HardwareError::PinWrite { .. })));
        assert!(!panel.is_synchronized());
        // First wheel completed before the failure
        assert_eq!(panel.state().digits()[0], Digit::ZERO);
        assert_eq!(panel.state().digits()[3], Digit::ZERO);
    }
}
