//! Rotary preset model.

use std::fmt;

use serde::{Deserialize, Serialize};

use safecode_core::constants::{CODE_LENGTH, DEFAULT_DIGITS};
use safecode_core::{Digit, Pin, SecurityCode};

/// One rotary preset button and the digit it currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitWheel {
    position: usize,
    digit: Digit,
}

impl DigitWheel {
    /// Create the wheel at `position` showing its cleared digit.
    ///
    /// Positions beyond the panel wrap onto it; callers build exactly
    /// [`CODE_LENGTH`] wheels.
    pub fn new(position: usize) -> Self {
        let position = position % CODE_LENGTH;
        Self {
            position,
            digit: Self::default_digit(position),
        }
    }

    fn default_digit(position: usize) -> Digit {
        Digit::new(DEFAULT_DIGITS[position]).unwrap_or_default()
    }

    /// Position of this wheel on the panel (0-3).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Output line wired to this wheel.
    pub fn pin(&self) -> Pin {
        Pin::ALL[self.position]
    }

    /// Digit the wheel currently shows.
    pub fn digit(&self) -> Digit {
        self.digit
    }

    /// Presses needed to show `target`.
    pub fn steps_to(&self, target: Digit) -> u8 {
        self.digit.steps_to(target)
    }

    /// Record one completed press.
    pub(crate) fn advance(&mut self) -> Digit {
        self.digit = self.digit.next();
        self.digit
    }

    /// Return to the cleared digit.
    pub(crate) fn reset(&mut self) {
        self.digit = Self::default_digit(self.position);
    }
}

/// Digits shown by all four presets, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelState([Digit; CODE_LENGTH]);

impl PanelState {
    /// Create a state from explicit digits.
    pub fn new(digits: [Digit; CODE_LENGTH]) -> Self {
        Self(digits)
    }

    /// The digits, most significant first.
    pub fn digits(&self) -> [Digit; CODE_LENGTH] {
        self.0
    }

    /// The code currently dialed.
    pub fn code(&self) -> SecurityCode {
        SecurityCode::from_digits(self.0)
    }
}

impl Default for PanelState {
    /// The cleared panel, `1000`.
    fn default() -> Self {
        Self(DEFAULT_DIGITS.map(|d| Digit::new(d).unwrap_or_default()))
    }
}

impl From<&[DigitWheel; CODE_LENGTH]> for PanelState {
    fn from(wheels: &[DigitWheel; CODE_LENGTH]) -> Self {
        Self(wheels.map(|w| w.digit()))
    }
}

impl fmt::Display for PanelState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for digit in self.0 {
            write!(f, "{digit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 0)]
    #[case(2, 0)]
    #[case(3, 0)]
    fn test_wheel_starts_at_cleared_digit(#[case] position: usize, #[case] expected: u8) {
        let wheel = DigitWheel::new(position);
        assert_eq!(wheel.digit().value(), expected);
        assert_eq!(usize::from(wheel.pin().index()), position);
    }

    #[test]
    fn test_wheel_advance_wraps() {
        let mut wheel = DigitWheel::new(0);
        for _ in 0..8 {
            wheel.advance();
        }
        assert_eq!(wheel.digit().value(), 9);
        assert_eq!(wheel.advance(), Digit::ZERO);
    }

    #[test]
    fn test_wheel_reset() {
        let mut wheel = DigitWheel::new(0);
        wheel.advance();
        wheel.advance();
        wheel.reset();
        assert_eq!(wheel.digit().value(), 1);
    }

    #[test]
    fn test_panel_state_default() {
        let state = PanelState::default();
        assert_eq!(state.to_string(), "1000");
        assert_eq!(state.code().value(), 1000);
    }
}
