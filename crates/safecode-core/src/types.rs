use crate::{
    Result,
    constants::{CODE_LENGTH, CODE_SPACE, DIGIT_RADIX, EXECUTE_PIN, PIN_COUNT, PRESET_BUTTONS},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One position of a rotary preset button (0-9).
///
/// Advancing past 9 wraps back to 0, matching the physical button which
/// cycles through its ten positions one press at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// The digit 0.
    pub const ZERO: Digit = Digit(0);

    /// Create a digit with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if the value is greater than 9.
    pub fn new(value: u8) -> Result<Self> {
        if value >= DIGIT_RADIX {
            return Err(Error::InvalidDigit(value));
        }
        Ok(Digit(value))
    }

    /// Get the raw digit value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// The digit shown after one more press.
    #[must_use]
    pub fn next(self) -> Self {
        Digit((self.0 + 1) % DIGIT_RADIX)
    }

    /// Number of presses needed to move from this digit to `target`.
    ///
    /// This is `(target - self) mod 10`, always in `0..=9`.
    ///
    /// ```
    /// use safecode_core::Digit;
    ///
    /// let one = Digit::new(1).unwrap();
    /// assert_eq!(one.steps_to(Digit::ZERO), 9);
    /// assert_eq!(Digit::ZERO.steps_to(one), 1);
    /// assert_eq!(one.steps_to(one), 0);
    /// ```
    #[must_use]
    pub fn steps_to(self, target: Digit) -> u8 {
        (target.0 + DIGIT_RADIX - self.0) % DIGIT_RADIX
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Digit::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A four-digit security code (`0000`-`9999`).
///
/// Stored as its integer value; the digit at position 0 is the most
/// significant one and is dialed on the first preset button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct SecurityCode(u16);

impl SecurityCode {
    /// Create a security code with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCode` if the value is greater than 9999.
    pub fn new(value: u16) -> Result<Self> {
        if value >= CODE_SPACE {
            return Err(Error::InvalidCode(format!(
                "Code must be 0-{}, got {value}",
                CODE_SPACE - 1
            )));
        }
        Ok(SecurityCode(value))
    }

    /// Build a code from its four digits, most significant first.
    #[must_use]
    pub fn from_digits(digits: [Digit; CODE_LENGTH]) -> Self {
        let value = digits
            .iter()
            .fold(0u16, |acc, d| acc * u16::from(DIGIT_RADIX) + u16::from(d.value()));
        SecurityCode(value)
    }

    /// Get the raw integer value.
    #[must_use]
    pub fn value(self) -> u16 {
        self.0
    }

    /// Split the code into its four digits, most significant first.
    ///
    /// ```
    /// use safecode_core::SecurityCode;
    ///
    /// let code = SecurityCode::new(5).unwrap();
    /// let digits: Vec<u8> = code.digits().iter().map(|d| d.value()).collect();
    /// assert_eq!(digits, vec![0, 0, 0, 5]);
    /// ```
    #[must_use]
    pub fn digits(self) -> [Digit; CODE_LENGTH] {
        let radix = u16::from(DIGIT_RADIX);
        let mut digits = [Digit::ZERO; CODE_LENGTH];
        let mut rest = self.0;
        for slot in digits.iter_mut().rev() {
            // rest % radix < 10, so the narrowing cast is lossless
            *slot = Digit((rest % radix) as u8);
            rest /= radix;
        }
        digits
    }
}

impl TryFrom<u16> for SecurityCode {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        SecurityCode::new(value)
    }
}

impl From<SecurityCode> for u16 {
    fn from(code: SecurityCode) -> Self {
        code.0
    }
}

impl fmt::Display for SecurityCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl std::str::FromStr for SecurityCode {
    type Err = Error;

    /// Parse a non-negative decimal integer; leading zeros are allowed.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCode(format!("Not a decimal code: {s:?}")));
        }
        let value: u32 = s
            .parse()
            .map_err(|_| Error::InvalidCode(format!("Code out of range: {s}")))?;
        let value = u16::try_from(value)
            .map_err(|_| Error::InvalidCode(format!("Code out of range: {s}")))?;
        SecurityCode::new(value)
    }
}

/// Digital output line index (0-3 preset buttons, 4 execute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pin(u8);

impl Pin {
    /// Line wired to the execute button.
    pub const EXECUTE: Pin = Pin(EXECUTE_PIN);

    /// Every line in index order, presets first.
    pub const ALL: [Pin; PIN_COUNT] = [Pin(0), Pin(1), Pin(2), Pin(3), Pin(EXECUTE_PIN)];

    /// Create a pin index with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if the index is not in 0-4.
    pub fn new(index: u8) -> Result<Self> {
        if usize::from(index) >= PIN_COUNT {
            return Err(Error::InvalidPin(index));
        }
        Ok(Pin(index))
    }

    /// Line wired to the preset button at `position` (0-3).
    ///
    /// # Errors
    /// Returns `Error::InvalidPin` if `position` is not a preset position.
    pub fn preset(position: usize) -> Result<Self> {
        if position >= PRESET_BUTTONS {
            return Err(Error::InvalidPin(u8::try_from(position).unwrap_or(u8::MAX)));
        }
        Ok(Pin::ALL[position])
    }

    /// Get the raw line index.
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Whether this is the execute line.
    #[must_use]
    pub fn is_execute(self) -> bool {
        self == Self::EXECUTE
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logic level of an output line.
///
/// Lines are inverted: a low level closes the button contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinLevel {
    /// Level `0`, contact closed, button pressed.
    Closed,

    /// Level `1`, contact open, button idle.
    Open,
}

impl PinLevel {
    /// The raw bit written to the line.
    #[must_use]
    pub fn as_bit(self) -> u8 {
        match self {
            PinLevel::Closed => 0,
            PinLevel::Open => 1,
        }
    }
}

impl fmt::Display for PinLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PinLevel::Closed => write!(f, "closed"),
            PinLevel::Open => write!(f, "open"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(9)]
    fn test_digit_valid(#[case] value: u8) {
        assert_eq!(Digit::new(value).unwrap().value(), value);
    }

    #[rstest]
    #[case(10)]
    #[case(255)]
    fn test_digit_invalid(#[case] value: u8) {
        assert!(matches!(Digit::new(value), Err(Error::InvalidDigit(v)) if v == value));
    }

    #[test]
    fn test_digit_wraps_after_nine() {
        let nine = Digit::new(9).unwrap();
        assert_eq!(nine.next(), Digit::ZERO);
    }

    #[rstest]
    #[case(1, 0, 9)]
    #[case(0, 5, 5)]
    #[case(7, 7, 0)]
    #[case(9, 0, 1)]
    #[case(3, 2, 9)]
    fn test_digit_steps_to(#[case] from: u8, #[case] to: u8, #[case] expected: u8) {
        let from = Digit::new(from).unwrap();
        let to = Digit::new(to).unwrap();
        assert_eq!(from.steps_to(to), expected);
    }

    #[rstest]
    #[case(0, [0, 0, 0, 0])]
    #[case(5, [0, 0, 0, 5])]
    #[case(1000, [1, 0, 0, 0])]
    #[case(1999, [1, 9, 9, 9])]
    #[case(9999, [9, 9, 9, 9])]
    fn test_code_digits(#[case] value: u16, #[case] expected: [u8; 4]) {
        let code = SecurityCode::new(value).unwrap();
        let digits = code.digits().map(Digit::value);
        assert_eq!(digits, expected);
        assert_eq!(SecurityCode::from_digits(code.digits()), code);
    }

    #[test]
    fn test_code_out_of_range() {
        assert!(SecurityCode::new(10_000).is_err());
    }

    #[test]
    fn test_code_display_is_zero_padded() {
        assert_eq!(SecurityCode::new(42).unwrap().to_string(), "0042");
    }

    #[rstest]
    #[case("5", 5)]
    #[case("0005", 5)]
    #[case("  1234 ", 1234)]
    #[case("9999", 9999)]
    fn test_code_parse_valid(#[case] input: &str, #[case] expected: u16) {
        let code: SecurityCode = input.parse().unwrap();
        assert_eq!(code.value(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("-1")]
    #[case("+5")]
    #[case("10000")]
    #[case("99999999999")]
    fn test_code_parse_invalid(#[case] input: &str) {
        let result: Result<SecurityCode> = input.parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_code_serde_validates() {
        let code: SecurityCode = serde_json::from_str("1234").unwrap();
        assert_eq!(code.value(), 1234);
        assert!(serde_json::from_str::<SecurityCode>("12345").is_err());
    }

    #[test]
    fn test_pin_indices() {
        assert_eq!(Pin::preset(0).unwrap().index(), 0);
        assert_eq!(Pin::preset(3).unwrap().index(), 3);
        assert!(Pin::preset(4).is_err());
        assert!(Pin::EXECUTE.is_execute());
        assert!(!Pin::preset(2).unwrap().is_execute());
        assert!(Pin::new(5).is_err());
        assert_eq!(Pin::ALL.len(), 5);
    }

    #[test]
    fn test_pin_level_bits_are_inverted() {
        assert_eq!(PinLevel::Closed.as_bit(), 0);
        assert_eq!(PinLevel::Open.as_bit(), 1);
    }

    mod wheel_properties {
        use crate::Digit;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_advancing_steps_reaches_target(from in 0u8..10, to in 0u8..10) {
                let start = Digit::new(from).unwrap();
                let target = Digit::new(to).unwrap();
                let steps = start.steps_to(target);

                let mut current = start;
                for _ in 0..steps {
                    current = current.next();
                }

                prop_assert_eq!(current, target);
                prop_assert!(steps < 10);
            }
        }
    }
}
