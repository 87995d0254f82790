//! Device geometry and timing constants.
//!
//! The target panel has four rotary preset buttons, each cycling through the
//! digits 0-9, and one execute button that submits the dialed code. All five
//! buttons are wired to digital output lines whose logic is inverted:
//!
//! | Level | Contact | Meaning |
//! |-------|---------|---------|
//! | `0`   | closed  | button pressed |
//! | `1`   | open    | button idle |
//!
//! # Usage
//!
//! ```
//! use safecode_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(CODE_LENGTH, PRESET_BUTTONS);
//! let hold = Duration::from_millis(EXECUTE_HOLD_MS);
//! assert_eq!(hold.as_secs(), 5);
//! ```

// ============================================================================
// Panel Geometry
// ============================================================================

/// Number of digits in a security code.
pub const CODE_LENGTH: usize = 4;

/// Number of rotary preset buttons, one per code digit.
pub const PRESET_BUTTONS: usize = CODE_LENGTH;

/// Output line wired to the execute button.
pub const EXECUTE_PIN: u8 = 4;

/// Total number of output lines driven by the controller.
pub const PIN_COUNT: usize = PRESET_BUTTONS + 1;

/// Number of positions on a rotary preset button.
pub const DIGIT_RADIX: u8 = 10;

/// Size of the full code space (`0000`-`9999`).
pub const CODE_SPACE: u16 = 10_000;

/// Digits shown by the presets after the panel is cleared.
///
/// The device always reverts to `1000` when a code entry is abandoned.
pub const DEFAULT_DIGITS: [u8; CODE_LENGTH] = [1, 0, 0, 0];

// ============================================================================
// Timing
// ============================================================================

/// Settle delay after each edge of a preset button press, in milliseconds.
///
/// A press is a down edge followed by an up edge; each edge is followed by
/// this delay, so one press costs twice this value.
pub const PRESS_SETTLE_MS: u64 = 200;

/// Settle delay after all lines are released during a clear, in milliseconds.
pub const CLEAR_SETTLE_MS: u64 = 200;

/// Minimum hold time for the execute button to register a long press, in milliseconds.
pub const EXECUTE_HOLD_MS: u64 = 5_000;

/// Wait after releasing execute while the device finishes its response, in milliseconds.
///
/// The device flashes `SAFE` for most of this window and ignores input.
pub const EXECUTE_SETTLE_MS: u64 = 30_000;

// ============================================================================
// Search Policy
// ============================================================================

/// Default exclusive upper bound of the searched code range.
pub const DEFAULT_MAX_CODE: u16 = 2_000;

/// Attempts the device tolerates before it must be left idle.
pub const DEFAULT_ATTEMPTS_PER_WINDOW: u32 = 2;

/// Idle period enforced after a full attempt window, in seconds (one hour plus one minute).
pub const DEFAULT_COOLDOWN_SECS: u64 = 3_600 + 60;

/// Default file name of the attempt log.
pub const DEFAULT_ATTEMPT_LOG: &str = "codes.txt";
