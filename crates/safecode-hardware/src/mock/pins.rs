//! Mock digital output driver for testing and development.
//!
//! This module provides a simulated panel that records every line write and
//! models what the physical device would show: each completed preset press
//! (closed then open) advances that preset's digit, and each completed
//! execute press records the submitted code and reverts the display to the
//! default `1000`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use safecode_core::constants::{DEFAULT_DIGITS, PIN_COUNT};
use safecode_core::{Digit, Pin, PinLevel, SecurityCode};

use tracing::trace;

use crate::{HardwareError, Result, traits::PinDriver, types::DeviceInfo};

/// A single recorded line write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinWrite {
    /// Line that was driven.
    pub pin: Pin,

    /// Level it was driven to.
    pub level: PinLevel,
}

#[derive(Debug)]
struct MockPanelState {
    writes: Vec<PinWrite>,
    levels: [Option<PinLevel>; PIN_COUNT],
    display: [u8; 4],
    submissions: Vec<SecurityCode>,
    configured: bool,
    fail_configure: Option<String>,
    fail_after_writes: Option<usize>,
    fail_on: Option<(Pin, PinLevel)>,
    unplugged: bool,
}

impl MockPanelState {
    fn new() -> Self {
        Self {
            writes: Vec::new(),
            levels: [None; PIN_COUNT],
            display: DEFAULT_DIGITS,
            submissions: Vec::new(),
            configured: false,
            fail_configure: None,
            fail_after_writes: None,
            fail_on: None,
            unplugged: false,
        }
    }

    fn check_fault(&mut self, pin: Pin, level: PinLevel) -> Result<()> {
        if self.fail_on == Some((pin, level)) {
            return Err(HardwareError::pin_write(pin, level, "injected fault"));
        }
        if let Some(remaining) = self.fail_after_writes.as_mut() {
            if *remaining == 0 {
                return Err(HardwareError::pin_write(pin, level, "injected fault"));
            }
            *remaining -= 1;
        }
        Ok(())
    }

    fn apply(&mut self, pin: Pin, level: PinLevel) {
        let slot = usize::from(pin.index());
        let previous = self.levels[slot].replace(level);
        self.writes.push(PinWrite { pin, level });

        // A press completes on the release edge
        if previous != Some(PinLevel::Closed) || level != PinLevel::Open {
            return;
        }

        if pin.is_execute() {
            let digits = self.display.map(|d| Digit::new(d).unwrap_or_default());
            self.submissions.push(SecurityCode::from_digits(digits));
            self.display = DEFAULT_DIGITS;
        } else {
            self.display[slot] = (self.display[slot] + 1) % 10;
        }
    }
}

/// Mock pin driver for testing and development.
///
/// Writes are recorded in a shared state that the paired
/// [`MockPinsHandle`] can inspect and use to inject faults.
///
/// # Examples
///
/// ```
/// use safecode_core::{Pin, PinLevel};
/// use safecode_hardware::mock::MockPins;
/// use safecode_hardware::traits::PinDriver;
///
/// #[tokio::main]
/// async fn main() -> safecode_hardware::Result<()> {
///     let (mut pins, handle) = MockPins::new();
///
///     let preset = Pin::preset(3).unwrap();
///     pins.set_pin(preset, PinLevel::Closed).await?;
///     pins.set_pin(preset, PinLevel::Open).await?;
///
///     assert_eq!(handle.presses(preset), 1);
///     assert_eq!(handle.displayed_digits(), [1, 0, 0, 1]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockPins {
    state: Arc<Mutex<MockPanelState>>,
    name: String,
}

impl MockPins {
    /// Create a new mock driver with the default name.
    pub fn new() -> (Self, MockPinsHandle) {
        Self::with_name("Mock Pins".to_string())
    }

    /// Create a new mock driver with a custom name.
    pub fn with_name(name: String) -> (Self, MockPinsHandle) {
        let state = Arc::new(Mutex::new(MockPanelState::new()));
        let pins = Self {
            state: Arc::clone(&state),
            name,
        };
        (pins, MockPinsHandle { state })
    }

    fn lock(&self) -> MutexGuard<'_, MockPanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockPins {
    fn default() -> Self {
        Self::new().0
    }
}

impl PinDriver for MockPins {
    async fn configure(&mut self) -> Result<()> {
        let mut state = self.lock();
        if state.unplugged {
            return Err(HardwareError::disconnected(self.name.clone()));
        }
        if let Some(message) = state.fail_configure.clone() {
            return Err(HardwareError::initialization_failed(message));
        }
        state.configured = true;
        Ok(())
    }

    async fn set_pin(&mut self, pin: Pin, level: PinLevel) -> Result<()> {
        let mut state = self.lock();
        if state.unplugged {
            return Err(HardwareError::disconnected(self.name.clone()));
        }
        state.check_fault(pin, level)?;
        state.apply(pin, level);
        trace!(%pin, %level, "mock pin write");
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Pins v1.0").simulated())
    }
}

/// Handle for inspecting and controlling a [`MockPins`] driver.
///
/// Cloning the handle shares the same underlying state.
#[derive(Debug, Clone)]
pub struct MockPinsHandle {
    state: Arc<Mutex<MockPanelState>>,
}

impl MockPinsHandle {
    fn lock(&self) -> MutexGuard<'_, MockPanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every successful write so far, in order.
    pub fn writes(&self) -> Vec<PinWrite> {
        self.lock().writes.clone()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Forget recorded writes (the simulated display is kept).
    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    /// Number of times `pin` was driven closed.
    pub fn presses(&self, pin: Pin) -> usize {
        self.lock()
            .writes
            .iter()
            .filter(|w| w.pin == pin && w.level == PinLevel::Closed)
            .count()
    }

    /// Last level written to `pin`, if any.
    pub fn level(&self, pin: Pin) -> Option<PinLevel> {
        self.lock().levels[usize::from(pin.index())]
    }

    /// Digits the simulated device currently shows.
    pub fn displayed_digits(&self) -> [u8; 4] {
        self.lock().display
    }

    /// Codes submitted with a completed execute press, in order.
    pub fn submissions(&self) -> Vec<SecurityCode> {
        self.lock().submissions.clone()
    }

    /// Whether [`PinDriver::configure`] succeeded.
    pub fn is_configured(&self) -> bool {
        self.lock().configured
    }

    /// Make the next `configure` call fail.
    pub fn fail_configure(&self, message: impl Into<String>) {
        self.lock().fail_configure = Some(message.into());
    }

    /// Let `count` more writes succeed, then fail every write.
    pub fn fail_after_writes(&self, count: usize) {
        self.lock().fail_after_writes = Some(count);
    }

    /// Fail every write of `level` to `pin`.
    pub fn fail_on(&self, pin: Pin, level: PinLevel) {
        self.lock().fail_on = Some((pin, level));
    }

    /// Simulate the device being unplugged: every later call fails with
    /// [`HardwareError::Disconnected`].
    pub fn unplug(&self) {
        self.lock().unplugged = true;
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.unplugged = false;
        state.fail_configure = None;
        state.fail_after_writes = None;
        state.fail_on = None;
    }
}
