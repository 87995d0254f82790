//! Button panel: four rotary presets plus execute, over an injected driver.
//!
//! The panel owns the [`PinDriver`] and [`Clock`] for the lifetime of the
//! run and is the only writer of the panel lines. Its digit model changes
//! only after the physical action that justifies the change has fully
//! succeeded.
//!
//! # Synchronization
//!
//! The model can fall out of step with the device in two ways:
//!
//! - a line write fails part-way through a press, leaving the physical
//!   digit unknown;
//! - the execute button is pressed, after which the device reverts its
//!   display on its own.
//!
//! In both cases the panel refuses further presses and execute presses with
//! [`HardwareError::Desynchronized`] until [`ButtonPanel::reset`] succeeds.

use std::time::Duration;

use tracing::{debug, trace};

use safecode_core::constants::{CLEAR_SETTLE_MS, CODE_LENGTH, PRESS_SETTLE_MS};
use safecode_core::{Digit, Pin, PinLevel};
use safecode_hardware::{Clock, HardwareError, PinDriver, Result};

use crate::wheel::{DigitWheel, PanelState};

/// Settle delays used by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelTiming {
    /// Wait after each edge (down, up) of a preset press.
    pub press_settle: Duration,

    /// Wait after all lines are released by a clear.
    pub clear_settle: Duration,
}

impl Default for PanelTiming {
    fn default() -> Self {
        Self {
            press_settle: Duration::from_millis(PRESS_SETTLE_MS),
            clear_settle: Duration::from_millis(CLEAR_SETTLE_MS),
        }
    }
}

impl PanelTiming {
    /// Set the per-edge press settle delay.
    pub fn press_settle(mut self, delay: Duration) -> Self {
        self.press_settle = delay;
        self
    }

    /// Set the clear settle delay.
    pub fn clear_settle(mut self, delay: Duration) -> Self {
        self.clear_settle = delay;
        self
    }
}

/// Four rotary presets and the execute button.
#[derive(Debug)]
pub struct ButtonPanel<D, C> {
    driver: D,
    clock: C,
    wheels: [DigitWheel; CODE_LENGTH],
    timing: PanelTiming,
    synchronized: bool,
    presses: u64,
}

impl<D: PinDriver, C: Clock> ButtonPanel<D, C> {
    /// Create a panel with default timing.
    ///
    /// The panel starts unsynchronized; call [`initialize`](Self::initialize)
    /// or [`reset`](Self::reset) before the first press.
    pub fn new(driver: D, clock: C) -> Self {
        Self::with_timing(driver, clock, PanelTiming::default())
    }

    /// Create a panel with custom timing.
    pub fn with_timing(driver: D, clock: C, timing: PanelTiming) -> Self {
        Self {
            driver,
            clock,
            wheels: [0, 1, 2, 3].map(DigitWheel::new),
            timing,
            synchronized: false,
            presses: 0,
        }
    }

    /// Configure the device and clear the panel.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InitializationFailed`] if the device cannot be
    /// configured, or a pin write error from the clear.
    pub async fn initialize(&mut self) -> Result<()> {
        self.driver.configure().await?;
        if let Ok(info) = self.driver.get_info().await {
            debug!(device = %info, "Panel driver configured");
        }
        self.reset().await
    }

    /// Press the preset at `position` once.
    ///
    /// Drives the line closed, waits, drives it open, waits, and only then
    /// advances the modeled digit (9 wraps to 0). Returns the new digit.
    ///
    /// # Errors
    ///
    /// - [`HardwareError::Desynchronized`] if the panel needs a reset first.
    /// - [`HardwareError::InvalidLine`] if `position` is not 0-3.
    /// - [`HardwareError::PinWrite`] if either write fails; the modeled digit
    ///   is left unchanged and the panel becomes desynchronized.
    pub async fn advance(&mut self, position: usize) -> Result<Digit> {
        self.ensure_synchronized()?;
        let pin = Pin::preset(position)?;

        self.synchronized = false;
        self.driver.set_pin(pin, PinLevel::Closed).await?;
        self.clock.sleep(self.timing.press_settle).await;
        self.driver.set_pin(pin, PinLevel::Open).await?;
        self.clock.sleep(self.timing.press_settle).await;
        self.synchronized = true;

        self.presses += 1;
        let digit = self.wheels[position].advance();
        trace!(position, %digit, "Preset pressed");
        Ok(digit)
    }

    /// Release every line, wait for the panel to settle, and model the
    /// cleared display `1000`.
    ///
    /// Safe to call in any state; this is the only way back to a
    /// synchronized panel.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::PinWrite`] if any release fails; the panel
    /// stays desynchronized.
    pub async fn reset(&mut self) -> Result<()> {
        self.synchronized = false;
        for pin in Pin::ALL {
            self.driver.set_pin(pin, PinLevel::Open).await?;
        }
        self.clock.sleep(self.timing.clear_settle).await;

        for wheel in &mut self.wheels {
            wheel.reset();
        }
        self.synchronized = true;
        debug!(state = %self.state(), "Panel cleared");
        Ok(())
    }

    /// Drive the execute line. The caller owns the timing protocol.
    pub(crate) async fn drive_execute(&mut self, level: PinLevel) -> Result<()> {
        self.ensure_synchronized()?;
        if let Err(e) = self.driver.set_pin(Pin::EXECUTE, level).await {
            self.synchronized = false;
            return Err(e);
        }
        Ok(())
    }

    /// Mark the model stale after the device consumed the dialed code.
    pub(crate) fn mark_submitted(&mut self) {
        self.synchronized = false;
    }

    fn ensure_synchronized(&self) -> Result<()> {
        if self.synchronized {
            Ok(())
        } else {
            Err(HardwareError::Desynchronized)
        }
    }

    /// Digits currently modeled on the presets.
    pub fn state(&self) -> PanelState {
        PanelState::from(&self.wheels)
    }

    /// The wheel at `position`, if it exists.
    pub fn wheel(&self, position: usize) -> Option<&DigitWheel> {
        self.wheels.get(position)
    }

    /// Whether the model is known to match the device.
    pub fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    /// Completed preset presses since the panel was created.
    pub fn press_count(&self) -> u64 {
        self.presses
    }

    /// The panel timing.
    pub fn timing(&self) -> &PanelTiming {
        &self.timing
    }

    /// The injected clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The injected driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safecode_hardware::mock::{MockClock, MockPins, MockPinsHandle};

    async fn ready_panel() -> (ButtonPanel<MockPins, MockClock>, MockPinsHandle, MockClock) {
        let (pins, handle) = MockPins::new();
        let clock = MockClock::new();
        let mut panel = ButtonPanel::new(pins, clock.clone());
        panel.initialize().await.unwrap();
        handle.clear_writes();
        clock.clear();
        (panel, handle, clock)
    }

    #[tokio::test]
    async fn test_new_panel_requires_reset() {
        let (pins, _handle) = MockPins::new();
        let mut panel = ButtonPanel::new(pins, MockClock::new());

        assert!(!panel.is_synchronized());
        assert!(matches!(panel.advance(0).await, Err(HardwareError::Desynchronized)));
    }

    #[tokio::test]
    async fn test_initialize_configures_and_clears() {
        let (pins, handle) = MockPins::new();
        let clock = MockClock::new();
        let mut panel = ButtonPanel::new(pins, clock.clone());

        panel.initialize().await.unwrap();

        assert!(handle.is_configured());
        assert!(panel.is_synchronized());
        assert_eq!(panel.state(), PanelState::default());
        for pin in Pin::ALL {
            assert_eq!(handle.level(pin), Some(PinLevel::Open));
        }
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(200)]);
    }

    #[tokio::test]
    async fn test_initialize_failure_is_reported() {
        let (pins, handle) = MockPins::new();
        handle.fail_configure("no device");
        let mut panel = ButtonPanel::new(pins, MockClock::new());

        let result = panel.initialize().await;

        assert!(matches!(result, Err(HardwareError::InitializationFailed { .. })));
        assert_eq!(handle.write_count(), 0);
    }

    #[tokio::test]
    async fn test_advance_toggles_line_and_waits() {
        let (mut panel, handle, clock) = ready_panel().await;
        let pin = Pin::preset(2).unwrap();

        let digit = panel.advance(2).await.unwrap();

        assert_eq!(digit.value(), 1);
        let levels: Vec<_> = handle.writes().iter().map(|w| (w.pin, w.level)).collect();
        assert_eq!(levels, vec![(pin, PinLevel::Closed), (pin, PinLevel::Open)]);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(200); 2]);
        assert_eq!(panel.press_count(), 1);
    }

    #[tokio::test]
    async fn test_advance_wraps_nine_to_zero() {
        let (mut panel, handle, _clock) = ready_panel().await;

        for _ in 0..9 {
            panel.advance(0).await.unwrap();
        }

        assert_eq!(panel.state().digits()[0], Digit::ZERO);
        assert_eq!(handle.displayed_digits(), [0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_advance_rejects_execute_position() {
        let (mut panel, _handle, _clock) = ready_panel().await;

        let result = panel.advance(4).await;

        assert!(matches!(result, Err(HardwareError::InvalidLine(_))));
        assert!(panel.is_synchronized());
    }

    #[tokio::test]
    async fn test_failed_press_leaves_digit_unchanged() {
        let (mut panel, handle, _clock) = ready_panel().await;
        let pin = Pin::preset(1).unwrap();
        handle.fail_on(pin, PinLevel::Open);

        let result = panel.advance(1).await;

        assert!(matches!(result, Err(HardwareError::PinWrite { .. })));
        assert_eq!(panel.state(), PanelState::default());
        assert!(!panel.is_synchronized());
        assert_eq!(panel.press_count(), 0);

        // Latched until a successful reset
        handle.clear_faults();
        assert!(matches!(panel.advance(1).await, Err(HardwareError::Desynchronized)));
        panel.reset().await.unwrap();
        panel.advance(1).await.unwrap();
        assert_eq!(panel.state().digits()[1].value(), 1);
    }

    #[tokio::test]
    async fn test_reset_restores_default_from_any_state() {
        let (mut panel, handle, _clock) = ready_panel().await;

        for position in 0..4 {
            for _ in 0..=position {
                panel.advance(position).await.unwrap();
            }
        }
        assert_ne!(panel.state(), PanelState::default());

        panel.reset().await.unwrap();

        assert_eq!(panel.state(), PanelState::default());
        let released: Vec<_> = handle.writes().iter().rev().take(5).map(|w| w.level).collect();
        assert_eq!(released, vec![PinLevel::Open; 5]);
    }

    #[tokio::test]
    async fn test_failed_reset_stays_desynchronized() {
        let (mut panel, handle, _clock) = ready_panel().await;
        handle.fail_on(Pin::EXECUTE, PinLevel::Open);

        assert!(panel.reset().await.is_err());
        assert!(!panel.is_synchronized());
    }
}
