//! Attempt window accounting.
//!
//! The device locks out after a small number of wrong codes; counting
//! attempts here decides when the scheduler has to wait. The wait itself is
//! performed by the scheduler so it can be interrupted.

use std::time::Duration;

/// Counts attempts since the last cooldown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiter {
    limit: u32,
    cooldown: Duration,
    attempts: u32,
    cooldowns: u32,
}

impl RateLimiter {
    /// Allow `limit` attempts per window, then wait `cooldown`.
    ///
    /// A `limit` of zero is treated as one.
    pub fn new(limit: u32, cooldown: Duration) -> Self {
        Self {
            limit: limit.max(1),
            cooldown,
            attempts: 0,
            cooldowns: 0,
        }
    }

    /// Count a completed attempt. Returns `true` once the window is full.
    pub fn record_attempt(&mut self) -> bool {
        self.attempts = self.attempts.saturating_add(1);
        self.is_exhausted()
    }

    /// Whether a cooldown must happen before the next attempt.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.limit
    }

    /// Close the window after the cooldown elapsed.
    pub fn complete_cooldown(&mut self) {
        self.attempts = 0;
        self.cooldowns += 1;
    }

    /// Attempts counted in the current window.
    pub fn attempts_in_window(&self) -> u32 {
        self.attempts
    }

    /// Attempts allowed per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// How long a cooldown lasts.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Cooldowns completed so far.
    pub fn cooldowns_completed(&self) -> u32 {
        self.cooldowns
    }
}
