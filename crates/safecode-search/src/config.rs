use std::time::Duration;

use safecode_core::constants::{
    CODE_SPACE, DEFAULT_ATTEMPTS_PER_WINDOW, DEFAULT_COOLDOWN_SECS, DEFAULT_MAX_CODE,
};
use safecode_core::{Error, Result};
use safecode_panel::{ExecuteTiming, PanelTiming};

/// Search parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Exclusive upper bound of the searched range `[0, max_code)`
    pub max_code: u16,

    /// Attempts allowed before a cooldown
    pub attempts_per_window: u32,

    /// Length of each cooldown
    pub cooldown: Duration,

    /// Wait out one cooldown before the first attempt
    pub cooldown_on_start: bool,

    /// Seed for candidate selection; entropy when unset
    pub seed: Option<u64>,

    /// Preset press and clear delays
    pub panel_timing: PanelTiming,

    /// Execute hold and settle delays
    pub execute_timing: ExecuteTiming,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_code: DEFAULT_MAX_CODE,
            attempts_per_window: DEFAULT_ATTEMPTS_PER_WINDOW,
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS), // 1 hour + 1 minute
            cooldown_on_start: false,
            seed: None,
            panel_timing: PanelTiming::default(),
            execute_timing: ExecuteTiming::default(),
        }
    }
}

impl SearchConfig {
    /// Create a configuration searching `[0, max_code)`
    pub fn new(max_code: u16) -> Self {
        Self {
            max_code,
            ..Default::default()
        }
    }

    /// Set the number of attempts per window
    pub fn attempts_per_window(mut self, attempts: u32) -> Self {
        self.attempts_per_window = attempts;
        self
    }

    /// Set the cooldown length
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set whether to cool down before the first attempt
    pub fn cooldown_on_start(mut self, enabled: bool) -> Self {
        self.cooldown_on_start = enabled;
        self
    }

    /// Set the selection seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the panel timing
    pub fn panel_timing(mut self, timing: PanelTiming) -> Self {
        self.panel_timing = timing;
        self
    }

    /// Set the execute timing
    pub fn execute_timing(mut self, timing: ExecuteTiming) -> Self {
        self.execute_timing = timing;
        self
    }

    /// Reject values the scheduler cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `max_code` is outside `1..=10000` or
    /// `attempts_per_window` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_code == 0 || self.max_code > CODE_SPACE {
            return Err(Error::Config(format!(
                "max_code must be between 1 and {CODE_SPACE}, got {}",
                self.max_code
            )));
        }
        if self.attempts_per_window == 0 {
            return Err(Error::Config(
                "attempts_per_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_match_device() {
        let config = SearchConfig::default();
        assert_eq!(config.max_code, 2000);
        assert_eq!(config.attempts_per_window, 2);
        assert_eq!(config.cooldown, Duration::from_secs(3660));
        assert!(!config.cooldown_on_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SearchConfig::new(5)
            .attempts_per_window(3)
            .cooldown(Duration::from_secs(10))
            .cooldown_on_start(true)
            .seed(42);

        assert_eq!(config.max_code, 5);
        assert_eq!(config.attempts_per_window, 3);
        assert_eq!(config.cooldown, Duration::from_secs(10));
        assert!(config.cooldown_on_start);
        assert_eq!(config.seed, Some(42));
    }

    #[rstest]
    #[case(SearchConfig::new(0))]
    #[case(SearchConfig::new(10_001))]
    #[case(SearchConfig::new(100).attempts_per_window(0))]
    fn test_invalid_configs(#[case] config: SearchConfig) {
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_full_code_space_is_valid() {
        assert!(SearchConfig::new(10_000).validate().is_ok());
    }
}
