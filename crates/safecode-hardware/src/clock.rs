//! Wall-clock implementation of [`Clock`].

use std::time::Duration;

use crate::traits::Clock;

/// Clock backed by `tokio::time::sleep`.
///
/// A scale factor shortens (or stretches) every wait, which is how dry runs
/// against the mock driver finish in seconds instead of days. Production
/// runs use a scale of `1.0`.
///
/// # Examples
///
/// ```
/// use safecode_hardware::clock::TokioClock;
/// use safecode_hardware::traits::Clock;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let clock = TokioClock::scaled(0.001);
///     clock.sleep(Duration::from_secs(1)).await; // ~1ms
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokioClock {
    scale: f64,
}

impl TokioClock {
    /// Create a clock that waits in real time.
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }

    /// Create a clock that multiplies every wait by `scale`.
    ///
    /// Negative and non-finite factors are treated as `0.0`. Scaled waits
    /// too long to represent saturate at [`Duration::MAX`].
    pub fn scaled(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            0.0
        };
        Self { scale }
    }

    /// The configured scale factor.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn effective(&self, duration: Duration) -> Duration {
        if self.scale == 1.0 {
            duration
        } else {
            Duration::try_from_secs_f64(duration.as_secs_f64() * self.scale)
                .unwrap_or(Duration::MAX)
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        let duration = self.effective(duration);
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_durations() {
        let clock = TokioClock::scaled(0.5);
        assert_eq!(clock.effective(Duration::from_secs(30)), Duration::from_secs(15));
        assert_eq!(TokioClock::new().effective(Duration::from_millis(200)), Duration::from_millis(200));
    }

    #[test]
    fn test_invalid_scale_collapses_to_zero() {
        assert_eq!(TokioClock::scaled(-1.0).scale(), 0.0);
        assert_eq!(TokioClock::scaled(f64::NAN).scale(), 0.0);
        assert_eq!(TokioClock::scaled(f64::INFINITY).scale(), 0.0);
    }

    #[test]
    fn test_huge_scale_saturates() {
        let clock = TokioClock::scaled(1e30);
        assert_eq!(clock.effective(Duration::from_secs(3660)), Duration::MAX);
        assert_eq!(clock.effective(Duration::ZERO), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_scale_sleep_does_not_panic() {
        let clock = TokioClock::scaled(f64::MAX);
        let sleep = clock.sleep(Duration::from_secs(3660));

        let finished = tokio::time::timeout(Duration::from_secs(60), sleep).await;

        assert!(finished.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_advances_tokio_time() {
        let clock = TokioClock::new();
        let start = tokio::time::Instant::now();

        clock.sleep(Duration::from_secs(3660)).await;

        assert!(start.elapsed() >= Duration::from_secs(3660));
    }
}
