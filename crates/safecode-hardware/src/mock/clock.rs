//! Mock clock that records requested waits instead of sleeping.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::traits::Clock;

/// Clock that returns immediately and remembers every requested duration.
///
/// Clones share the same record, so a test keeps one clone and hands the
/// other to the code under test.
///
/// # Examples
///
/// ```
/// use safecode_hardware::mock::MockClock;
/// use safecode_hardware::traits::Clock;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let clock = MockClock::new();
///     let observer = clock.clone();
///
///     clock.sleep(Duration::from_secs(5)).await;
///     clock.sleep(Duration::from_secs(30)).await;
///
///     assert_eq!(observer.total(), Duration::from_secs(35));
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl MockClock {
    /// Create a clock with an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Duration>> {
        self.sleeps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every requested wait, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().clone()
    }

    /// Sum of all requested waits.
    pub fn total(&self) -> Duration {
        self.lock().iter().sum()
    }

    /// Number of requested waits equal to `duration`.
    pub fn count_of(&self, duration: Duration) -> usize {
        self.lock().iter().filter(|d| **d == duration).count()
    }

    /// Forget recorded waits.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Clock for MockClock {
    async fn sleep(&self, duration: Duration) {
        self.lock().push(duration);
    }
}
