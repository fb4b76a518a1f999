//! Drop-based rate limiting for noisy event sources

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Admits at most one event per rolling window; the rest are dropped
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_admitted: Mutex<Option<Instant>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: Mutex::new(None),
        }
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether an event arriving now may pass
    pub fn admit(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last_admitted.lock();
        match *last {
            Some(at) if now.duration_since(at) < self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn one_event_per_window() {
        let debouncer = Debouncer::new(Duration::from_millis(1000));

        assert!(debouncer.admit());
        assert!(!debouncer.admit());

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(!debouncer.admit());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(debouncer.admit());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_events_do_not_extend_the_window() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(debouncer.admit());
        for _ in 0..3 {
            tokio::time::advance(Duration::from_millis(30)).await;
            assert!(!debouncer.admit());
        }
        // 110ms after the admitted event, 20ms after the last dropped one
        tokio::time::advance(Duration::from_millis(20)).await;
        assert!(debouncer.admit());
    }
}
