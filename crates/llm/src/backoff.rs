//! Exponential back-off schedule for retryable provider errors.

use std::time::Duration;

/// Longest delay between two attempts, whatever the schedule or the provider
/// asks for.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Doubling delay schedule starting at `initial`, capped at [`MAX_BACKOFF`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
}

impl Backoff {
    /// Schedule whose first retry waits `initial`.
    pub fn new(initial: Duration) -> Self {
        Self { initial }
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// A provider-supplied `Retry-After` wins over the schedule but is still
    /// capped.
    pub fn delay(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let scheduled = retry_after.unwrap_or_else(|| {
            let exponent = retry.saturating_sub(1).min(16);
            self.initial.saturating_mul(1u32 << exponent)
        });
        scheduled.min(MAX_BACKOFF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_per_retry() {
        let backoff = Backoff::new(Duration::from_millis(500));
        assert_eq!(backoff.delay(1, None), Duration::from_millis(500));
        assert_eq!(backoff.delay(2, None), Duration::from_secs(1));
        assert_eq!(backoff.delay(3, None), Duration::from_secs(2));
    }

    #[test]
    fn delay_is_capped() {
        let backoff = Backoff::new(Duration::from_secs(10));
        assert_eq!(backoff.delay(10, None), MAX_BACKOFF);
        assert_eq!(backoff.delay(u32::MAX, None), MAX_BACKOFF);
    }

    #[test]
    fn retry_after_overrides_schedule() {
        let backoff = Backoff::new(Duration::from_millis(500));
        assert_eq!(
            backoff.delay(1, Some(Duration::from_secs(4))),
            Duration::from_secs(4)
        );
        assert_eq!(backoff.delay(1, Some(Duration::from_secs(600))), MAX_BACKOFF);
    }
}
