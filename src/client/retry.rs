use crate::config::ClientConfig;
use std::time::Duration;

/// What to do with a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Evict the cache entry, wait `delay`, then fetch again
    Retry { delay: Duration },
    /// Give up on the request
    Drop,
}

/// Attempt accounting and linear backoff for failed requests
///
/// A failure is retried while `attempt < max_retry` and its status is not in
/// the permanent set. Failures without a status (timeouts, resets) are always
/// transient. The n-th retry waits `n × base_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retry: u32,
    base_delay: Duration,
    permanent_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn new(max_retry: u32, base_delay: Duration, permanent_statuses: Vec<u16>) -> Self {
        Self {
            max_retry,
            base_delay,
            permanent_statuses,
        }
    }

    /// Retry settings of a client section; the base delay is the per-request delay
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.max_retry,
            config.delay,
            config.permanent_statuses.clone(),
        )
    }

    pub fn is_permanent(&self, status: Option<u16>) -> bool {
        status.is_some_and(|s| self.permanent_statuses.contains(&s))
    }

    /// Decides the fate of a request that failed on its `attempt`-th fetch
    ///
    /// # Example
    ///
    /// ```
    /// use michelin_my_maps::client::{RetryDecision, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_secs(1), vec![403]);
    /// assert_eq!(
    ///     policy.decide(2, Some(500)),
    ///     RetryDecision::Retry { delay: Duration::from_secs(2) }
    /// );
    /// assert_eq!(policy.decide(3, Some(500)), RetryDecision::Drop);
    /// assert_eq!(policy.decide(1, Some(403)), RetryDecision::Drop);
    /// ```
    pub fn decide(&self, attempt: u32, status: Option<u16>) -> RetryDecision {
        if attempt >= self.max_retry || self.is_permanent(status) {
            return RetryDecision::Drop;
        }
        RetryDecision::Retry {
            delay: self.base_delay.saturating_mul(attempt.max(1)),
        }
    }
}
