//! Transport-level retry timing.
//!
//! [`BackoffConfig`] controls how transient HTTP errors (429, 5xx,
//! connection failures) are retried with increasing delays. This is
//! deliberately separate from the semantic retry budget in
//! [`crate::retry`]: a rate-limited request and a malformed response are
//! different failures with different cures.

use std::time::Duration;

/// Configuration for transport-level retry with exponential backoff.
///
/// # Example
///
/// ```
/// use recipegen::backend::BackoffConfig;
///
/// // No transport retry (default)
/// let none = BackoffConfig::none();
/// assert_eq!(none.max_retries, 0);
///
/// // Cloud-API settings: 3 retries, full jitter, respects Retry-After
/// let standard = BackoffConfig::standard();
/// assert_eq!(standard.max_retries, 3);
/// ```
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Maximum number of transport retries. Default: 0 (no retry).
    pub max_retries: u32,

    /// Initial delay before the first retry. Default: 1 second.
    pub initial_delay: Duration,

    /// Multiplier applied to the delay after each retry. Default: 2.0.
    pub multiplier: f64,

    /// Cap on the delay between retries. Default: 60 seconds.
    pub max_delay: Duration,

    /// Apply full jitter (random delay in `[0, calculated]`). Default: true.
    pub jitter: bool,

    /// HTTP status codes that trigger retry. Default: `[429, 500, 502, 503, 504]`.
    pub retryable_statuses: Vec<u16>,

    /// Whether to respect `Retry-After` headers from the provider.
    /// Default: `true`.
    pub respect_retry_after: bool,
}

impl BackoffConfig {
    /// No transport retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::standard()
        }
    }

    /// Sensible defaults for cloud APIs: 3 retries, 1s initial, 2x
    /// multiplier, 60s cap, full jitter, respects Retry-After.
    pub fn standard() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            jitter: true,
            retryable_statuses: vec![429, 500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// Calculate the delay for retry attempt N (0-indexed).
    ///
    /// The base delay is `initial_delay * multiplier^attempt`, capped at
    /// `max_delay`, then jittered if enabled.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());
        let jittered = if self.jitter {
            fastrand::f64() * capped
        } else {
            capped
        };
        Duration::from_secs_f64(jittered)
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> BackoffConfig {
        BackoffConfig {
            jitter: false,
            ..BackoffConfig::standard()
        }
    }

    #[test]
    fn test_delay_exponential() {
        let config = no_jitter();
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(8));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let config = BackoffConfig {
            max_delay: Duration::from_secs(5),
            ..no_jitter()
        };
        assert_eq!(config.delay_for_attempt(3), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let config = BackoffConfig::standard();
        for _ in 0..100 {
            assert!(config.delay_for_attempt(1) <= Duration::from_secs(2));
        }
    }

    #[test]
    fn test_none_preset() {
        assert_eq!(BackoffConfig::none().max_retries, 0);
    }

    #[test]
    fn test_standard_preset() {
        let config = BackoffConfig::standard();
        assert_eq!(config.max_retries, 3);
        assert!(config.retryable_statuses.contains(&429));
        assert!(config.retryable_statuses.contains(&503));
        assert!(config.respect_retry_after);
    }
}
