//! Retry policy for transient upstream failures.

use std::time::Duration;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between retries.
    Fixed { delay: Duration },
    /// Exponential delay: `base * factor^k` before retry `k`, capped at
    /// `max`, with optional additive jitter drawn uniformly from
    /// `[0, base)` so concurrent callers do not retry in lockstep.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry `retry` (0-based: the delay after the first
    /// failed attempt is `delay(0)`).
    pub fn delay(self, retry: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(retry as i32);
                let seconds = base.as_secs_f64() * scale;
                let mut delay = Duration::from_secs_f64(seconds.min(max.as_secs_f64()));
                if jitter {
                    delay += base.mul_f64(fastrand::f64());
                }
                delay
            }
        }
    }
}

/// Retry policy applied by the request executor.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    /// Backoff strategy between attempts.
    pub backoff: Backoff,
    /// Per-attempt round-trip timeout.
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::default(),
            attempt_timeout: Duration::from_secs(20),
        }
    }
}

impl RetryConfig {
    /// Fixed-delay policy, mostly useful in tests.
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    /// Single-attempt policy.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Whether an HTTP status counts as transient.
    ///
    /// Must stay consistent with the error classifier: the kinds it marks
    /// retryable are exactly the statuses retried here.
    pub const fn is_transient_status(status: u16) -> bool {
        status == 429 || status >= 500
    }

    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff.delay(retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_is_constant() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(100),
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(7), Duration::from_millis(100));
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let backoff = Backoff::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_secs(1));
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
        assert_eq!(backoff.delay(4), Duration::from_secs(8));
    }

    #[test]
    fn jitter_adds_less_than_one_base_unit() {
        let base = Duration::from_secs(1);
        let backoff = Backoff::Exponential {
            base,
            factor: 2.0,
            max: Duration::from_secs(8),
            jitter: true,
        };

        for _ in 0..50 {
            let delay = backoff.delay(1);
            assert!(delay >= Duration::from_secs(2));
            assert!(delay < Duration::from_secs(2) + base);
        }
    }

    #[test]
    fn transient_statuses_are_429_and_5xx() {
        assert!(RetryConfig::is_transient_status(429));
        assert!(RetryConfig::is_transient_status(500));
        assert!(RetryConfig::is_transient_status(502));
        assert!(RetryConfig::is_transient_status(503));
        assert!(RetryConfig::is_transient_status(599));
        assert!(!RetryConfig::is_transient_status(400));
        assert!(!RetryConfig::is_transient_status(401));
        assert!(!RetryConfig::is_transient_status(404));
        assert!(!RetryConfig::is_transient_status(200));
    }

    #[test]
    fn default_policy_bounds_total_attempts() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.attempt_timeout, Duration::from_secs(20));
    }
}
