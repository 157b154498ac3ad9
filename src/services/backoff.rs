//! Rate-limit backoff policy.
//!
//! Each 429 on a page waits `base * 2^(n-1)`, capped at `max`, with a random
//! jitter of `±jitter_pct`. A `Retry-After` hint from the server replaces the
//! exponential term but is still capped.

use std::time::Duration;

use rand::Rng;

use crate::models::RetryConfig;

#[derive(Debug, Clone)]
pub struct Backoff {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter_pct: f64,
}

impl Backoff {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
            jitter_pct: config.jitter_pct.clamp(0.0, 1.0),
        }
    }

    /// Max requests per page, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the next request after the `attempt`-th request was rate limited.
    pub fn delay_for_attempt(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(hint) = retry_after {
            return hint.min(self.max_delay);
        }

        let exp = 2u32.saturating_pow(attempt.saturating_sub(1));
        let base = self
            .base_delay
            .checked_mul(exp)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        self.jitter(base)
    }

    fn jitter(&self, delay: Duration) -> Duration {
        if self.jitter_pct <= 0.0 || delay.is_zero() {
            return delay;
        }
        let factor = rand::thread_rng().gen_range(-self.jitter_pct..=self.jitter_pct);
        delay.mul_f64(1.0 + factor).min(self.max_delay)
    }
}
