//! Exponential backoff state machine used by the connection manager.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::config::BackoffPolicy;

/// Tracks consecutive connection failures and produces jittered delays.
///
/// The k-th sleep after a reset draws uniformly from `[base, 2 * base)` where
/// `base = min(policy.base * 2^k, policy.cap)`.
pub struct BackoffState {
    policy: BackoffPolicy,
    current: Duration,
    failures: u32,
    rng: StdRng,
}

impl BackoffState {
    /// Create a new state machine from the supplied policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    /// Create a state machine with a caller-supplied random source.
    pub fn with_rng(policy: BackoffPolicy, rng: StdRng) -> Self {
        Self {
            current: policy.base,
            failures: 0,
            rng,
            policy,
        }
    }

    /// Forget previous failures; the next sleep starts from the base delay.
    pub fn reset(&mut self) {
        self.current = self.policy.base;
        self.failures = 0;
    }

    /// Consecutive failures recorded since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Base delay that the next call to [`next_sleep`](Self::next_sleep) will use.
    pub fn current_base(&self) -> Duration {
        self.current
    }

    /// Record a failure and return the jittered sleep to apply before retrying.
    pub fn next_sleep(&mut self) -> Duration {
        let base = self.current.min(self.policy.cap);
        self.failures = self.failures.saturating_add(1);
        self.current = base.saturating_mul(2).min(self.policy.cap);

        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        if base_ms == 0 {
            return Duration::ZERO;
        }
        let upper = base_ms.saturating_mul(2);
        if upper <= base_ms {
            return Duration::from_millis(base_ms);
        }
        Duration::from_millis(self.rng.gen_range(base_ms..upper))
    }
}

impl std::fmt::Debug for BackoffState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackoffState")
            .field("policy", &self.policy)
            .field("current", &self.current)
            .field("failures", &self.failures)
            .finish()
    }
}
