//! Exponential backoff for the export path. The delay sequence is pure state
//! (`RetryState`), kept separate from the sleeping/looping so both the
//! sequence and the policy bound are testable on their own.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

/// Backoff policy. `max_attempts: None` reproduces the reference behavior:
/// retry the same unit forever until it succeeds, at the cost of an
/// effectively un-cancelable stall when the failure is persistent.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    pub fn state(&self) -> RetryState {
        RetryState {
            attempt: 0,
            delay: self.initial_delay,
        }
    }
}

/// Per-unit retry bookkeeping: how many attempts have failed and how long to
/// wait before the next one. The delay strictly doubles on each failure.
#[derive(Debug, Clone, Copy)]
pub struct RetryState {
    pub attempt: u32,
    pub delay: Duration,
}

impl RetryState {
    /// Record one failure. Returns the delay to sleep before the next
    /// attempt, or `None` when the policy's attempt bound is exhausted.
    pub fn backoff(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        self.attempt += 1;
        if let Some(max) = policy.max_attempts {
            if self.attempt >= max {
                return None;
            }
        }
        let d = self.delay;
        self.delay = self.delay.saturating_mul(2);
        Some(d)
    }
}

/// Retry an operation under `policy`; the future is re-created per attempt.
/// Exhausting a bounded policy returns the last error to the caller, which
/// decides whether to abandon the unit.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, unit: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut state = policy.state();
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => match state.backoff(policy) {
                Some(delay) => {
                    warn!(
                        error = ?e,
                        unit,
                        attempt = state.attempt,
                        delay_ms = delay.as_millis() as u64,
                        "operation failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_sequence_strictly_doubles() {
        let policy = RetryPolicy::default();
        let mut state = policy.state();
        let delays: Vec<u64> = (0..4)
            .map(|_| state.backoff(&policy).unwrap().as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800]);
    }

    #[test]
    fn bounded_policy_exhausts_after_max_attempts() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(100),
            max_attempts: Some(3),
        };
        let mut state = policy.state();
        assert!(state.backoff(&policy).is_some());
        assert!(state.backoff(&policy).is_some());
        assert!(state.backoff(&policy).is_none());
        assert_eq!(state.attempt, 3);
    }
}
