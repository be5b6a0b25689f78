use crate::AgentError;
use std::time::Duration;
use tracing::warn;

/// Bounded retry with a fixed, non-exponential backoff. Exhaustion is
/// reported as `None`, never raised; the failed operation stays logged.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn with_backoff(max_attempts: u32, backoff_ms: u64) -> Self {
        Self {
            max_attempts,
            backoff_ms,
        }
    }

    pub fn run<T, F>(&self, op: &str, mut call: F) -> Option<T>
    where
        F: FnMut() -> Result<T, AgentError>,
    {
        let attempts = self.max_attempts.max(1);
        for attempt in 1..=attempts {
            match call() {
                Ok(value) => return Some(value),
                Err(err) => {
                    warn!(op, attempt, max = attempts, error = %err, "attempt failed");
                    if attempt < attempts && self.backoff_ms > 0 {
                        std::thread::sleep(Duration::from_millis(self.backoff_ms));
                    }
                }
            }
        }
        warn!(op, attempts, "retry budget exhausted, abandoning operation");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_returns_immediately() {
        let policy = RetryPolicy::with_backoff(3, 0);
        let mut calls = 0;
        let result = policy.run("op", || {
            calls += 1;
            Ok::<_, AgentError>(42)
        });
        assert_eq!(result, Some(42));
        assert_eq!(calls, 1);
    }

    #[test]
    fn recovers_within_budget() {
        let policy = RetryPolicy::with_backoff(3, 0);
        let mut calls = 0;
        let result = policy.run("op", || {
            calls += 1;
            if calls < 3 {
                Err(AgentError::Device("flaky".into()))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result, Some(3));
    }

    #[test]
    fn exhaustion_returns_none_after_max_attempts() {
        let policy = RetryPolicy::with_backoff(3, 0);
        let mut calls = 0;
        let result: Option<()> = policy.run("op", || {
            calls += 1;
            Err(AgentError::Device("down".into()))
        });
        assert_eq!(result, None);
        assert_eq!(calls, 3);
    }

    #[test]
    fn zero_attempts_still_calls_once() {
        let policy = RetryPolicy::with_backoff(0, 0);
        let mut calls = 0;
        let _: Option<()> = policy.run("op", || {
            calls += 1;
            Err(AgentError::Device("down".into()))
        });
        assert_eq!(calls, 1);
    }
}
