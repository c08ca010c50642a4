//! Bounded exponential backoff for single-key point reads

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

/// How often and how patiently a point read is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps, for tests and tooling.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.initial_delay_ms, self.max_delay_ms)
    }
}

/// Doubling delay calculator with a ceiling.
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    attempt: u32,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            attempt: 0,
        }
    }

    /// Get the next delay and advance the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let exp = self
            .base_ms
            .saturating_mul(1u64.checked_shl(self.attempt).unwrap_or(u64::MAX));
        self.attempt = self.attempt.saturating_add(1);
        Duration::from_millis(exp.min(self.max_ms))
    }
}

/// Run `op` until it succeeds, fails permanently, or the policy gives up.
///
/// Only transient store errors are retried; the last error is returned as is.
pub async fn retry<T, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut backoff = policy.backoff();
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                let delay = backoff.next_delay();
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    label,
                    attempt,
                    policy.max_attempts,
                    delay,
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn busy() -> Error {
        Error::Storage(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        ))
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let mut backoff = RetryPolicy::default().backoff();
        let delays: Vec<u64> = (0..8).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32, 60, 60]);
    }

    #[tokio::test]
    async fn test_transient_errors_are_retried() {
        let mut calls = 0;
        let result = retry(&RetryPolicy::immediate(5), "get", || {
            calls += 1;
            if calls < 3 { Err(busy()) } else { Ok(calls) }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<()> = retry(&RetryPolicy::immediate(5), "get", || {
            calls += 1;
            Err(busy())
        })
        .await;
        assert!(result.unwrap_err().is_transient());
        assert_eq!(calls, 5);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<()> = retry(&RetryPolicy::immediate(5), "get", || {
            calls += 1;
            Err(Error::NotFound { table: "ace_apps", key: "a/b".to_string() })
        })
        .await;
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(calls, 1);
    }
}
