//! Polling retry policy
//!
//! A build is polled on a fixed schedule until the service reports it ready.
//! The schedule is plain data so tests can drive it with a recording clock.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Error;

/// Something that can wait for a duration
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed-interval retry schedule
///
/// Every attempt is preceded by a wait: `initial_delay` before the first
/// attempt, `interval` before each later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub interval: Duration,
}

/// Why a retried operation gave up
#[derive(Debug)]
pub enum RetryFailure {
    /// A non-retryable error ended the loop early
    Fatal(Error),
    /// Every attempt failed with a retryable error
    Exhausted { attempts: u32, last: Error },
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, initial_delay: Duration, interval: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            interval,
        }
    }

    /// Wait applied before the zero-based `attempt`
    pub const fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            self.initial_delay
        } else {
            self.interval
        }
    }

    /// Run `op` until it succeeds, fails fatally, or the attempts run out
    ///
    /// Errors for which [`Error::is_retryable`] is false stop the loop at once.
    pub async fn run<T, F, Fut>(
        &self,
        sleeper: &dyn Sleeper,
        mut op: F,
    ) -> std::result::Result<T, RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        let mut last = None;

        for attempt in 0..self.max_attempts {
            sleeper.sleep(self.delay_before(attempt)).await;

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "attempt failed, will retry"
                    );
                    last = Some(err);
                }
                Err(err) => return Err(RetryFailure::Fatal(err)),
            }
        }

        Err(RetryFailure::Exhausted {
            attempts: self.max_attempts,
            last: last.unwrap_or_else(|| Error::General("retry policy allows no attempts".into())),
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(6, Duration::from_secs(5), Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Virtual clock that records requested waits without sleeping
    #[derive(Debug, Default)]
    struct RecordingSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    fn not_ready() -> Error {
        Error::Api {
            method: "GET".into(),
            path: "/build".into(),
            status: 404,
            status_line: "404 Not Found".into(),
            body: "building".into(),
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(6, Duration::from_secs(5), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let sleeper = RecordingSleeper::default();
        let result = policy()
            .run(&sleeper, |attempt| async move {
                if attempt < 5 { Err(not_ready()) } else { Ok(attempt) }
            })
            .await;

        assert_eq!(result.unwrap(), 5);
        let waits = sleeper.waits.lock().unwrap();
        assert_eq!(waits.len(), 6);
        assert!(waits.iter().all(|w| *w == Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_exhausted_keeps_last_error() {
        let sleeper = RecordingSleeper::default();
        let result: std::result::Result<(), _> = policy()
            .run(&sleeper, |attempt| async move {
                Err(Error::transport("GET", "/build", format!("attempt {attempt}")))
            })
            .await;

        match result {
            Err(RetryFailure::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 6);
                assert!(last.to_string().contains("attempt 5"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(sleeper.waits.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_fatal_error_stops_immediately() {
        let sleeper = RecordingSleeper::default();
        let mut calls = 0;
        let result: std::result::Result<(), _> = policy()
            .run(&sleeper, |_| {
                calls += 1;
                async { Err(Error::Validation("bad".into())) }
            })
            .await;

        assert!(matches!(result, Err(RetryFailure::Fatal(Error::Validation(_)))));
        assert_eq!(calls, 1);
        assert_eq!(sleeper.waits.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(2));
        assert_eq!(policy.delay_before(0), Duration::from_secs(1));
        assert_eq!(policy.delay_before(1), Duration::from_secs(2));
        assert_eq!(policy.delay_before(2), Duration::from_secs(2));
    }
}
