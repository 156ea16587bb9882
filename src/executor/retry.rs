use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::executor::collaborators::AtomicActionExecutor;
use crate::executor::result::{AtomicFailure, ExecuteFailReason};
use crate::model::Trigger;

/// Caller-chosen retry rule for atomic dispatch.
///
/// `max_attempts` counts the first try, so `1` never retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub retry_on: Vec<ExecuteFailReason>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
            retry_on: Vec::new(),
        }
    }

    pub fn new(max_attempts: u32, backoff: Duration, retry_on: Vec<ExecuteFailReason>) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retry_on,
        }
    }

    /// Whether attempt number `attempt` (1-based) that failed with `reason`
    /// may be followed by another.
    pub fn should_retry(&self, attempt: u32, reason: ExecuteFailReason) -> bool {
        attempt < self.max_attempts && self.retry_on.contains(&reason)
    }
}

/// Wraps an atomic executor with a [`RetryPolicy`].
pub struct RetryingActionExecutor {
    inner: Arc<dyn AtomicActionExecutor>,
    policy: RetryPolicy,
}

impl RetryingActionExecutor {
    pub fn new(inner: Arc<dyn AtomicActionExecutor>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl AtomicActionExecutor for RetryingActionExecutor {
    fn run(&self, element_id: &str, trigger: Trigger) -> Result<(), AtomicFailure> {
        let mut attempt = 1;
        loop {
            match self.inner.run(element_id, trigger) {
                Ok(()) => return Ok(()),
                Err(failure) if self.policy.should_retry(attempt, failure.into()) => {
                    debug!(element_id, attempt, failure = %failure, "Retrying dispatch");
                    if !self.policy.backoff.is_zero() {
                        thread::sleep(self.policy.backoff);
                    }
                    attempt += 1;
                }
                Err(failure) => return Err(failure),
            }
        }
    }
}
