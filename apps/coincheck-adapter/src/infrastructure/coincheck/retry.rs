//! Retry scheduling for failed venue calls.
//!
//! A failed invocation is handed to the scheduler together with the gateway
//! that issued it. The scheduler waits out the policy delay on its own tokio
//! task and re-dispatches the identical invocation; it never looks at why
//! the call failed. A re-dispatched call that fails again comes back through
//! the gateway's failure path and is scheduled again.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use super::invocation::Invocation;

/// Delay policy for re-dispatching failed invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first re-dispatch.
    pub delay: Duration,
    /// Total attempts allowed, including the first; 0 = unlimited.
    pub max_attempts: u32,
    /// Growth factor applied to the delay per failed attempt; 1.0 = fixed.
    pub multiplier: f64,
    /// Upper bound for a grown delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(10))
    }
}

impl RetryPolicy {
    /// Unlimited retries at a fixed delay.
    #[must_use]
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: 0,
            multiplier: 1.0,
            max_delay: Duration::from_secs(300),
        }
    }

    /// Cap total attempts (0 = unlimited).
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Grow the delay by `multiplier` per failed attempt, up to `max_delay`.
    #[must_use]
    pub const fn with_backoff(mut self, multiplier: f64, max_delay: Duration) -> Self {
        self.multiplier = multiplier;
        self.max_delay = max_delay;
        self
    }

    /// Whether attempts are unlimited.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.max_attempts == 0
    }

    /// Delay before the next attempt after `failed_attempts` failures, or
    /// `None` once the attempt cap is reached.
    #[must_use]
    pub fn delay_for(&self, failed_attempts: u32) -> Option<Duration> {
        if !self.is_unbounded() && failed_attempts >= self.max_attempts {
            return None;
        }

        if self.multiplier <= 1.0 {
            return Some(self.delay);
        }

        let exponent = i32::try_from(failed_attempts.saturating_sub(1)).unwrap_or(i32::MAX);
        let cap = self.max_delay.max(self.delay);
        let grown = self.delay.as_secs_f64() * self.multiplier.powi(exponent);

        if !grown.is_finite() || grown >= cap.as_secs_f64() {
            return Some(cap);
        }
        Some(Duration::from_secs_f64(grown))
    }
}

/// Something a captured invocation can be re-dispatched to.
///
/// Implemented by the order gateway; the scheduler holds the target only
/// for as long as the invocation's timer is pending.
pub trait InvocationTarget: Send + Sync {
    /// Run `invocation` again as attempt number `attempt` (1-based).
    fn dispatch(self: Arc<Self>, invocation: Invocation, attempt: u32);
}

/// A failed invocation captured for re-dispatch.
pub struct RetryableInvocation {
    /// Gateway to re-dispatch to.
    pub target: Arc<dyn InvocationTarget>,
    /// Operation, original arguments and continuation.
    pub invocation: Invocation,
    /// Attempts made so far, all failed.
    pub attempt: u32,
}

impl RetryableInvocation {
    /// Capture a failed invocation.
    #[must_use]
    pub fn new(target: Arc<dyn InvocationTarget>, invocation: Invocation, attempt: u32) -> Self {
        Self {
            target,
            invocation,
            attempt,
        }
    }
}

impl std::fmt::Debug for RetryableInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryableInvocation")
            .field("operation", &self.invocation.operation())
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

/// Schedules re-dispatch of failed invocations.
#[derive(Debug, Clone)]
pub struct RetryScheduler {
    policy: RetryPolicy,
    runtime: Option<Handle>,
}

impl RetryScheduler {
    /// Create a scheduler with a policy. Timers run on the runtime current
    /// at the time of each retry.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            runtime: None,
        }
    }

    /// Run timers on `runtime` regardless of the calling thread.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Schedule exactly one re-dispatch of `retryable` after the policy delay.
    ///
    /// Returns the delay used. When the attempt cap is reached, or no runtime
    /// is available to run the timer, nothing is scheduled and the invocation
    /// is handed back. A scheduled retry cannot be cancelled.
    pub fn retry(&self, retryable: RetryableInvocation) -> Result<Duration, RetryableInvocation> {
        let Some(delay) = self.policy.delay_for(retryable.attempt) else {
            return Err(retryable);
        };
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::error!(
                operation = %retryable.invocation.operation(),
                "No tokio runtime to schedule retry on"
            );
            return Err(retryable);
        };

        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let RetryableInvocation {
                target,
                invocation,
                attempt,
            } = retryable;
            target.dispatch(invocation, attempt + 1);
        });

        Ok(delay)
    }
}
