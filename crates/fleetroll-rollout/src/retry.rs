//! Bounded retry for transient provider failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use fleetroll_compute::ComputeResult;

use crate::clock::Sleeper;

/// Fixed-delay retry budget for a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted.
///
/// Every failure is retried alike; once the budget is spent the last
/// error is returned unchanged.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    sleeper: &dyn Sleeper,
    call: &str,
    mut op: F,
) -> ComputeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ComputeResult<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.attempts => {
                warn!(call, attempt, error = %err, "provider call failed, retrying");
                sleeper.sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
