//! Group resize — change target size and wait for the fleet to settle.
//!
//! Not part of the rolling-replacement path. Exposed for operators that
//! need to grow or shrink a group with the same retry and convergence
//! guarantees the rollout uses.

use tracing::info;

use fleetroll_compute::ComputeClient;

use crate::clock::Sleeper;
use crate::config::RolloutConfig;
use crate::converge::wait_for_group_idle;
use crate::error::RolloutResult;
use crate::retry::with_retry;

/// Resize `group` to `size` and block until every instance is quiescent.
pub async fn resize_group(
    client: &dyn ComputeClient,
    sleeper: &dyn Sleeper,
    config: &RolloutConfig,
    project: &str,
    zone: &str,
    group: &str,
    size: u64,
) -> RolloutResult<()> {
    info!(group, size, "resizing instance group");

    with_retry(config.api_retry, sleeper, "resize instance group", || {
        client.resize_group(project, zone, group, size)
    })
    .await?;

    wait_for_group_idle(
        client,
        sleeper,
        config.converge_interval,
        project,
        zone,
        group,
    )
    .await
}

#[cfg(test)]
mod tests {
    use fleetroll_compute::mock::MockCompute;
    use fleetroll_compute::{CurrentAction, ManagedInstance};

    use super::*;
    use crate::clock::InstantSleeper;

    async fn run(mock: &MockCompute, size: u64) -> RolloutResult<()> {
        resize_group(
            mock,
            &InstantSleeper::new(),
            &RolloutConfig::default(),
            "acme",
            "us-central1-a",
            "web-group",
            size,
        )
        .await
    }

    #[tokio::test]
    async fn resizes_then_waits_for_quiescence() {
        let mock = MockCompute::new();
        mock.script_instances(Ok(vec![ManagedInstance::new(
            "projects/acme/zones/us-central1-a/instances/web-4",
            CurrentAction::Creating,
        )]));
        mock.script_instances(Ok(vec![ManagedInstance::new(
            "projects/acme/zones/us-central1-a/instances/web-4",
            CurrentAction::None,
        )]));

        run(&mock, 4).await.unwrap();

        assert_eq!(mock.resizes(), vec![4]);
        assert_eq!(mock.calls().list_instances, 2);
    }

    #[tokio::test]
    async fn resize_recovers_within_retry_budget() {
        let mock = MockCompute::new();
        for _ in 0..4 {
            mock.script_resize(Err(MockCompute::transient("backend error")));
        }

        run(&mock, 2).await.unwrap();
        assert_eq!(mock.calls().resize, 5);
        assert_eq!(mock.resizes(), vec![2]);
    }

    #[tokio::test]
    async fn resize_retries_are_bounded() {
        let mock = MockCompute::new();
        for _ in 0..5 {
            mock.script_resize(Err(MockCompute::transient("backend error")));
        }

        assert!(run(&mock, 2).await.is_err());
        assert_eq!(mock.calls().resize, 5);
        // Convergence is never consulted when the resize itself fails.
        assert_eq!(mock.calls().list_instances, 0);
    }
}
