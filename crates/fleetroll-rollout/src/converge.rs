//! Convergence wait — block until a group's instances are all quiescent.

use std::time::Duration;

use tracing::debug;

use fleetroll_compute::ComputeClient;

use crate::clock::Sleeper;
use crate::error::RolloutResult;

/// Poll the managed-instance list until no instance reports an in-flight
/// action.
///
/// There is no attempt cap: the rollout cannot safely proceed past a
/// still-mutating fleet, so the only exits are quiescence or a listing
/// failure. "Still busy" is not an error, only a reason to keep
/// looping.
pub async fn wait_for_group_idle(
    client: &dyn ComputeClient,
    sleeper: &dyn Sleeper,
    interval: Duration,
    project: &str,
    zone: &str,
    group: &str,
) -> RolloutResult<()> {
    let mut poll: u32 = 0;
    loop {
        let instances = client.list_managed_instances(project, zone, group).await?;

        let mut busy = false;
        for instance in &instances {
            if !instance.current_action.is_idle() {
                debug!(
                    instance = instance.short_name(),
                    action = ?instance.current_action,
                    "instance still converging"
                );
                busy = true;
            }
        }

        if !busy {
            return Ok(());
        }

        poll += 1;
        debug!(group, poll, "group still converging, waiting");
        sleeper.sleep(interval).await;
    }
}
