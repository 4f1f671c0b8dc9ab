//! Group repoint — move a managed group onto a new launch template.

use tracing::info;

use fleetroll_compute::{ComputeClient, InstanceGroup, InstanceTemplate};

use crate::clock::Sleeper;
use crate::config::RolloutConfig;
use crate::error::RolloutResult;
use crate::retry::with_retry;

/// Fully-qualified reference to a project-global instance template.
pub fn template_link(project: &str, name: &str) -> String {
    format!("projects/{project}/global/instanceTemplates/{name}")
}

/// Point `group` at `template` and wait until the control plane reports
/// it.
///
/// The set call and the follow-up read run on the bounded retry policy.
/// The confirmation poll is unbounded: template propagation is
/// eventually consistent, and returning early would hand the caller a
/// group that still stamps instances from the old template. Read
/// failures inside the unbounded poll propagate immediately.
pub async fn repoint_group(
    client: &dyn ComputeClient,
    sleeper: &dyn Sleeper,
    config: &RolloutConfig,
    project: &str,
    zone: &str,
    group: &str,
    template: &InstanceTemplate,
) -> RolloutResult<InstanceGroup> {
    let link = template_link(project, &template.name);

    with_retry(config.api_retry, sleeper, "set instance template", || {
        client.set_instance_template(project, zone, group, &link)
    })
    .await?;

    let mut current = with_retry(config.api_retry, sleeper, "get instance group", || {
        client.get_instance_group(project, zone, group)
    })
    .await?;

    while !current.instance_template.contains(&template.name) {
        info!(
            group = %current.name,
            have = %current.instance_template,
            want = %template.name,
            "waiting for group template to update"
        );
        sleeper.sleep(config.confirm_interval).await;
        current = client.get_instance_group(project, zone, group).await?;
    }

    info!(group = %current.name, template = %template.name, "group repointed");
    Ok(current)
}

#[cfg(test)]
mod tests {
    use fleetroll_compute::mock::MockCompute;

    use super::*;
    use crate::clock::InstantSleeper;

    fn repointed_group() -> InstanceGroup {
        InstanceGroup {
            name: "web-group".to_string(),
            instance_template: template_link("acme", "2024-01-web-template"),
            target_size: 3,
        }
    }

    fn stale_group() -> InstanceGroup {
        InstanceGroup {
            name: "web-group".to_string(),
            instance_template: template_link("acme", "old-template"),
            target_size: 3,
        }
    }

    async fn run(mock: &MockCompute, sleeper: &InstantSleeper) -> RolloutResult<InstanceGroup> {
        repoint_group(
            mock,
            sleeper,
            &RolloutConfig::default(),
            "acme",
            "us-central1-a",
            "web-group",
            &InstanceTemplate::new("2024-01-web-template"),
        )
        .await
    }

    #[tokio::test]
    async fn sets_template_and_confirms() {
        let mock = MockCompute::new();
        mock.set_group(repointed_group());
        let sleeper = InstantSleeper::new();

        let group = run(&mock, &sleeper).await.unwrap();

        assert_eq!(group, repointed_group());
        assert_eq!(
            mock.set_template_links(),
            vec![template_link("acme", "2024-01-web-template")]
        );
        assert_eq!(mock.calls().set_template, 1);
        assert_eq!(mock.calls().get_group, 1);
    }

    #[tokio::test]
    async fn set_template_recovers_within_retry_budget() {
        let mock = MockCompute::new();
        mock.set_group(repointed_group());
        for _ in 0..4 {
            mock.script_set_template(Err(MockCompute::transient("backend error")));
        }
        let sleeper = InstantSleeper::new();

        run(&mock, &sleeper).await.unwrap();
        assert_eq!(mock.calls().set_template, 5);
    }

    #[tokio::test]
    async fn set_template_retries_are_bounded() {
        let mock = MockCompute::new();
        mock.set_group(repointed_group());
        for _ in 0..5 {
            mock.script_set_template(Err(MockCompute::transient("backend error")));
        }
        let sleeper = InstantSleeper::new();

        let err = run(&mock, &sleeper).await.unwrap_err();
        assert!(matches!(err, crate::error::RolloutError::Compute(_)));
        assert_eq!(mock.calls().set_template, 5);
        assert_eq!(mock.calls().get_group, 0);
    }

    #[tokio::test]
    async fn polls_until_template_reference_updates() {
        let mock = MockCompute::new();
        mock.set_group(repointed_group());
        mock.script_get_group(Ok(stale_group()));
        mock.script_get_group(Ok(stale_group()));
        let sleeper = InstantSleeper::new();

        let group = run(&mock, &sleeper).await.unwrap();

        assert_eq!(group, repointed_group());
        // Two stale reads, then the fixture group.
        assert_eq!(mock.calls().get_group, 3);
        assert_eq!(
            sleeper.slept(),
            vec![std::time::Duration::from_secs(1); 2]
        );
    }

    #[tokio::test]
    async fn confirmation_read_failure_propagates() {
        let mock = MockCompute::new();
        mock.script_get_group(Ok(stale_group()));
        mock.script_get_group(Err(MockCompute::transient("backend error")));
        let sleeper = InstantSleeper::new();

        let err = run(&mock, &sleeper).await.unwrap_err();
        assert!(matches!(err, crate::error::RolloutError::Compute(_)));
        assert_eq!(mock.calls().get_group, 2);
    }
}
