//! End-to-end rollout against the scripted provider: image resolution,
//! template cloning, repoint confirmation and the full replacement walk,
//! asserted as an exact provider trace.

use std::sync::Arc;
use std::time::Duration;

use fleetroll_compute::mock::MockCompute;
use fleetroll_compute::{
    AttachedDisk, CurrentAction, DiskInitializeParams, InstanceGroup, InstanceTemplate,
    ManagedInstance, TemplateProperties,
};
use fleetroll_rollout::{InstantSleeper, RolloutDriver, RolloutPhase, RolloutRequest};

fn base_template() -> InstanceTemplate {
    InstanceTemplate {
        name: "base-template".to_string(),
        properties: TemplateProperties {
            disks: vec![AttachedDisk {
                initialize_params: Some(DiskInitializeParams {
                    source_image: Some("projects/acme/global/images/bootstrap".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn member(name: &str, action: CurrentAction) -> ManagedInstance {
    ManagedInstance::new(
        format!("projects/acme/zones/us-central1-a/instances/{name}"),
        action,
    )
}

#[tokio::test]
async fn full_rollout_replaces_every_instance() {
    let mock = Arc::new(MockCompute::new());
    mock.add_image("2023-12-web");
    mock.add_image("2024-01-web");
    mock.add_template(base_template());

    // The control plane reports the old template once before the repoint
    // propagates.
    mock.script_get_group(Ok(InstanceGroup {
        name: "web-group".to_string(),
        instance_template: "projects/acme/global/instanceTemplates/old-template".to_string(),
        target_size: 3,
    }));
    mock.set_group(InstanceGroup {
        name: "web-group".to_string(),
        instance_template: "projects/acme/global/instanceTemplates/2024-01-web-template"
            .to_string(),
        target_size: 3,
    });

    // Snapshot: three idle members. Later convergence polls repeat this
    // idle list, so each replacement converges on its first poll.
    mock.script_instances(Ok(vec![
        member("web-group-x1", CurrentAction::None),
        member("web-group-x2", CurrentAction::None),
        member("web-group-x3", CurrentAction::None),
    ]));

    let sleeper = Arc::new(InstantSleeper::new());
    let mut driver = RolloutDriver::new(mock.clone()).with_sleeper(sleeper.clone());

    let request = RolloutRequest {
        project: "acme".to_string(),
        image_id: "2024-01".to_string(),
        zone: "us-central1-a".to_string(),
        instance_group: "web-group".to_string(),
        base_template: "base-template".to_string(),
    };
    driver.run(&request).await.unwrap();
    assert_eq!(driver.phase(), &RolloutPhase::Done);

    // Template derived from the image and cloned from base-template,
    // boot disk repointed at the resolved image.
    let inserted = mock.inserted_templates();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].name, "2024-01-web-template");
    assert_eq!(
        inserted[0].properties.disks[0]
            .initialize_params
            .as_ref()
            .unwrap()
            .source_image
            .as_deref(),
        Some("projects/acme/global/images/2024-01-web")
    );

    // Group repointed exactly once and confirmed after one stale read.
    assert_eq!(
        mock.set_template_links(),
        vec!["projects/acme/global/instanceTemplates/2024-01-web-template".to_string()]
    );
    assert_eq!(mock.calls().get_group, 2);

    // Each instance recreated individually, in listing order.
    assert_eq!(
        mock.recreated(),
        vec![
            vec!["projects/acme/zones/us-central1-a/instances/web-group-x1".to_string()],
            vec!["projects/acme/zones/us-central1-a/instances/web-group-x2".to_string()],
            vec!["projects/acme/zones/us-central1-a/instances/web-group-x3".to_string()],
        ]
    );

    // One snapshot listing plus one convergence poll per replacement.
    assert_eq!(mock.calls().list_instances, 4);

    // One confirmation-poll delay, then a cool-down after each
    // replacement.
    let slept = sleeper.slept();
    assert_eq!(
        slept.iter().filter(|d| **d == Duration::from_secs(1)).count(),
        1
    );
    assert_eq!(
        slept.iter().filter(|d| **d == Duration::from_secs(15)).count(),
        3
    );
}
