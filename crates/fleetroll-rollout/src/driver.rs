//! Rollout driver — the top-level state machine.
//!
//! Owns the order of operations for one run: resolve the image, ensure a
//! launch template, repoint the group, snapshot the membership, then
//! replace each instance in turn with a full-group convergence wait and
//! a cool-down between replacements. A safety guard refuses to serially
//! replace the only instance of anything that looks like production.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use fleetroll_compute::{ComputeClient, Image, InstanceGroup};

use crate::clock::{Sleeper, TokioSleeper};
use crate::config::RolloutConfig;
use crate::converge::wait_for_group_idle;
use crate::error::{RolloutError, RolloutResult};
use crate::image::resolve_image;
use crate::repoint::repoint_group;
use crate::template::ensure_template;

/// Operator-supplied parameters for one rollout run. Validated once at
/// the start; immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloutRequest {
    pub project: String,
    /// Substring identifying the image to deploy.
    pub image_id: String,
    pub zone: String,
    pub instance_group: String,
    /// Existing template to clone when the derived one is missing.
    pub base_template: String,
}

impl RolloutRequest {
    fn validate(&self) -> RolloutResult<()> {
        let fields = [
            ("project", &self.project),
            ("image-id", &self.image_id),
            ("zone", &self.zone),
            ("instance-group", &self.instance_group),
            ("instance-template", &self.base_template),
        ];
        for (name, value) in fields {
            if value.is_empty() {
                return Err(RolloutError::InvalidRequest(format!(
                    "{name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Where a rollout run currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RolloutPhase {
    /// Run not started or still validating.
    Init,
    /// Image picked for the identifier.
    ImageResolved,
    /// Launch template exists for the image.
    TemplateReady,
    /// Group confirmed on the new template.
    GroupRepointed,
    /// Replacing instance `current` of `total` (1-based).
    RollingOut { current: u32, total: u32 },
    /// Every snapshot instance replaced.
    Done,
    /// Aborted; the fleet stays in its last reached state.
    Failed { reason: String },
}

/// Drives one rollout run against an injected compute client.
///
/// The client capability is passed at construction (no ambient globals)
/// and the sleeper/config are overridable so tests run the full state
/// machine without real timers.
pub struct RolloutDriver {
    client: Arc<dyn ComputeClient>,
    sleeper: Arc<dyn Sleeper>,
    config: RolloutConfig,
    phase: RolloutPhase,
}

impl RolloutDriver {
    pub fn new(client: Arc<dyn ComputeClient>) -> Self {
        Self {
            client,
            sleeper: Arc::new(TokioSleeper),
            config: RolloutConfig::default(),
            phase: RolloutPhase::Init,
        }
    }

    /// Replace the timing contract.
    pub fn with_config(mut self, config: RolloutConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the suspend-point implementation.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn phase(&self) -> &RolloutPhase {
        &self.phase
    }

    /// Run the rollout to completion.
    ///
    /// Any error aborts at the current state and propagates; nothing is
    /// rolled back and already-recreated instances stay recreated.
    pub async fn run(&mut self, request: &RolloutRequest) -> RolloutResult<()> {
        match self.try_run(request).await {
            Ok(()) => {
                self.phase = RolloutPhase::Done;
                info!(group = %request.instance_group, "rollout complete");
                Ok(())
            }
            Err(err) => {
                self.phase = RolloutPhase::Failed {
                    reason: err.to_string(),
                };
                Err(err)
            }
        }
    }

    async fn try_run(&mut self, request: &RolloutRequest) -> RolloutResult<()> {
        self.phase = RolloutPhase::Init;
        request.validate()?;

        let client = self.client.as_ref();
        let sleeper = self.sleeper.as_ref();
        let (project, zone, group_name) = (
            request.project.as_str(),
            request.zone.as_str(),
            request.instance_group.as_str(),
        );

        let image = resolve_image(client, project, &request.image_id).await?;
        self.phase = RolloutPhase::ImageResolved;

        let template = ensure_template(client, project, &image, &request.base_template).await?;
        self.phase = RolloutPhase::TemplateReady;

        let group = repoint_group(
            client,
            sleeper,
            &self.config,
            project,
            zone,
            group_name,
            &template,
        )
        .await?;
        self.phase = RolloutPhase::GroupRepointed;

        // Fixed work-set: instances joining the group after this point
        // are not visited.
        let snapshot = client
            .list_managed_instances(project, zone, group_name)
            .await?;

        guard_production(&group, &image)?;

        let total = snapshot.len() as u32;
        for (index, member) in snapshot.iter().enumerate() {
            self.phase = RolloutPhase::RollingOut {
                current: index as u32 + 1,
                total,
            };
            info!(
                instance = member.short_name(),
                current = index + 1,
                total,
                "replacing instance"
            );

            client
                .recreate_instances(
                    project,
                    zone,
                    group_name,
                    std::slice::from_ref(&member.instance),
                )
                .await?;

            wait_for_group_idle(
                client,
                sleeper,
                self.config.converge_interval,
                project,
                zone,
                group_name,
            )
            .await?;

            info!(instance = member.short_name(), "cooling down");
            sleeper.sleep(self.config.cooldown).await;
        }

        Ok(())
    }
}

/// Refuse to serially replace the only instance of something that looks
/// like production. Evaluated once, after repointing and before any
/// recreate call.
fn guard_production(group: &InstanceGroup, image: &Image) -> RolloutResult<()> {
    if group.target_size != 1 {
        return Ok(());
    }

    warn!(
        group = %group.name,
        "only one instance in group; replacement will interrupt service"
    );

    if group.name.contains("prod") || image.name.contains("prod") {
        return Err(RolloutError::ProductionGuard(format!(
            "group {:?} is a single-instance production deployment",
            group.name
        )));
    }

    Ok(())
}
