//! The compute capability the rollout engine consumes.
//!
//! One trait, one method per control-plane operation the engine needs.
//! Production code holds it as `Arc<dyn ComputeClient>` so the engine can
//! be driven against the REST client or a scripted test double.

use async_trait::async_trait;

use crate::error::ComputeResult;
use crate::types::{Image, InstanceGroup, InstanceTemplate, ManagedInstance};

/// Capability interface over the provider's compute control plane.
#[async_trait]
pub trait ComputeClient: Send + Sync {
    /// All machine images visible to the project, in provider listing
    /// order.
    async fn list_images(&self, project: &str) -> ComputeResult<Vec<Image>>;

    /// Look up a project-global template by name. `NotFound` when absent.
    async fn get_instance_template(
        &self,
        project: &str,
        name: &str,
    ) -> ComputeResult<InstanceTemplate>;

    /// All project-global templates, in provider listing order.
    async fn list_instance_templates(&self, project: &str)
    -> ComputeResult<Vec<InstanceTemplate>>;

    /// Create a new project-global template from the given definition.
    async fn insert_instance_template(
        &self,
        project: &str,
        template: &InstanceTemplate,
    ) -> ComputeResult<()>;

    /// Point a managed group at a template (full resource link). The
    /// control plane applies this asynchronously; read back to confirm.
    async fn set_instance_template(
        &self,
        project: &str,
        zone: &str,
        group: &str,
        template_link: &str,
    ) -> ComputeResult<()>;

    /// Current state of a managed instance group.
    async fn get_instance_group(
        &self,
        project: &str,
        zone: &str,
        group: &str,
    ) -> ComputeResult<InstanceGroup>;

    /// Live membership of a managed group with per-instance action status.
    async fn list_managed_instances(
        &self,
        project: &str,
        zone: &str,
        group: &str,
    ) -> ComputeResult<Vec<ManagedInstance>>;

    /// Destroy and recreate the named instances in place, from the
    /// group's current template.
    async fn recreate_instances(
        &self,
        project: &str,
        zone: &str,
        group: &str,
        instances: &[String],
    ) -> ComputeResult<()>;

    /// Change the group's target size.
    async fn resize_group(
        &self,
        project: &str,
        zone: &str,
        group: &str,
        size: u64,
    ) -> ComputeResult<()>;
}
