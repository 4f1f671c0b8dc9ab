//! Template provisioning — ensure a launch template that boots an image.

use tracing::{info, warn};

use fleetroll_compute::{ComputeClient, Image, InstanceTemplate};

use crate::error::{RolloutError, RolloutResult};

/// Name of the launch template derived for `image`. Pure function of
/// the image name.
pub fn derived_template_name(image: &Image) -> String {
    format!("{}-template", image.name)
}

/// Fully-qualified source-image reference for a project-local image.
fn source_image_link(project: &str, image: &Image) -> String {
    format!("projects/{project}/global/images/{}", image.name)
}

/// Return a launch template that boots `image`, creating one by cloning
/// `clone_from` if the derived template does not exist yet.
///
/// The fast path trusts an existing template by name alone; its
/// source-image field is not re-checked. On the clone path the returned
/// template is the locally rewritten definition, not a re-fetch of the
/// server's canonical object. If the create call fails no template
/// exists and the caller fails the rollout; there is nothing to roll
/// back.
pub async fn ensure_template(
    client: &dyn ComputeClient,
    project: &str,
    image: &Image,
    clone_from: &str,
) -> RolloutResult<InstanceTemplate> {
    let desired = derived_template_name(image);

    if let Ok(existing) = client.get_instance_template(project, &desired).await {
        info!(template = %existing.name, "reusing existing template");
        return Ok(existing);
    }

    let templates = client.list_instance_templates(project).await?;
    let mut template = templates
        .into_iter()
        .find(|t| t.name == clone_from)
        .ok_or_else(|| RolloutError::MissingReferenceTemplate(clone_from.to_string()))?;

    template.name = desired;
    match template.properties.disks.first_mut() {
        Some(disk) => {
            disk.initialize_params
                .get_or_insert_with(Default::default)
                .source_image = Some(source_image_link(project, image));
        }
        None => {
            warn!(template = %template.name, "reference template has no disks; source image not set");
        }
    }

    client.insert_instance_template(project, &template).await?;
    info!(template = %template.name, cloned_from = clone_from, "created instance template");

    Ok(template)
}
