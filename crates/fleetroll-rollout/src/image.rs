//! Image resolution — pick the deployable image for an identifier.

use tracing::info;

use fleetroll_compute::{ComputeClient, Image};

use crate::error::{RolloutError, RolloutResult};

/// Find the image to deploy for a partial identifier.
///
/// Scans every image visible to the project and keeps the last one whose
/// name contains `identifier` as a substring. Listing order is
/// provider-defined, so an identifier matching several images should be
/// made more specific.
pub async fn resolve_image(
    client: &dyn ComputeClient,
    project: &str,
    identifier: &str,
) -> RolloutResult<Image> {
    let images = client.list_images(project).await?;

    let mut found = None;
    for image in images {
        if image.name.contains(identifier) {
            found = Some(image);
        }
    }

    match found {
        Some(image) => {
            info!(image = %image.name, identifier, "resolved image");
            Ok(image)
        }
        None => Err(RolloutError::NoMatchingImage(identifier.to_string())),
    }
}
