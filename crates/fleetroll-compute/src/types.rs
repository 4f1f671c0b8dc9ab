//! Domain types for the compute-provider surface.
//!
//! These mirror the provider's wire format (camelCase JSON). The template
//! tree carries `#[serde(flatten)]` passthrough maps so that cloning a
//! template round-trips fields this system does not model: machine type,
//! network interfaces, metadata and the rest survive the rewrite.

use serde::{Deserialize, Serialize};

// ── Image ─────────────────────────────────────────────────────────

/// A deployable machine image. Read-only from the rollout's perspective.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub name: String,
}

impl Image {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ── Launch template ───────────────────────────────────────────────

/// A launch template: the boot definition a managed group stamps
/// instances from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTemplate {
    pub name: String,
    #[serde(default)]
    pub properties: TemplateProperties,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InstanceTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Instance properties within a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateProperties {
    #[serde(default)]
    pub disks: Vec<AttachedDisk>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A disk attached by a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initialize_params: Option<DiskInitializeParams>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parameters for a disk created alongside the instance. The boot disk's
/// `source_image` is what a rollout rewrites.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiskInitializeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Managed instance group ────────────────────────────────────────

/// A managed instance group, identified by (project, zone, name).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroup {
    pub name: String,
    /// Full resource link of the template the group currently stamps
    /// instances from.
    #[serde(default)]
    pub instance_template: String,
    #[serde(default)]
    pub target_size: u64,
}

/// One member of a managed instance group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedInstance {
    /// Fully-qualified instance locator. Preserved across recreation even
    /// though the machine behind it is replaced.
    pub instance: String,
    #[serde(default)]
    pub current_action: CurrentAction,
}

impl ManagedInstance {
    pub fn new(instance: impl Into<String>, current_action: CurrentAction) -> Self {
        Self {
            instance: instance.into(),
            current_action,
        }
    }

    /// Short name: the suffix after the last path separator.
    pub fn short_name(&self) -> &str {
        self.instance.rsplit('/').next().unwrap_or(&self.instance)
    }
}

/// Lifecycle action the group manager is currently performing on an
/// instance. `None` means the instance is quiescent; anything else,
/// including verbs this enum does not know, counts as in-flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrentAction {
    #[default]
    None,
    Abandoning,
    Creating,
    CreatingWithoutRetries,
    Deleting,
    Recreating,
    Refreshing,
    Restarting,
    Resuming,
    Starting,
    Stopping,
    Suspending,
    Verifying,
    #[serde(other)]
    Unknown,
}

impl CurrentAction {
    /// Whether the group manager has nothing in flight for the instance.
    pub fn is_idle(self) -> bool {
        self == CurrentAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_last_path_segment() {
        let mi = ManagedInstance::new(
            "projects/acme/zones/us-central1-a/instances/web-group-x1z2",
            CurrentAction::None,
        );
        assert_eq!(mi.short_name(), "web-group-x1z2");
    }

    #[test]
    fn short_name_without_separator_is_whole_locator() {
        let mi = ManagedInstance::new("bare-name", CurrentAction::None);
        assert_eq!(mi.short_name(), "bare-name");
    }

    #[test]
    fn current_action_none_is_idle() {
        assert!(CurrentAction::None.is_idle());
        assert!(!CurrentAction::Recreating.is_idle());
        assert!(!CurrentAction::Unknown.is_idle());
    }

    #[test]
    fn current_action_parses_wire_verbs() {
        let action: CurrentAction = serde_json::from_str("\"NONE\"").unwrap();
        assert_eq!(action, CurrentAction::None);
        let action: CurrentAction = serde_json::from_str("\"RECREATING\"").unwrap();
        assert_eq!(action, CurrentAction::Recreating);
        let action: CurrentAction = serde_json::from_str("\"CREATING_WITHOUT_RETRIES\"").unwrap();
        assert_eq!(action, CurrentAction::CreatingWithoutRetries);
    }

    #[test]
    fn unknown_action_verbs_count_as_busy() {
        let action: CurrentAction = serde_json::from_str("\"SOME_FUTURE_VERB\"").unwrap();
        assert_eq!(action, CurrentAction::Unknown);
        assert!(!action.is_idle());
    }

    #[test]
    fn template_roundtrip_preserves_unmodeled_fields() {
        let wire = serde_json::json!({
            "name": "base-template",
            "description": "golden image base",
            "properties": {
                "machineType": "e2-standard-4",
                "disks": [{
                    "boot": true,
                    "initializeParams": {
                        "sourceImage": "projects/acme/global/images/old",
                        "diskSizeGb": "50"
                    }
                }]
            }
        });

        let template: InstanceTemplate = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(template.name, "base-template");
        assert_eq!(
            template.properties.disks[0]
                .initialize_params
                .as_ref()
                .unwrap()
                .source_image
                .as_deref(),
            Some("projects/acme/global/images/old")
        );

        // Fields the engine does not model survive re-serialization.
        let back = serde_json::to_value(&template).unwrap();
        assert_eq!(back["description"], "golden image base");
        assert_eq!(back["properties"]["machineType"], "e2-standard-4");
        assert_eq!(back["properties"]["disks"][0]["boot"], true);
        assert_eq!(
            back["properties"]["disks"][0]["initializeParams"]["diskSizeGb"],
            "50"
        );
    }

    #[test]
    fn managed_instance_defaults_to_idle() {
        let mi: ManagedInstance = serde_json::from_str(
            "{\"instance\": \"projects/acme/zones/z/instances/web-1\"}",
        )
        .unwrap();
        assert!(mi.current_action.is_idle());
    }
}
