//! fleetroll — automate the rollout of a machine image to a managed
//! instance group.
//!
//! # Usage
//!
//! ```text
//! fleetroll --project acme --image-id 2024-01 --zone us-central1-a \
//!     --instance-group web-group --instance-template base-template
//! ```
//!
//! Credentials are ambient: `GCE_ACCESS_TOKEN` must hold a
//! compute-scope access token; `GCE_API_ENDPOINT` optionally points the
//! client at an emulator.

use std::sync::Arc;

use clap::{CommandFactory, Parser};
use tracing::error;

use fleetroll_compute::RestClient;
use fleetroll_rollout::{RolloutDriver, RolloutError, RolloutRequest};

#[derive(Parser)]
#[command(
    name = "fleetroll",
    about = "Automate the rollout of a machine image to a managed instance group",
    version,
)]
struct Cli {
    /// Cloud project to operate in
    #[arg(long)]
    project: Option<String>,

    /// Identifier (substring) of the image to deploy
    #[arg(long)]
    image_id: Option<String>,

    /// Zone holding the instance group
    #[arg(long)]
    zone: Option<String>,

    /// Managed instance group to roll the image onto
    #[arg(long)]
    instance_group: Option<String>,

    /// Existing instance template to clone
    #[arg(long)]
    instance_template: Option<String>,
}

/// Exit code for the production safety guard, distinct from ordinary
/// failures so wrappers can tell "refused" from "broke".
const GUARD_EXIT: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "info,fleetroll_rollout=debug,fleetroll_compute=debug"
                        .parse()
                        .unwrap()
                }),
        )
        .init();

    let cli = Cli::parse();

    // Any missing flag shows usage and exits clean.
    let (Some(project), Some(image_id), Some(zone), Some(instance_group), Some(instance_template)) = (
        cli.project,
        cli.image_id,
        cli.zone,
        cli.instance_group,
        cli.instance_template,
    ) else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let token = std::env::var("GCE_ACCESS_TOKEN").map_err(|_| {
        anyhow::anyhow!("GCE_ACCESS_TOKEN must hold a compute-scope access token")
    })?;

    let mut client = RestClient::new(token);
    if let Ok(endpoint) = std::env::var("GCE_API_ENDPOINT") {
        client = client.with_endpoint(endpoint);
    }

    let request = RolloutRequest {
        project,
        image_id,
        zone,
        instance_group,
        base_template: instance_template,
    };

    let mut driver = RolloutDriver::new(Arc::new(client));
    match driver.run(&request).await {
        Ok(()) => Ok(()),
        Err(err @ RolloutError::ProductionGuard(_)) => {
            error!(error = %err, "rollout refused");
            std::process::exit(GUARD_EXIT);
        }
        Err(err) => {
            error!(error = %err, "rollout failed");
            std::process::exit(1);
        }
    }
}
