use std::path::Path;

use fleet_core::FleetConfig;
use fleet_core::config::OutputFormat;
use fleet_rollout::DeploymentProgress;
use tracing::info;

use super::{load_deployment, resolve_format, resolve_now};
use crate::render;

pub fn progress(
    config: &FleetConfig,
    path: &Path,
    now: Option<&str>,
    format: Option<&str>,
) -> anyhow::Result<()> {
    let deployment = load_deployment(path)?;
    let now = resolve_now(now)?;
    let format = resolve_format(config, format)?;

    let progress = DeploymentProgress::compute(&deployment, now);
    info!(deployment = %deployment.id, %now, "computed progress");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&progress)?),
        OutputFormat::Text => match &progress {
            DeploymentProgress::Rollout(rollout) => print!("{}", render::rollout(&deployment.id, rollout)),
            DeploymentProgress::Substate(substate) => print!("{}", render::substate(&deployment.id, substate)),
        },
    }

    Ok(())
}
