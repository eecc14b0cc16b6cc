use std::path::Path;

use fleet_core::FleetConfig;
use fleet_core::config::OutputFormat;
use fleet_rollout::schedule_report;
use tracing::info;

use super::{load_deployment, resolve_format, resolve_now};
use crate::render;

pub fn schedule(
    config: &FleetConfig,
    path: &Path,
    now: Option<&str>,
    format: Option<&str>,
) -> anyhow::Result<()> {
    let deployment = load_deployment(path)?;
    let now = resolve_now(now)?;
    let format = resolve_format(config, format)?;

    let report = schedule_report(&deployment, now);
    info!(deployment = %deployment.id, phases = report.phases.len(), "built schedule");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render::schedule(&deployment.id, &report)),
    }

    Ok(())
}
