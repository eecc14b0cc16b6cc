pub mod config;
pub mod progress;
pub mod schedule;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use fleet_core::config::OutputFormat;
use fleet_core::{Deployment, FleetConfig};

/// Read a deployment snapshot from a JSON file.
pub(crate) fn load_deployment(path: &Path) -> anyhow::Result<Deployment> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// `--now` if given, otherwise the wall clock.
pub(crate) fn resolve_now(now: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match now {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --now timestamp: {raw}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

/// `--format` wins over `[output].format`.
pub(crate) fn resolve_format(config: &FleetConfig, format: Option<&str>) -> anyhow::Result<OutputFormat> {
    match format {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(config.output.format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_parses_offsets_to_utc() {
        let now = resolve_now(Some("2026-03-01T10:00:00+02:00")).unwrap();
        assert_eq!(now.to_rfc3339(), "2026-03-01T08:00:00+00:00");
        assert!(resolve_now(Some("yesterday")).is_err());
    }

    #[test]
    fn format_flag_overrides_config() {
        let config = FleetConfig::default();
        assert_eq!(resolve_format(&config, None).unwrap(), OutputFormat::Text);
        assert_eq!(resolve_format(&config, Some("json")).unwrap(), OutputFormat::Json);
        assert!(resolve_format(&config, Some("yaml")).is_err());
    }

    #[test]
    fn load_deployment_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment.json");
        std::fs::write(&path, r#"{ "id": "d1", "created": "2026-03-01T08:00:00Z" }"#).unwrap();
        assert_eq!(load_deployment(&path).unwrap().id, "d1");

        std::fs::write(&path, "{").unwrap();
        let err = load_deployment(&path).unwrap_err();
        assert!(err.to_string().contains("deployment.json"));
    }

    #[test]
    fn bundled_fixtures_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        assert_eq!(load_deployment(&dir.join("rollout.json")).unwrap().phases.len(), 3);
        assert!(load_deployment(&dir.join("paused.json")).unwrap().update_control_map.is_some());
    }
}
