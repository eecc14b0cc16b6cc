use std::path::Path;

use anyhow::Context;
use fleet_core::Phase;
use fleet_rollout::{check_phases, phase_device_count, remainder_percent};
use tracing::debug;

/// Check a phase list and print the device split it produces.
pub fn validate(path: &Path, devices: u64) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let phases: Vec<Phase> =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(phases = phases.len(), devices, "validating phases");

    let remainder = remainder_percent(&phases);
    let last = phases.len().saturating_sub(1);
    for (index, phase) in phases.iter().enumerate() {
        let count = phase_device_count(devices, phase.batch_size, remainder, index == last);
        let batch = phase.batch_size.map_or(remainder, i64::from);
        println!("  phase {}: {batch}% -> {count} devices", index + 1);
    }

    match check_phases(&phases, devices) {
        Ok(()) => {
            println!("✓ {} phases valid for {devices} devices", phases.len());
            Ok(())
        }
        Err(err) => {
            eprintln!("✗ {err}");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_phases() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/phases.json");
        assert!(validate(&path, 100).is_ok());
        // 10% of 5 devices rounds down to nothing.
        assert!(validate(&path, 5).is_err());
    }
}
