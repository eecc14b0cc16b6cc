use std::path::Path;

use anyhow::bail;
use fleet_core::FleetConfig;
use tracing::info;

/// Print a fleet.toml with every default spelled out, or
/// write it to `path`.
pub fn init(path: Option<&Path>) -> anyhow::Result<()> {
    let toml = FleetConfig::scaffold().to_toml_string()?;
    match path {
        None => print!("{toml}"),
        Some(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            std::fs::write(path, toml)?;
            info!(path = %path.display(), "wrote config");
            println!("✓ Wrote {}", path.display());
        }
    }
    Ok(())
}
