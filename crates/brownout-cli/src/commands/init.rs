use std::path::Path;

use brownout_core::BrownoutConfig;
use tracing::info;

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = BrownoutConfig::scaffold();
    std::fs::write(path, config.to_toml_string()?)?;
    info!(path = %path.display(), overwritten = force, "scaffold written");
    println!("✓ Generated {}", path.display());
    Ok(())
}
