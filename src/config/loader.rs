use std::path::Path;

use anyhow::{Context, Result};

use super::types::Config;

/// File name looked up in the pipeline directory.
pub const CONFIG_FILE: &str = ".nflint.yml";

/// Load settings from `.nflint.yml` in `dir`, falling back to defaults when
/// the file does not exist.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(config)
}
