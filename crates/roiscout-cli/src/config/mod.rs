//! Configuration discovery for the roiscout binary.
//!
//! Lookup order: `--config`, then `ROISCOUT_CONFIG`, then `roiscout.toml`
//! in the working directory, then `roiscout/roiscout.toml` under the
//! platform config dir. With none of those present the built-in defaults
//! apply.

use std::path::{Path, PathBuf};

use anyhow::Context;
use roiscout_common::RoiConfig;

pub const CONFIG_ENV: &str = "ROISCOUT_CONFIG";
pub const CONFIG_FILE: &str = "roiscout.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by flag or environment; must exist
    Explicit(PathBuf),
    /// Found in a default location
    Discovered(PathBuf),
    Defaults,
}

pub fn resolve(
    flag: Option<&Path>,
    env: Option<String>,
    cwd: &Path,
    config_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(path) = flag {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return ConfigSource::Explicit(PathBuf::from(path));
    }
    let local = cwd.join(CONFIG_FILE);
    if local.exists() {
        return ConfigSource::Discovered(local);
    }
    match config_dir.map(|d| d.join("roiscout").join(CONFIG_FILE)) {
        Some(global) if global.exists() => ConfigSource::Discovered(global),
        _ => ConfigSource::Defaults,
    }
}

pub fn load_from(source: &ConfigSource) -> anyhow::Result<RoiConfig> {
    let path = match source {
        ConfigSource::Explicit(p) | ConfigSource::Discovered(p) => p,
        ConfigSource::Defaults => return Ok(RoiConfig::default()),
    };
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = RoiConfig::from_toml_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

/// Resolve from the process environment and load.
pub fn load(flag: Option<&Path>) -> anyhow::Result<(RoiConfig, ConfigSource)> {
    let cwd = std::env::current_dir().context("reading working directory")?;
    let source = resolve(flag, std::env::var(CONFIG_ENV).ok(), &cwd, dirs::config_dir());
    let config = load_from(&source)?;
    Ok((config, source))
}
