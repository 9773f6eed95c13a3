use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::CONFIG_DIR_NAME;
use crate::errors::CliError;

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct XorConfig {
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Escape-encoded key, decoded the same way as `--key`.
    pub key: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub hex: bool,
    pub chunk_size: Option<usize>,
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn read_config(path: &Path) -> anyhow::Result<XorConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CliError::invalid_input(format!("Failed to read config {}: {}", path.display(), e))
    })?;
    let config: XorConfig = toml::from_str(&contents).map_err(|e| {
        CliError::invalid_input(format!("Failed to parse config {}: {}", path.display(), e))
    })?;
    if config.output.chunk_size == Some(0) {
        return Err(CliError::invalid_input(format!(
            "Invalid config {}: chunk_size must be greater than zero",
            path.display()
        ))
        .into());
    }
    Ok(config)
}

/// Load the config from `explicit`, or from the default location.
///
/// An explicit path must exist. A missing default config yields
/// `XorConfig::default()`.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<XorConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = match default_config_path() {
        Ok(path) => path,
        Err(e) => {
            debug!("no default config location: {}", e);
            return Ok(XorConfig::default());
        }
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(XorConfig::default());
    }
    debug!(path = %path.display(), "loading config");
    read_config(&path)
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(CONFIG_DIR_NAME));
        }
    }
    Ok(home_dir()?.join(".config").join(CONFIG_DIR_NAME))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
