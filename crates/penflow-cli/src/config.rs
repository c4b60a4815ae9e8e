//! Engine configuration loading
//!
//! An explicit `--config` path must exist. Without one, the per-user file
//! under the platform config directory is used when present, and the
//! built-in defaults otherwise.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use penflow_engine::EngineConfig;

const APP_DIR: &str = "penflow";
const CONFIG_FILE: &str = "config.json";

/// `<config dir>/penflow/config.json`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

pub fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            log::debug!("Using config from {:?}", path);
            read_config(&path)
        }
        _ => Ok(EngineConfig::default()),
    }
}

fn read_config(path: &Path) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    EngineConfig::from_json(&text)
        .with_context(|| format!("Invalid config {}", path.display()))
}
