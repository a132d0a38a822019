//! Loads [`EngineConfig`] from an optional TOML file, the way
//! `coldvox-app` loads `config.toml` via `toml` + `serde`, falling back to
//! [`EngineConfig::default`] when no path is given or the file is absent.

use std::path::Path;

use readalong_foundation::config::EngineConfig;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    if !path.exists() {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(EngineConfig::default());
    }
    let raw = std::fs::read_to_string(path)?;
    let config: EngineConfig = toml::from_str(&raw)?;
    Ok(config)
}
