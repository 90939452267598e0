//! Optional configuration file (component A4).
//!
//! `drape.toml` (path overridable with `--config`) may set defaults that
//! feed the CLI's own `--parallel`/`--verbose` flags. Its absence is not an
//! error; [`Config::load`] falls back to built-in defaults in that case.

use std::path::Path;

use serde::Deserialize;

use crate::error::DrapeResult;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parallel: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel: true,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads `path` if it exists; returns built-in defaults otherwise.
    pub fn load(path: &Path) -> DrapeResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)
            .map_err(|e| crate::error::DrapeError::Document(e.to_string()))?;
        Ok(config)
    }
}
