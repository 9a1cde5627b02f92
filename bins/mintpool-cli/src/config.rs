//! Layered configuration for the CLI.
//!
//! Sources, lowest precedence first:
//! 1. canonical defaults
//! 2. a TOML file (`--config`, else `<config_dir>/mintpool/config.toml` if it exists)
//! 3. `MINTPOOL__*` environment variables, `__` separating nested keys
//!    (`MINTPOOL__CURVE__PRICE_GROWTH=1.0003`)
//!
//! Explicit command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use mintpool_core::params::ModelParams;
use serde::Deserialize;

const ENV_PREFIX: &str = "MINTPOOL";

/// Everything the CLI reads from file and environment.
///
/// Model keys sit at the top level exactly as [`ModelParams`] names them,
/// with the curve under `[curve]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub params: ModelParams,
    /// Log level filter string (e.g. "info", "mintpool_analysis=debug").
    pub log_level: String,
    /// "text" or "json".
    pub log_format: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            params: ModelParams::default(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl CliConfig {
    /// Load from the default or given file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
    }

    /// Load with an explicit environment source.
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                builder = builder.add_source(File::from(p).required(true));
            }
            None => {
                if let Some(p) = default_config_path() {
                    builder = builder.add_source(File::from(p).required(false));
                }
            }
        }
        builder
            .add_source(env)
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }
}

/// `<config_dir>/mintpool/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mintpool").join("config.toml"))
}
