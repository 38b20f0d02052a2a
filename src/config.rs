//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Optional settings file (TOML)
//! 3. Environment variables: `TWINTREE_*` prefix

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::domain::TreeError;

/// Unified configuration for a twin tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Walk both roots on separate rayon workers during search and filter
    pub parallel: bool,
    /// Include hidden nodes when rendering an axis as text
    pub show_hidden: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            parallel: true,
            show_hidden: false,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then `path` if given, then `TWINTREE_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self, TreeError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("parallel", defaults.parallel)
            .map_err(config_err)?
            .set_default("show_hidden", defaults.show_hidden)
            .map_err(config_err)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("TWINTREE").try_parsing(true));

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, TreeError> {
        toml::to_string_pretty(self).map_err(|e| TreeError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# twintree configuration
#
# Precedence (lowest to highest):
#   compiled defaults, this file, TWINTREE_* environment variables

# Walk the row and column roots on separate workers in search/filter
# parallel = true

# Render hidden nodes in axis dumps
# show_hidden = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> TreeError {
    TreeError::Config {
        message: e.to_string(),
    }
}
