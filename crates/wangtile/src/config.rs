//! Engine configuration
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [animation]
//! phase = "per_instance"
//!
//! [selection]
//! seed = 42
//!
//! [autotile]
//! fallback_tile = 14
//! require_full_coverage = false
//!
//! [logging]
//! filter = "wangtile=debug,info"
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wangtile_animation::PhaseMode;
use wangtile_core::{TileId, TilesetRegistry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub animation: AnimationConfig,
    pub selection: SelectionConfig,
    pub autotile: AutotileConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub phase: PhaseMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Base seed mixed with each cell position for variant selection
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutotileConfig {
    /// Tile drawn for cells whose corners no tile matches
    ///
    /// When unset, such cells fail with `NoAutotileMatch`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_tile: Option<TileId>,
    /// Refuse to load corner sets with missing color combinations
    pub require_full_coverage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `env_logger` filter directives; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check the config against the tileset it will be used with
    pub fn validate(&self, registry: &TilesetRegistry) -> Result<(), ConfigError> {
        if let Some(tile_id) = self.autotile.fallback_tile {
            if !registry.contains(tile_id) {
                return Err(ConfigError::Invalid(format!(
                    "fallback tile {} does not exist in tileset '{}'",
                    tile_id,
                    registry.name()
                )));
            }
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging filter must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
