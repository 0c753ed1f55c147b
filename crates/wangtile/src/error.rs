use thiserror::Error;
use wangtile_autotile::AutotileError;
use wangtile_core::TilesetError;

/// Errors raised while reading or checking an [`EngineConfig`](crate::EngineConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Any failure surfaced by the engine or a terrain layer
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Tileset(#[from] TilesetError),
    #[error(transparent)]
    Autotile(#[from] AutotileError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("position ({x}, {y}) is outside the terrain layer")]
    OutOfBounds { x: u32, y: u32 },
}
