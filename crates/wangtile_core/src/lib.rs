//! Core tileset data for wangtile
//!
//! This crate turns a parsed tileset descriptor into an immutable registry:
//! - `TilesetDescriptor` - serde model of the JSON tileset interchange format
//! - `TilesetRegistry` - validated, read-only tile records and wang sets
//! - `TileRecord` - one tile: image reference, probability, optional animation
//! - `WangSetDef` / `WangId` - terrain sets and their 8-slot tile signatures
//!
//! # Example
//!
//! ```rust,ignore
//! use wangtile_core::TilesetRegistry;
//!
//! let registry = TilesetRegistry::from_path("assets/map/FieldsTileset.tsj")?;
//! let grass = registry.lookup(14)?;
//! assert_eq!(grass.weight(), 1.0);
//! ```

mod descriptor;
mod tileset;
mod validate;
mod wang;

pub use descriptor::{
    FrameDescriptor, TileDescriptor, TilesetDescriptor, WangColorDescriptor, WangSetDescriptor,
    WangTileDescriptor,
};
pub use tileset::{TileId, TileImage, TileRect, TileRecord, TilesetRegistry};
pub use wang::{WangColor, WangId, WangSetDef, WangSetKind, WangTile};

// Re-export the animation types a tile record carries
pub use wangtile_animation::{AnimationSpec, Frame};

use thiserror::Error;

/// Errors that can occur when loading or querying a tileset
#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("malformed tileset '{tileset}': {reason}")]
    MalformedAsset { tileset: String, reason: String },
    #[error("tileset '{tileset}' has no tile {tile_id}")]
    UnknownTile { tileset: String, tile_id: TileId },
    #[error("failed to read tileset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tileset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl TilesetError {
    pub(crate) fn malformed(tileset: &str, reason: impl Into<String>) -> Self {
        TilesetError::MalformedAsset {
            tileset: tileset.to_string(),
            reason: reason.into(),
        }
    }
}
