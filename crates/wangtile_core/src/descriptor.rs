//! Serde model of a parsed tileset
//!
//! Field names follow the JSON flavour of the tile-map interchange format, so a
//! `.tsj` export deserializes directly. Nothing here is validated; see
//! [`TilesetRegistry::load`](crate::TilesetRegistry::load).

use crate::wang::WangSetKind;
use crate::TilesetError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A whole tileset as the format parser hands it over
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TilesetDescriptor {
    pub name: String,
    #[serde(rename = "tilewidth")]
    pub tile_width: u32,
    #[serde(rename = "tileheight")]
    pub tile_height: u32,
    /// Number of tiles; for atlas tilesets every id below this exists
    #[serde(rename = "tilecount", default)]
    pub tile_count: u32,
    /// Atlas columns (0 for image-collection tilesets)
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
    /// Atlas image; absent for image-collection tilesets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "imagewidth", default)]
    pub image_width: u32,
    #[serde(rename = "imageheight", default)]
    pub image_height: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TileDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wangsets: Vec<WangSetDescriptor>,
}

impl TilesetDescriptor {
    /// Parse a descriptor from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, TilesetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a descriptor from JSON bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, TilesetError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Read and parse a descriptor file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TilesetError> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Whether tiles are cut from a single atlas image
    pub fn is_atlas(&self) -> bool {
        self.image.is_some()
    }
}

/// Optional per-tile data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileDescriptor {
    pub id: u32,
    /// Relative selection weight; 1.0 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    /// Per-tile image (image-collection tilesets)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "imagewidth", default, skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,
    #[serde(rename = "imageheight", default, skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub animation: Vec<FrameDescriptor>,
}

impl TileDescriptor {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

/// One animation frame: tile to show and duration in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    #[serde(rename = "tileid")]
    pub tile_id: u32,
    pub duration: u32,
}

/// A wang set as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WangSetDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WangSetKind,
    #[serde(default)]
    pub colors: Vec<WangColorDescriptor>,
    #[serde(default)]
    pub wangtiles: Vec<WangTileDescriptor>,
}

/// A declared terrain color; its 1-based position in the list is its id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WangColorDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Representative tile, -1 for none
    #[serde(default = "no_tile")]
    pub tile: i64,
    #[serde(default = "default_probability")]
    pub probability: f64,
}

fn no_tile() -> i64 {
    -1
}

fn default_probability() -> f64 {
    1.0
}

/// A tile's membership in a wang set
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WangTileDescriptor {
    #[serde(rename = "tileid")]
    pub tile_id: u32,
    #[serde(rename = "wangid")]
    pub wang_id: [u8; 8],
}
