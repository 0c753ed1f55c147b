//! Read-only tileset registry

use crate::descriptor::TilesetDescriptor;
use crate::validate;
use crate::wang::{WangId, WangSetDef};
use crate::TilesetError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;
use wangtile_animation::AnimationSpec;

/// Tile id, unique within its tileset
pub type TileId = u32;

/// Pixel rectangle inside an atlas image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a tile's pixels come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileImage {
    /// A region of the tileset's atlas image
    Atlas { source: String, rect: TileRect },
    /// A standalone image (image-collection tilesets)
    Standalone {
        source: String,
        width: u32,
        height: u32,
    },
}

impl TileImage {
    /// Path of the image file, relative to the tileset
    pub fn source(&self) -> &str {
        match self {
            TileImage::Atlas { source, .. } | TileImage::Standalone { source, .. } => source,
        }
    }

    /// Pixel size of the drawn tile
    pub fn size(&self) -> (u32, u32) {
        match self {
            TileImage::Atlas { rect, .. } => (rect.width, rect.height),
            TileImage::Standalone { width, height, .. } => (*width, *height),
        }
    }
}

/// A single tile, immutable after load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub id: TileId,
    pub image: Option<TileImage>,
    /// Declared selection probability, if any
    pub probability: Option<f64>,
    pub animation: Option<AnimationSpec>,
    pub width: u32,
    pub height: u32,
}

impl TileRecord {
    /// Selection weight; tiles without a declared probability weigh 1.0
    pub fn weight(&self) -> f64 {
        self.probability.unwrap_or(1.0)
    }

    pub fn is_animated(&self) -> bool {
        self.animation.is_some()
    }
}

/// All tiles and wang sets of one tileset
///
/// Built once by [`load`](Self::load) and never mutated afterwards, so shared
/// references can be read from any number of threads. Reloading builds a new
/// registry with a new [`id`](Self::id).
#[derive(Debug, Clone)]
pub struct TilesetRegistry {
    id: Uuid,
    name: String,
    tile_width: u32,
    tile_height: u32,
    tiles: BTreeMap<TileId, TileRecord>,
    wang_sets: Vec<WangSetDef>,
}

impl TilesetRegistry {
    /// Validate a descriptor and build the registry
    ///
    /// Fails with [`TilesetError::MalformedAsset`] on duplicate tile ids,
    /// animation frames naming unknown tiles, wang signatures naming undeclared
    /// colors, and the other structural checks in the validation module.
    pub fn load(descriptor: &TilesetDescriptor) -> Result<Self, TilesetError> {
        let tiles = validate::collect_tiles(descriptor)?;
        let wang_sets = validate::collect_wang_sets(descriptor, &tiles)?;

        let registry = Self {
            id: Uuid::new_v4(),
            name: descriptor.name.clone(),
            tile_width: descriptor.tile_width,
            tile_height: descriptor.tile_height,
            tiles,
            wang_sets,
        };

        log::debug!(
            "loaded tileset '{}': {} tiles, {} animated, {} wang sets",
            registry.name,
            registry.tiles.len(),
            registry.animated_tiles().count(),
            registry.wang_sets.len()
        );

        Ok(registry)
    }

    /// Parse and load a JSON descriptor
    pub fn from_json_str(json: &str) -> Result<Self, TilesetError> {
        Self::load(&TilesetDescriptor::from_json_str(json)?)
    }

    /// Read, parse and load a JSON descriptor file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TilesetError> {
        Self::load(&TilesetDescriptor::from_path(path)?)
    }

    /// Identity of this particular load
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nominal tile size in pixels
    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    /// Get a tile by id
    pub fn lookup(&self, tile_id: TileId) -> Result<&TileRecord, TilesetError> {
        self.tiles
            .get(&tile_id)
            .ok_or_else(|| TilesetError::UnknownTile {
                tileset: self.name.clone(),
                tile_id,
            })
    }

    pub fn get(&self, tile_id: TileId) -> Option<&TileRecord> {
        self.tiles.get(&tile_id)
    }

    pub fn contains(&self, tile_id: TileId) -> bool {
        self.tiles.contains_key(&tile_id)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// All tiles in ascending id order
    pub fn tiles(&self) -> impl Iterator<Item = &TileRecord> {
        self.tiles.values()
    }

    /// Tiles carrying an animation, with that animation
    pub fn animated_tiles(&self) -> impl Iterator<Item = (TileId, &AnimationSpec)> {
        self.tiles
            .values()
            .filter_map(|tile| tile.animation.as_ref().map(|anim| (tile.id, anim)))
    }

    pub fn wang_sets(&self) -> &[WangSetDef] {
        &self.wang_sets
    }

    /// Get a wang set by name
    pub fn wang_set(&self, name: &str) -> Option<&WangSetDef> {
        self.wang_sets.iter().find(|set| set.name == name)
    }

    /// Tile records of a wang set with their signatures, ascending by id
    pub fn wang_tiles(&self, name: &str) -> Option<impl Iterator<Item = (&TileRecord, WangId)>> {
        let set = self.wang_set(name)?;
        Some(set.tiles().iter().filter_map(move |wang_tile| {
            self.tiles
                .get(&wang_tile.tile_id)
                .map(|record| (record, wang_tile.wang_id))
        }))
    }
}
