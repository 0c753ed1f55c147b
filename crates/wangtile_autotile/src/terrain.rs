//! Terrain colors, corner signatures and wang sets
//!
//! A map cell is drawn from the terrain at its four corners. The same four
//! values describe both what a cell needs ([`CellTerrainContext`]) and what a
//! tile provides ([`CornerSignature`]).

use crate::wang::coverage_gaps;
use crate::AutotileError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use wangtile_core::{TileId, TilesetRegistry, WangId, WangSetDef, WangSetKind};

/// Terrain color id within a wang set
///
/// `0` means "no terrain"; `k` is the k-th declared color.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ColorId(pub u8);

impl ColorId {
    pub const NONE: ColorId = ColorId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Index into the declared color list, if this is a real color
    pub fn index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<u8> for ColorId {
    fn from(value: u8) -> Self {
        ColorId(value)
    }
}

/// A declared terrain color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainColor {
    pub id: ColorId,
    pub name: String,
    /// Display color as written in the tileset (e.g. `#ff0000`)
    pub color: String,
    /// Representative tile shown in editors
    pub icon_tile: Option<TileId>,
    /// Declared color probability; stored but not used for selection
    pub probability: f64,
}

/// Terrain color at each corner of a tile or cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerSignature {
    pub top_left: ColorId,
    pub top_right: ColorId,
    pub bottom_right: ColorId,
    pub bottom_left: ColorId,
}

/// Corner colors required by a map cell
pub type CellTerrainContext = CornerSignature;

impl CornerSignature {
    /// Corners listed clockwise from top-left
    pub fn new(
        top_left: ColorId,
        top_right: ColorId,
        bottom_right: ColorId,
        bottom_left: ColorId,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Same color at all four corners
    pub fn uniform(color: ColorId) -> Self {
        Self::new(color, color, color, color)
    }

    /// Corner slots of an 8-slot wang id; edge slots are ignored
    pub fn from_wang_id(wang_id: WangId) -> Self {
        Self::new(
            ColorId(wang_id.color(WangId::TOP_LEFT)),
            ColorId(wang_id.color(WangId::TOP_RIGHT)),
            ColorId(wang_id.color(WangId::BOTTOM_RIGHT)),
            ColorId(wang_id.color(WangId::BOTTOM_LEFT)),
        )
    }

    /// Corners clockwise from top-left
    pub fn corners(&self) -> [ColorId; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Whether all four corners share one color
    pub fn is_pure(&self) -> bool {
        let [tl, tr, br, bl] = self.corners();
        tl == tr && tr == br && br == bl
    }
}

impl fmt::Display for CornerSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[TL {} TR {} BR {} BL {}]",
            self.top_left, self.top_right, self.bottom_right, self.bottom_left
        )
    }
}

/// A member tile with its corner signature and selection weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WangEntry {
    pub tile_id: TileId,
    pub signature: CornerSignature,
    pub weight: f64,
}

/// A wang set prepared for corner matching
#[derive(Debug, Clone)]
pub struct WangSet {
    name: String,
    kind: WangSetKind,
    colors: Vec<TerrainColor>,
    /// Ascending by tile id
    entries: Vec<WangEntry>,
}

impl WangSet {
    /// Build from a validated set, taking each member's weight from its tile record
    pub fn from_def(def: &WangSetDef, registry: &TilesetRegistry) -> Result<Self, AutotileError> {
        let colors = def
            .colors
            .iter()
            .zip(1u8..)
            .map(|(color, id)| TerrainColor {
                id: ColorId(id),
                name: color.name.clone(),
                color: color.color.clone(),
                icon_tile: color.tile,
                probability: color.probability,
            })
            .collect();

        let entries = def
            .tiles()
            .iter()
            .map(|member| -> Result<WangEntry, AutotileError> {
                let record = registry.lookup(member.tile_id)?;
                Ok(WangEntry {
                    tile_id: member.tile_id,
                    signature: CornerSignature::from_wang_id(member.wang_id),
                    weight: record.weight(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: def.name.clone(),
            kind: def.kind,
            colors,
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> WangSetKind {
        self.kind
    }

    pub fn colors(&self) -> &[TerrainColor] {
        &self.colors
    }

    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Find a color id by its declared name
    pub fn color_by_name(&self, name: &str) -> Option<ColorId> {
        self.colors.iter().find(|c| c.name == name).map(|c| c.id)
    }

    /// Member tiles in ascending id order
    pub fn entries(&self) -> &[WangEntry] {
        &self.entries
    }

    /// Corner signature of a member tile
    pub fn signature_of(&self, tile_id: TileId) -> Option<CornerSignature> {
        self.entries
            .binary_search_by_key(&tile_id, |e| e.tile_id)
            .ok()
            .map(|index| self.entries[index].signature)
    }

    /// Tiles with the given color at every corner
    pub fn pure_tiles(&self, color: ColorId) -> Vec<TileId> {
        let target = CornerSignature::uniform(color);
        self.entries
            .iter()
            .filter(|e| e.signature == target)
            .map(|e| e.tile_id)
            .collect()
    }
}

/// Every wang set of one registry, ready for resolution
#[derive(Debug, Clone)]
pub struct WangCatalog {
    registry_id: Uuid,
    sets: Vec<WangSet>,
}

impl WangCatalog {
    /// Prepare all wang sets of a registry
    ///
    /// Corner sets that leave some color combination without a tile are
    /// logged as warnings, and signatures whose edge slots carry colors are
    /// logged at debug level since corner matching ignores those slots.
    pub fn build(registry: &TilesetRegistry) -> Result<Self, AutotileError> {
        let mut sets = Vec::with_capacity(registry.wang_sets().len());

        for def in registry.wang_sets() {
            let set = WangSet::from_def(def, registry)?;

            if set.kind() == WangSetKind::Corner {
                for member in def.tiles().iter().filter(|t| t.wang_id.has_edge_colors()) {
                    log::debug!(
                        "wang set '{}': tile {} has edge colors that corner matching ignores",
                        set.name(),
                        member.tile_id
                    );
                }

                match coverage_gaps(&set) {
                    Some(missing) if !missing.is_empty() => {
                        let sample: Vec<String> =
                            missing.iter().take(4).map(ToString::to_string).collect();
                        log::warn!(
                            "wang set '{}' in tileset '{}' has no tile for {} of {} corner combinations: {}{}",
                            set.name(),
                            registry.name(),
                            missing.len(),
                            set.color_count().pow(4),
                            sample.join(", "),
                            if missing.len() > sample.len() { ", ..." } else { "" }
                        );
                    }
                    Some(_) => {}
                    None => log::debug!(
                        "wang set '{}' has {} colors, skipping coverage check",
                        set.name(),
                        set.color_count()
                    ),
                }
            }

            sets.push(set);
        }

        Ok(Self {
            registry_id: registry.id(),
            sets,
        })
    }

    /// Identity of the registry this catalog was built from
    pub fn registry_id(&self) -> Uuid {
        self.registry_id
    }

    /// Get a wang set by name
    pub fn wang_set(&self, name: &str) -> Result<&WangSet, AutotileError> {
        self.sets
            .iter()
            .find(|set| set.name == name)
            .ok_or_else(|| AutotileError::UnknownWangSet(name.to_string()))
    }

    pub fn wang_sets(&self) -> &[WangSet] {
        &self.sets
    }

    /// Corner signature of a tile within a named set
    pub fn signature_of(
        &self,
        wang_set: &str,
        tile_id: TileId,
    ) -> Result<Option<CornerSignature>, AutotileError> {
        Ok(self.wang_set(wang_set)?.signature_of(tile_id))
    }

    /// Declared colors of a named set
    pub fn terrain_colors(&self, wang_set: &str) -> Result<&[TerrainColor], AutotileError> {
        Ok(self.wang_set(wang_set)?.colors())
    }
}
