//! Validated wang sets as stored in the registry

use crate::tileset::TileId;
use serde::{Deserialize, Serialize};

/// Wang ID: terrain color at all 8 positions of a tile
/// Uses the interchange format's position indexing:
///   7|0|1
///   6|X|2
///   5|4|3
/// - Even indices (0,2,4,6) = Edges (Top, Right, Bottom, Left)
/// - Odd indices (1,3,5,7) = Corners (TopRight, BottomRight, BottomLeft, TopLeft)
///
/// A value of 0 means "no terrain"; `k` means the k-th declared color of the set.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WangId(pub [u8; 8]);

impl WangId {
    pub const TOP: usize = 0;
    pub const TOP_RIGHT: usize = 1;
    pub const RIGHT: usize = 2;
    pub const BOTTOM_RIGHT: usize = 3;
    pub const BOTTOM: usize = 4;
    pub const BOTTOM_LEFT: usize = 5;
    pub const LEFT: usize = 6;
    pub const TOP_LEFT: usize = 7;

    /// Corner slots, clockwise from top-left
    pub const CORNERS: [usize; 4] = [
        Self::TOP_LEFT,
        Self::TOP_RIGHT,
        Self::BOTTOM_RIGHT,
        Self::BOTTOM_LEFT,
    ];

    /// Check if index is a corner (odd indices: 1,3,5,7)
    pub fn is_corner(i: usize) -> bool {
        i % 2 == 1
    }

    pub fn color(&self, index: usize) -> u8 {
        self.0[index % 8]
    }

    /// Highest color id used anywhere in the signature
    pub fn max_color(&self) -> u8 {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Whether any edge slot carries a color
    pub fn has_edge_colors(&self) -> bool {
        (0..8).filter(|&i| !Self::is_corner(i)).any(|i| self.0[i] != 0)
    }
}

/// Type of wang set - determines which positions take part in matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WangSetKind {
    /// 4 corners per tile
    #[default]
    Corner,
    /// 4 edges per tile
    Edge,
    /// 4 corners + 4 edges per tile
    Mixed,
}

impl WangSetKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            WangSetKind::Corner => "corner",
            WangSetKind::Edge => "edge",
            WangSetKind::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for WangSetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A declared terrain color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WangColor {
    pub name: String,
    /// Display color as written in the file (e.g. `#ff0000`)
    pub color: String,
    /// Representative tile shown in editors
    pub tile: Option<TileId>,
    pub probability: f64,
}

/// One tile's signature within a wang set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WangTile {
    pub tile_id: TileId,
    pub wang_id: WangId,
}

/// A validated wang set
///
/// Every color id in every signature references a declared color, and every
/// tile exists in the owning tileset. Tiles are stored in ascending id order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WangSetDef {
    pub name: String,
    pub kind: WangSetKind,
    pub colors: Vec<WangColor>,
    pub(crate) tiles: Vec<WangTile>,
}

impl WangSetDef {
    /// Number of declared colors; valid color ids are `1..=color_count`
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Declared color for a 1-based color id
    pub fn color(&self, color_id: u8) -> Option<&WangColor> {
        (color_id as usize)
            .checked_sub(1)
            .and_then(|index| self.colors.get(index))
    }

    /// Member tiles in ascending id order
    pub fn tiles(&self) -> &[WangTile] {
        &self.tiles
    }

    /// Signature of a member tile
    pub fn wang_id_of(&self, tile_id: TileId) -> Option<WangId> {
        self.tiles
            .binary_search_by_key(&tile_id, |t| t.tile_id)
            .ok()
            .map(|index| self.tiles[index].wang_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wang_id_positions() {
        assert!(WangId::is_corner(WangId::TOP_RIGHT));
        assert!(!WangId::is_corner(WangId::TOP));
    }

    #[test]
    fn test_wang_id_edge_detection() {
        assert!(!WangId([0, 1, 0, 2, 0, 1, 0, 1]).has_edge_colors());
        assert!(WangId([1, 1, 0, 2, 0, 1, 0, 1]).has_edge_colors());
        assert_eq!(WangId([0, 1, 0, 2, 0, 1, 0, 1]).max_color(), 2);
    }

    #[test]
    fn test_color_lookup_is_one_based() {
        let set = WangSetDef {
            name: "DirtPath".to_string(),
            kind: WangSetKind::Corner,
            colors: vec![
                WangColor {
                    name: "Dirt".to_string(),
                    color: "#ff0000".to_string(),
                    tile: None,
                    probability: 1.0,
                },
                WangColor {
                    name: "Grass".to_string(),
                    color: "#00ff00".to_string(),
                    tile: None,
                    probability: 1.0,
                },
            ],
            tiles: vec![WangTile {
                tile_id: 14,
                wang_id: WangId([0, 1, 0, 1, 0, 1, 0, 1]),
            }],
        };

        assert!(set.color(0).is_none());
        assert_eq!(set.color(1).map(|c| c.name.as_str()), Some("Dirt"));
        assert_eq!(set.color(2).map(|c| c.name.as_str()), Some("Grass"));
        assert!(set.color(3).is_none());
        assert_eq!(set.wang_id_of(14), Some(WangId([0, 1, 0, 1, 0, 1, 0, 1])));
        assert_eq!(set.wang_id_of(15), None);
    }
}
