//! Descriptor validation and conversion into registry records

use crate::descriptor::{TileDescriptor, TilesetDescriptor, WangSetDescriptor};
use crate::tileset::{TileId, TileImage, TileRect, TileRecord};
use crate::wang::{WangColor, WangId, WangSetDef, WangTile};
use crate::TilesetError;
use std::collections::{BTreeMap, HashSet};
use wangtile_animation::{AnimationSpec, Frame};

/// Color ids are stored in a `u8` with 0 reserved for "no terrain"
pub const MAX_WANG_COLORS: usize = 254;

/// Build every tile record, checking ids, probabilities and animations
pub(crate) fn collect_tiles(
    desc: &TilesetDescriptor,
) -> Result<BTreeMap<TileId, TileRecord>, TilesetError> {
    let name = desc.name.as_str();

    if desc.tile_width == 0 || desc.tile_height == 0 {
        return Err(TilesetError::malformed(name, "tile size must be non-zero"));
    }

    let mut tiles = BTreeMap::new();

    // Atlas tilesets define every id below the tile count
    if let Some(source) = &desc.image {
        if desc.columns == 0 && desc.tile_count > 0 {
            return Err(TilesetError::malformed(
                name,
                "atlas tileset declares zero columns",
            ));
        }
        for id in 0..desc.tile_count {
            let rect = atlas_rect(desc, id).ok_or_else(|| {
                TilesetError::malformed(
                    name,
                    format!("tile {id} lies outside the addressable atlas"),
                )
            })?;
            tiles.insert(
                id,
                TileRecord {
                    id,
                    image: Some(TileImage::Atlas {
                        source: source.clone(),
                        rect,
                    }),
                    probability: None,
                    animation: None,
                    width: rect.width,
                    height: rect.height,
                },
            );
        }
    }

    let mut seen = HashSet::new();
    for tile in &desc.tiles {
        if !seen.insert(tile.id) {
            return Err(TilesetError::malformed(
                name,
                format!("duplicate tile id {}", tile.id),
            ));
        }

        if desc.is_atlas() && tile.id >= desc.tile_count {
            return Err(TilesetError::malformed(
                name,
                format!(
                    "tile id {} is outside the atlas (tile count {})",
                    tile.id, desc.tile_count
                ),
            ));
        }

        if let Some(p) = tile.probability {
            if !p.is_finite() || p < 0.0 {
                return Err(TilesetError::malformed(
                    name,
                    format!("tile {} has invalid probability {}", tile.id, p),
                ));
            }
        }

        let record = tiles
            .entry(tile.id)
            .or_insert_with(|| collection_record(desc, tile.id));
        apply_tile_descriptor(desc, tile, record);
    }

    // Frames may reference any tile, so resolve animations once all ids are known
    for tile in desc.tiles.iter().filter(|t| !t.animation.is_empty()) {
        let animation = build_animation(name, tile, &tiles)?;
        if let Some(record) = tiles.get_mut(&tile.id) {
            record.animation = Some(animation);
        }
    }

    Ok(tiles)
}

fn atlas_rect(desc: &TilesetDescriptor, id: TileId) -> Option<TileRect> {
    let col = id % desc.columns;
    let row = id / desc.columns;
    let offset = |index: u32, size: u32| {
        size.checked_add(desc.spacing)?
            .checked_mul(index)?
            .checked_add(desc.margin)
    };
    Some(TileRect {
        x: offset(col, desc.tile_width)?,
        y: offset(row, desc.tile_height)?,
        width: desc.tile_width,
        height: desc.tile_height,
    })
}

fn collection_record(desc: &TilesetDescriptor, id: TileId) -> TileRecord {
    TileRecord {
        id,
        image: None,
        probability: None,
        animation: None,
        width: desc.tile_width,
        height: desc.tile_height,
    }
}

fn apply_tile_descriptor(desc: &TilesetDescriptor, tile: &TileDescriptor, record: &mut TileRecord) {
    record.probability = tile.probability;

    if let Some(source) = &tile.image {
        let width = tile.image_width.unwrap_or(desc.tile_width);
        let height = tile.image_height.unwrap_or(desc.tile_height);
        record.image = Some(TileImage::Standalone {
            source: source.clone(),
            width,
            height,
        });
        record.width = width;
        record.height = height;
    }
}

fn build_animation(
    tileset: &str,
    tile: &TileDescriptor,
    tiles: &BTreeMap<TileId, TileRecord>,
) -> Result<AnimationSpec, TilesetError> {
    if let Some(frame) = tile.animation.iter().find(|f| !tiles.contains_key(&f.tile_id)) {
        return Err(TilesetError::malformed(
            tileset,
            format!(
                "animation of tile {} references unknown tile {}",
                tile.id, frame.tile_id
            ),
        ));
    }

    let frames = tile
        .animation
        .iter()
        .map(|f| Frame::new(f.tile_id, f.duration))
        .collect();

    AnimationSpec::new(frames).map_err(|e| {
        TilesetError::malformed(tileset, format!("animation of tile {}: {}", tile.id, e))
    })
}

/// Validate every wang set against the collected tiles
pub(crate) fn collect_wang_sets(
    desc: &TilesetDescriptor,
    tiles: &BTreeMap<TileId, TileRecord>,
) -> Result<Vec<WangSetDef>, TilesetError> {
    let mut names = HashSet::new();
    let mut sets = Vec::with_capacity(desc.wangsets.len());

    for set in &desc.wangsets {
        if !names.insert(set.name.as_str()) {
            return Err(TilesetError::malformed(
                &desc.name,
                format!("duplicate wang set '{}'", set.name),
            ));
        }
        sets.push(build_wang_set(&desc.name, set, tiles)?);
    }

    Ok(sets)
}

fn build_wang_set(
    tileset: &str,
    set: &WangSetDescriptor,
    tiles: &BTreeMap<TileId, TileRecord>,
) -> Result<WangSetDef, TilesetError> {
    if set.colors.len() > MAX_WANG_COLORS {
        return Err(TilesetError::malformed(
            tileset,
            format!(
                "wang set '{}' declares {} colors (max {})",
                set.name,
                set.colors.len(),
                MAX_WANG_COLORS
            ),
        ));
    }

    let mut colors = Vec::with_capacity(set.colors.len());
    for (index, color) in set.colors.iter().enumerate() {
        if !color.probability.is_finite() || color.probability < 0.0 {
            return Err(TilesetError::malformed(
                tileset,
                format!(
                    "wang set '{}' color {} has invalid probability {}",
                    set.name,
                    index + 1,
                    color.probability
                ),
            ));
        }

        let tile = match u32::try_from(color.tile) {
            Ok(id) if tiles.contains_key(&id) => Some(id),
            Ok(id) => {
                return Err(TilesetError::malformed(
                    tileset,
                    format!(
                        "wang set '{}' color {} uses unknown tile {}",
                        set.name,
                        index + 1,
                        id
                    ),
                ));
            }
            Err(_) => None,
        };

        colors.push(WangColor {
            name: color.name.clone(),
            color: color.color.clone(),
            tile,
            probability: color.probability,
        });
    }

    let mut members = Vec::with_capacity(set.wangtiles.len());
    let mut seen = HashSet::new();
    for wang_tile in &set.wangtiles {
        let wang_id = WangId(wang_tile.wang_id);

        if !tiles.contains_key(&wang_tile.tile_id) {
            return Err(TilesetError::malformed(
                tileset,
                format!(
                    "wang set '{}' references unknown tile {}",
                    set.name, wang_tile.tile_id
                ),
            ));
        }

        if !seen.insert(wang_tile.tile_id) {
            return Err(TilesetError::malformed(
                tileset,
                format!(
                    "wang set '{}' lists tile {} twice",
                    set.name, wang_tile.tile_id
                ),
            ));
        }

        if wang_id.max_color() as usize > colors.len() {
            return Err(TilesetError::malformed(
                tileset,
                format!(
                    "wang set '{}' tile {} references undeclared terrain color {}",
                    set.name,
                    wang_tile.tile_id,
                    wang_id.max_color()
                ),
            ));
        }

        members.push(WangTile {
            tile_id: wang_tile.tile_id,
            wang_id,
        });
    }
    members.sort_by_key(|t| t.tile_id);

    Ok(WangSetDef {
        name: set.name.clone(),
        kind: set.kind,
        colors,
        tiles: members,
    })
}

#[cfg(test)]
mod tests {
    use crate::{TilesetError, TilesetRegistry};

    fn expect_malformed(json: &str, needle: &str) {
        match TilesetRegistry::from_json_str(json) {
            Err(TilesetError::MalformedAsset { reason, .. }) => {
                assert!(
                    reason.contains(needle),
                    "expected reason containing '{needle}', got '{reason}'"
                );
            }
            other => panic!("expected MalformedAsset, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_tile_id_rejected() {
        expect_malformed(
            r#"{"name": "T", "tilewidth": 16, "tileheight": 16,
                "tiles": [{"id": 3}, {"id": 3}]}"#,
            "duplicate tile id 3",
        );
    }

    #[test]
    fn test_animation_unknown_frame_rejected() {
        expect_malformed(
            r#"{"name": "T", "tilewidth": 16, "tileheight": 16, "tilecount": 4, "columns": 2,
                "image": "t.png",
                "tiles": [{"id": 1, "animation": [
                    {"tileid": 1, "duration": 300}, {"tileid": 9, "duration": 300}]}]}"#,
            "references unknown tile 9",
        );
    }

    #[test]
    fn test_zero_length_animation_rejected() {
        expect_malformed(
            r#"{"name": "T", "tilewidth": 16, "tileheight": 16, "tilecount": 4, "columns": 2,
                "image": "t.png",
                "tiles": [{"id": 1, "animation": [{"tileid": 1, "duration": 0}]}]}"#,
            "zero total duration",
        );
    }

    #[test]
    fn test_undeclared_terrain_color_rejected() {
        expect_malformed(
            r##"{"name": "T", "tilewidth": 16, "tileheight": 16, "tilecount": 4, "columns": 2,
                "image": "t.png",
                "wangsets": [{"name": "Ground", "type": "corner",
                    "colors": [{"name": "Grass", "color": "#00ff00"}],
                    "wangtiles": [{"tileid": 0, "wangid": [0,1,0,2,0,1,0,1]}]}]}"##,
            "undeclared terrain color 2",
        );
    }

    #[test]
    fn test_wang_tile_unknown_tile_rejected() {
        expect_malformed(
            r##"{"name": "T", "tilewidth": 16, "tileheight": 16, "tilecount": 4, "columns": 2,
                "image": "t.png",
                "wangsets": [{"name": "Ground", "type": "corner",
                    "colors": [{"name": "Grass", "color": "#00ff00"}],
                    "wangtiles": [{"tileid": 12, "wangid": [0,1,0,1,0,1,0,1]}]}]}"##,
            "unknown tile 12",
        );
    }

    #[test]
    fn test_negative_probability_rejected() {
        expect_malformed(
            r#"{"name": "T", "tilewidth": 16, "tileheight": 16,
                "tiles": [{"id": 0, "probability": -0.5}]}"#,
            "invalid probability",
        );
    }

    #[test]
    fn test_atlas_id_out_of_range_rejected() {
        expect_malformed(
            r#"{"name": "T", "tilewidth": 16, "tileheight": 16, "tilecount": 4, "columns": 2,
                "image": "t.png", "tiles": [{"id": 4}]}"#,
            "outside the atlas",
        );
    }

    #[test]
    fn test_atlas_geometry_overflow_rejected() {
        expect_malformed(
            r#"{"name": "T", "tilewidth": 4294967295, "tileheight": 16, "spacing": 1,
                "tilecount": 2, "columns": 2, "image": "m.png"}"#,
            "tile 0 lies outside the addressable atlas",
        );
    }

    #[test]
    fn test_duplicate_wang_set_rejected() {
        expect_malformed(
            r#"{"name": "T", "tilewidth": 16, "tileheight": 16, "tilecount": 1, "columns": 1,
                "image": "t.png",
                "wangsets": [
                    {"name": "Ground", "type": "corner", "colors": [], "wangtiles": []},
                    {"name": "Ground", "type": "edge", "colors": [], "wangtiles": []}]}"#,
            "duplicate wang set",
        );
    }

    #[test]
    fn test_forward_animation_reference_accepted() {
        // Frame tiles declared after the animated tile are still known
        let json = r#"{"name": "T", "tilewidth": 16, "tileheight": 16,
            "tiles": [
                {"id": 0, "image": "a.png", "animation": [
                    {"tileid": 0, "duration": 100}, {"tileid": 1, "duration": 100}]},
                {"id": 1, "image": "b.png"}
            ]}"#;
        let registry = TilesetRegistry::from_json_str(json).unwrap();
        assert!(registry.lookup(0).unwrap().is_animated());
    }
}
