//! Exact-match corner resolution
//!
//! A cell context resolves to every member tile whose corner signature equals
//! it. "No terrain" is matched like any other color, and there is no nearest
//! match: a context nothing provides is an error.

use crate::terrain::{CellTerrainContext, ColorId, CornerSignature, WangCatalog, WangSet};
use crate::AutotileError;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use wangtile_core::{TileId, WangSetKind};

/// Sets with more colors than this are not checked for full coverage
pub const MAX_ENUMERABLE_COLORS: usize = 16;

/// A tile that can fill a cell, with its selection weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub tile_id: TileId,
    pub weight: f64,
}

/// Non-empty list of candidates in ascending tile id order
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Build from arbitrary candidates, sorted by id with duplicates dropped
    ///
    /// Returns `None` when given no candidates.
    pub fn new(candidates: impl IntoIterator<Item = Candidate>) -> Option<Self> {
        let mut candidates: Vec<Candidate> = candidates.into_iter().collect();
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by_key(|c| c.tile_id);
        candidates.dedup_by_key(|c| c.tile_id);
        Some(Self { candidates })
    }

    /// A set holding exactly one tile
    pub fn single(tile_id: TileId, weight: f64) -> Self {
        Self {
            candidates: vec![Candidate { tile_id, weight }],
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Always false; resolution never produces an empty set
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn contains(&self, tile_id: TileId) -> bool {
        self.candidates
            .binary_search_by_key(&tile_id, |c| c.tile_id)
            .is_ok()
    }

    /// Candidate with the lowest tile id
    pub fn first(&self) -> Candidate {
        self.candidates[0]
    }

    /// Sum of all positive weights
    pub fn total_weight(&self) -> f64 {
        self.candidates
            .iter()
            .map(|c| c.weight)
            .filter(|w| *w > 0.0)
            .sum()
    }

    pub fn tile_ids(&self) -> Vec<TileId> {
        self.candidates.iter().map(|c| c.tile_id).collect()
    }
}

/// Find every tile of a corner set matching the context exactly
pub fn resolve(set: &WangSet, context: CellTerrainContext) -> Result<CandidateSet, AutotileError> {
    if set.kind() != WangSetKind::Corner {
        return Err(AutotileError::UnsupportedWangType {
            wang_set: set.name().to_string(),
            kind: set.kind(),
        });
    }

    // Entries are kept in ascending id order, so the result is too
    let candidates: Vec<Candidate> = set
        .entries()
        .iter()
        .filter(|entry| entry.signature == context)
        .map(|entry| Candidate {
            tile_id: entry.tile_id,
            weight: entry.weight,
        })
        .collect();

    if candidates.is_empty() {
        return Err(AutotileError::NoAutotileMatch {
            wang_set: set.name().to_string(),
            context,
        });
    }

    Ok(CandidateSet { candidates })
}

/// Corner combinations of declared colors that no tile provides
///
/// Returns `None` for non-corner sets and for sets with more than
/// [`MAX_ENUMERABLE_COLORS`] colors. "No terrain" corners are not part of the
/// enumeration.
pub fn coverage_gaps(set: &WangSet) -> Option<Vec<CornerSignature>> {
    if set.kind() != WangSetKind::Corner || set.color_count() > MAX_ENUMERABLE_COLORS {
        return None;
    }

    let provided: std::collections::HashSet<CornerSignature> =
        set.entries().iter().map(|e| e.signature).collect();

    // Bounded by MAX_ENUMERABLE_COLORS, so the cast cannot truncate
    let colors: Vec<ColorId> = (1..=set.color_count() as u8).map(ColorId).collect();
    let mut missing = Vec::new();
    for &tl in &colors {
        for &tr in &colors {
            for &br in &colors {
                for &bl in &colors {
                    let signature = CornerSignature::new(tl, tr, br, bl);
                    if !provided.contains(&signature) {
                        missing.push(signature);
                    }
                }
            }
        }
    }

    Some(missing)
}

/// Memoized resolution results
///
/// Results are keyed by wang set name and context. The cache remembers which
/// registry load it was filled from and empties itself when asked to resolve
/// against a catalog built from a different load. Failed resolutions are not
/// cached.
#[derive(Debug, Default)]
pub struct CandidateCache {
    registry_id: Option<Uuid>,
    sets: HashMap<String, HashMap<CornerSignature, Arc<CandidateSet>>>,
    hits: u64,
    misses: u64,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve through the cache
    pub fn resolve(
        &mut self,
        catalog: &WangCatalog,
        wang_set: &str,
        context: CellTerrainContext,
    ) -> Result<Arc<CandidateSet>, AutotileError> {
        if self.registry_id != Some(catalog.registry_id()) {
            if self.registry_id.is_some() {
                log::debug!("tileset reloaded, dropping {} cached resolutions", self.len());
            }
            self.clear();
            self.registry_id = Some(catalog.registry_id());
        }

        if let Some(found) = self.sets.get(wang_set).and_then(|m| m.get(&context)) {
            self.hits += 1;
            return Ok(Arc::clone(found));
        }

        let resolved = Arc::new(resolve(catalog.wang_set(wang_set)?, context)?);
        self.misses += 1;
        self.sets
            .entry(wang_set.to_string())
            .or_default()
            .insert(context, Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Drop every cached result
    pub fn clear(&mut self) {
        self.sets.clear();
        self.registry_id = None;
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.sets.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use wangtile_core::TilesetRegistry;

    const DIRT: ColorId = ColorId(1);
    const GRASS: ColorId = ColorId(2);

    fn dirt_path(catalog: &WangCatalog) -> &WangSet {
        catalog.wang_set("DirtPath").unwrap()
    }

    #[test]
    fn test_resolve_pure_dirt() {
        let catalog = WangCatalog::build(&fixtures::fields()).unwrap();
        let set = resolve(dirt_path(&catalog), CornerSignature::uniform(DIRT)).unwrap();

        assert_eq!(set.tile_ids(), vec![14, 18]);
        assert_eq!(set.first().tile_id, 14);
        assert!((set.total_weight() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_transition_variants_ascending() {
        let catalog = WangCatalog::build(&fixtures::fields()).unwrap();

        // Grass along the bottom edge
        let bottom = CornerSignature::new(DIRT, DIRT, GRASS, GRASS);
        let set = resolve(dirt_path(&catalog), bottom).unwrap();
        assert_eq!(set.tile_ids(), vec![1, 2, 3, 26]);

        let single = resolve(dirt_path(&catalog), CornerSignature::new(DIRT, DIRT, GRASS, DIRT))
            .unwrap();
        assert_eq!(single, CandidateSet::single(0, 1.0));
    }

    #[test]
    fn test_every_member_resolves_from_its_own_signature() {
        let catalog = WangCatalog::build(&fixtures::fields()).unwrap();
        let set = dirt_path(&catalog);

        for entry in set.entries() {
            let candidates = resolve(set, entry.signature).unwrap();
            assert!(
                candidates.contains(entry.tile_id),
                "tile {} missing from {}",
                entry.tile_id,
                entry.signature
            );
            for candidate in candidates.iter() {
                assert_eq!(set.signature_of(candidate.tile_id), Some(entry.signature));
            }
        }
    }

    #[test]
    fn test_diagonal_context_has_no_match() {
        let catalog = WangCatalog::build(&fixtures::fields()).unwrap();
        let diagonal = CornerSignature::new(DIRT, GRASS, DIRT, GRASS);

        match resolve(dirt_path(&catalog), diagonal) {
            Err(AutotileError::NoAutotileMatch { wang_set, context }) => {
                assert_eq!(wang_set, "DirtPath");
                assert_eq!(context, diagonal);
            }
            other => panic!("expected NoAutotileMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_no_terrain_is_matched_strictly() {
        let catalog = WangCatalog::build(&fixtures::fields()).unwrap();
        let partial = CornerSignature::new(DIRT, DIRT, DIRT, ColorId::NONE);

        assert!(matches!(
            resolve(dirt_path(&catalog), partial),
            Err(AutotileError::NoAutotileMatch { .. })
        ));
    }

    #[test]
    fn test_non_corner_set_is_unsupported() {
        let json = r##"{"name": "Roads", "tilewidth": 16, "tileheight": 16,
            "tilecount": 2, "columns": 2, "image": "roads.png",
            "wangsets": [{"name": "Road", "type": "mixed",
                "colors": [{"name": "Asphalt", "color": "#333333"}],
                "wangtiles": [{"tileid": 0, "wangid": [1,1,1,1,1,1,1,1]}]}]}"##;
        let registry = TilesetRegistry::from_json_str(json).unwrap();
        let catalog = WangCatalog::build(&registry).unwrap();
        let set = catalog.wang_set("Road").unwrap();

        assert!(matches!(
            resolve(set, CornerSignature::uniform(ColorId(1))),
            Err(AutotileError::UnsupportedWangType { kind: WangSetKind::Mixed, .. })
        ));
        assert!(coverage_gaps(set).is_none());
    }

    #[test]
    fn test_coverage_gaps_of_dirt_path() {
        let catalog = WangCatalog::build(&fixtures::fields()).unwrap();
        let missing = coverage_gaps(dirt_path(&catalog)).unwrap();

        assert_eq!(
            missing,
            vec![
                CornerSignature::new(DIRT, GRASS, DIRT, GRASS),
                CornerSignature::new(GRASS, DIRT, GRASS, DIRT),
            ]
        );
    }

    #[test]
    fn test_coverage_of_single_color_set_is_complete() {
        let catalog = WangCatalog::build(&fixtures::tiles()).unwrap();
        let set = catalog.wang_set("BasicSet").unwrap();
        assert_eq!(coverage_gaps(set), Some(Vec::new()));
    }

    #[test]
    fn test_cache_hits_and_misses() {
        let catalog = WangCatalog::build(&fixtures::fields()).unwrap();
        let mut cache = CandidateCache::new();
        let ctx = CornerSignature::uniform(GRASS);

        let first = cache.resolve(&catalog, "DirtPath", ctx).unwrap();
        let second = cache.resolve(&catalog, "DirtPath", ctx).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert_eq!(cache.len(), 1);

        // Errors are returned but not cached
        let diagonal = CornerSignature::new(DIRT, GRASS, DIRT, GRASS);
        assert!(cache.resolve(&catalog, "DirtPath", diagonal).is_err());
        assert!(matches!(
            cache.resolve(&catalog, "Water", ctx),
            Err(AutotileError::UnknownWangSet(_))
        ));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_resets_for_new_registry_load() {
        let old = WangCatalog::build(&fixtures::fields()).unwrap();
        let new = WangCatalog::build(&fixtures::fields()).unwrap();
        let mut cache = CandidateCache::new();
        let ctx = CornerSignature::uniform(DIRT);

        cache.resolve(&old, "DirtPath", ctx).unwrap();
        cache.resolve(&new, "DirtPath", ctx).unwrap();

        assert_eq!(cache.hits(), 0);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 1);
    }
}
