//! Terrain layer: the consumer side of autotiling
//!
//! Terrain lives on grid vertices, `(width + 1) x (height + 1)` of them. Cell
//! `(x, y)` takes its corners from vertices `(x, y)`, `(x + 1, y)`,
//! `(x + 1, y + 1)` and `(x, y + 1)` (y grows downward). Each cell caches the
//! tile chosen for it and its animation phase offset; only cells whose corners
//! changed are resolved again on [`TerrainLayer::refresh`].

use crate::engine::{RenderTile, TileEngine};
use crate::error::EngineError;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::time::Duration;
use uuid::Uuid;
use wangtile_autotile::{AutotileError, CandidateCache, CellTerrainContext, ColorId};
use wangtile_core::TileId;

/// Outcome of one [`TerrainLayer::refresh`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Cells whose tile was chosen again
    pub resolved: usize,
    /// Of those, cells that got the fallback tile because nothing matched
    pub substituted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellState {
    tile_id: TileId,
    phase_offset: Duration,
}

/// A rectangular region of terrain drawn from one wang set
#[derive(Debug)]
pub struct TerrainLayer {
    wang_set: String,
    width: u32,
    height: u32,
    /// World position of cell (0, 0), so chunks of a larger map pick the same
    /// variants the whole map would
    origin: (u32, u32),
    corners: Vec<ColorId>,
    cells: Vec<Option<CellState>>,
    dirty: BTreeSet<usize>,
    cache: CandidateCache,
    registry_id: Option<Uuid>,
}

impl TerrainLayer {
    /// A `width x height` layer with every corner set to `terrain`
    pub fn new(wang_set: impl Into<String>, width: u32, height: u32, terrain: ColorId) -> Self {
        let vertices = (width as usize + 1) * (height as usize + 1);
        let cells = width as usize * height as usize;
        Self {
            wang_set: wang_set.into(),
            width,
            height,
            origin: (0, 0),
            corners: vec![terrain; vertices],
            cells: vec![None; cells],
            dirty: (0..cells).collect(),
            cache: CandidateCache::new(),
            registry_id: None,
        }
    }

    /// Place this layer at a world offset
    pub fn with_origin(mut self, x: u32, y: u32) -> Self {
        self.origin = (x, y);
        self.mark_all_dirty();
        self
    }

    pub fn wang_set(&self) -> &str {
        &self.wang_set
    }

    /// Size in cells
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn origin(&self) -> (u32, u32) {
        self.origin
    }

    /// Terrain at a vertex
    pub fn corner(&self, x: u32, y: u32) -> Option<ColorId> {
        self.vertex_index(x, y).map(|i| self.corners[i])
    }

    /// Set the terrain at one vertex, dirtying the up to four cells around it
    pub fn set_corner(&mut self, x: u32, y: u32, terrain: ColorId) -> Result<(), EngineError> {
        let index = self
            .vertex_index(x, y)
            .ok_or(EngineError::OutOfBounds { x, y })?;
        if self.corners[index] == terrain {
            return Ok(());
        }
        self.corners[index] = terrain;

        // Cells whose corner this vertex is
        for (cx, cy) in [
            (x.checked_sub(1), y.checked_sub(1)),
            (Some(x), y.checked_sub(1)),
            (x.checked_sub(1), Some(y)),
            (Some(x), Some(y)),
        ] {
            if let (Some(cx), Some(cy)) = (cx, cy) {
                if let Some(cell) = self.cell_index(cx, cy) {
                    self.dirty.insert(cell);
                }
            }
        }
        Ok(())
    }

    /// Set all four corners of a cell
    pub fn set_cell_terrain(
        &mut self,
        x: u32,
        y: u32,
        terrain: ColorId,
    ) -> Result<(), EngineError> {
        if self.cell_index(x, y).is_none() {
            return Err(EngineError::OutOfBounds { x, y });
        }
        for (vx, vy) in [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)] {
            self.set_corner(vx, vy, terrain)?;
        }
        Ok(())
    }

    /// Set every vertex to one terrain
    pub fn fill(&mut self, terrain: ColorId) {
        self.corners.fill(terrain);
        self.mark_all_dirty();
    }

    /// Corner colors around a cell
    pub fn context(&self, x: u32, y: u32) -> Option<CellTerrainContext> {
        self.cell_index(x, y)?;
        let stride = self.width as usize + 1;
        let at = |vx: u32, vy: u32| self.corners[vy as usize * stride + vx as usize];
        Some(CellTerrainContext::new(
            at(x, y),
            at(x + 1, y),
            at(x + 1, y + 1),
            at(x, y + 1),
        ))
    }

    /// Cells waiting to be resolved
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_dirty(&self, x: u32, y: u32) -> bool {
        self.cell_index(x, y)
            .is_some_and(|index| self.dirty.contains(&index))
    }

    /// Choose tiles for every dirty cell
    ///
    /// A cell with no matching tile gets the configured fallback tile and a
    /// warning; without a fallback the refresh stops with `NoAutotileMatch`
    /// and that cell, along with any not yet reached, stays dirty. When the
    /// engine was reloaded since the last refresh, every cell is resolved again.
    pub fn refresh(&mut self, engine: &TileEngine) -> Result<RefreshReport, EngineError> {
        if self.registry_id != Some(engine.registry_id()) {
            if self.registry_id.is_some() {
                log::debug!(
                    "terrain layer '{}' sees a new tileset load, resolving all cells",
                    self.wang_set
                );
                self.mark_all_dirty();
            }
            self.cache.clear();
            self.registry_id = Some(engine.registry_id());
        }

        let seed = engine.config().selection.seed;
        let fallback = engine.config().autotile.fallback_tile;
        let mut report = RefreshReport::default();

        while let Some(&index) = self.dirty.first() {
            let (x, y) = self.cell_position(index);
            let context = self.context(x, y).ok_or(EngineError::OutOfBounds { x, y })?;
            let mut rng = cell_rng(
                seed,
                self.origin.0.wrapping_add(x),
                self.origin.1.wrapping_add(y),
            );

            let tile_id = match self.cache.resolve(engine.catalog(), &self.wang_set, context) {
                Ok(candidates) => engine.select(&candidates, &mut rng),
                Err(AutotileError::NoAutotileMatch { wang_set, context }) => match fallback {
                    Some(tile_id) => {
                        log::warn!(
                            "no tile in wang set '{}' matches {} at cell ({}, {}), using fallback tile {}",
                            wang_set,
                            context,
                            x,
                            y,
                            tile_id
                        );
                        report.substituted += 1;
                        tile_id
                    }
                    None => {
                        return Err(AutotileError::NoAutotileMatch { wang_set, context }.into())
                    }
                },
                Err(e) => return Err(e.into()),
            };

            let phase_offset = engine.scheduler().phase_offset(tile_id, &mut rng);
            self.cells[index] = Some(CellState {
                tile_id,
                phase_offset,
            });
            self.dirty.remove(&index);
            report.resolved += 1;
        }

        Ok(report)
    }

    /// Tile chosen for a cell by the last refresh
    pub fn tile_at(&self, x: u32, y: u32) -> Option<TileId> {
        self.cell_index(x, y)
            .and_then(|index| self.cells[index])
            .map(|cell| cell.tile_id)
    }

    /// Animation phase offset of a cell's tile
    pub fn phase_offset_at(&self, x: u32, y: u32) -> Option<Duration> {
        self.cell_index(x, y)
            .and_then(|index| self.cells[index])
            .map(|cell| cell.phase_offset)
    }

    /// What to draw for a cell at `elapsed`; `None` before the cell's first refresh
    ///
    /// Never selects a new variant, only advances the cached tile's animation.
    pub fn render_tile(
        &self,
        engine: &TileEngine,
        x: u32,
        y: u32,
        elapsed: Duration,
    ) -> Result<Option<RenderTile>, EngineError> {
        let Some(index) = self.cell_index(x, y) else {
            return Err(EngineError::OutOfBounds { x, y });
        };
        match self.cells[index] {
            Some(cell) => engine
                .render_tile(cell.tile_id, elapsed, cell.phase_offset)
                .map(Some),
            None => Ok(None),
        }
    }

    fn mark_all_dirty(&mut self) {
        self.dirty = (0..self.cells.len()).collect();
    }

    fn vertex_index(&self, x: u32, y: u32) -> Option<usize> {
        (x <= self.width && y <= self.height)
            .then(|| (y as usize) * (self.width as usize + 1) + x as usize)
    }

    fn cell_index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize) * (self.width as usize) + x as usize)
    }

    fn cell_position(&self, index: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }
}

/// Random source for one cell, a pure function of the seed and position
fn cell_rng(seed: u64, x: u32, y: u32) -> SmallRng {
    SmallRng::seed_from_u64(cell_seed(seed, x, y))
}

fn cell_seed(seed: u64, x: u32, y: u32) -> u64 {
    let mut v = seed ^ (u64::from(x) << 32 | u64::from(y)).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    v = (v ^ (v >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    v = (v ^ (v >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    v ^ (v >> 31)
}
