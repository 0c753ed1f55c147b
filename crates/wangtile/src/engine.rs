//! The loaded engine and its hot-reload handle

use crate::config::EngineConfig;
use crate::error::EngineError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use uuid::Uuid;
use wangtile_animation::AnimationScheduler;
use wangtile_autotile::{
    coverage_gaps, resolve, select, AutotileError, CandidateSet, CellTerrainContext, WangCatalog,
};
use wangtile_core::{TileId, TileImage, TilesetDescriptor, TilesetRegistry};

/// What the renderer draws for one cell on one tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderTile {
    /// Tile actually drawn, after animation
    pub tile_id: TileId,
    pub image: Option<TileImage>,
}

/// Registry, wang catalog and animation scheduler of one tileset load
///
/// Immutable once built. Share it behind an `Arc` and read from any thread.
#[derive(Debug)]
pub struct TileEngine {
    registry: TilesetRegistry,
    catalog: WangCatalog,
    scheduler: AnimationScheduler,
    config: EngineConfig,
}

impl TileEngine {
    pub fn load(descriptor: &TilesetDescriptor, config: EngineConfig) -> Result<Self, EngineError> {
        let registry = TilesetRegistry::load(descriptor)?;
        config.validate(&registry)?;

        let catalog = WangCatalog::build(&registry)?;
        if config.autotile.require_full_coverage {
            for set in catalog.wang_sets() {
                match coverage_gaps(set) {
                    Some(missing) if !missing.is_empty() => {
                        return Err(AutotileError::IncompleteCoverage {
                            wang_set: set.name().to_string(),
                            missing,
                        }
                        .into());
                    }
                    _ => {}
                }
            }
        }

        let scheduler = AnimationScheduler::from_animations(
            registry
                .animated_tiles()
                .map(|(tile_id, animation)| (tile_id, animation.clone())),
            config.animation.phase,
        );

        Ok(Self {
            registry,
            catalog,
            scheduler,
            config,
        })
    }

    /// Read a descriptor file and load it
    pub fn from_path(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self, EngineError> {
        let descriptor = TilesetDescriptor::from_path(path)?;
        Self::load(&descriptor, config)
    }

    pub fn registry(&self) -> &TilesetRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &WangCatalog {
        &self.catalog
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Identity of the registry load behind this engine
    pub fn registry_id(&self) -> Uuid {
        self.registry.id()
    }

    /// Candidates of a named wang set for a cell context
    pub fn resolve(
        &self,
        wang_set: &str,
        context: CellTerrainContext,
    ) -> Result<CandidateSet, EngineError> {
        Ok(resolve(self.catalog.wang_set(wang_set)?, context)?)
    }

    /// Weighted pick among candidates
    pub fn select<R: Rng + ?Sized>(&self, candidates: &CandidateSet, rng: &mut R) -> TileId {
        select(candidates, rng)
    }

    /// Frame of `tile_id` shown at `elapsed`; static tiles map to themselves
    pub fn current_frame(&self, tile_id: TileId, elapsed: Duration) -> TileId {
        self.scheduler.current_frame(tile_id, elapsed)
    }

    /// Frame and image to draw for a placed tile
    pub fn render_tile(
        &self,
        tile_id: TileId,
        elapsed: Duration,
        phase_offset: Duration,
    ) -> Result<RenderTile, EngineError> {
        let frame = self
            .scheduler
            .current_frame_with_phase(tile_id, elapsed, phase_offset);
        let record = self.registry.lookup(frame)?;
        Ok(RenderTile {
            tile_id: frame,
            image: record.image.clone(),
        })
    }
}

/// Shared, swappable engine
///
/// Readers take a [`snapshot`](Self::snapshot) and keep using it for as long
/// as they like; a reload builds a whole new engine and swaps it in, so no
/// reader ever sees a half-updated registry.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    current: Arc<RwLock<Arc<TileEngine>>>,
}

impl EngineHandle {
    pub fn new(engine: TileEngine) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(engine))),
        }
    }

    /// The engine as of now
    pub fn snapshot(&self) -> Arc<TileEngine> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Swap in a new engine, returning the previous one
    pub fn replace(&self, engine: TileEngine) -> Arc<TileEngine> {
        self.swap(Arc::new(engine))
    }

    /// Rebuild from a new descriptor with the current config and swap it in
    ///
    /// Returns the engine this call built, even if another replace lands
    /// right after it. On failure the current engine stays in place.
    pub fn reload(&self, descriptor: &TilesetDescriptor) -> Result<Arc<TileEngine>, EngineError> {
        let config = self.snapshot().config().clone();
        let engine = Arc::new(TileEngine::load(descriptor, config)?);
        self.swap(Arc::clone(&engine));
        Ok(engine)
    }

    fn swap(&self, engine: Arc<TileEngine>) -> Arc<TileEngine> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        log::info!(
            "replacing tileset '{}' ({}) with load {}",
            guard.registry().name(),
            guard.registry_id(),
            engine.registry_id()
        );
        std::mem::replace(&mut *guard, engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use wangtile_animation::PhaseMode;
    use wangtile_autotile::{ColorId, CornerSignature};

    const FIELDS: &str = include_str!("../../../assets/tilesets/fields.tsj");
    const OBJECTS: &str = include_str!("../../../assets/tilesets/objects.tsj");

    fn engine(json: &str, config: EngineConfig) -> TileEngine {
        TileEngine::load(&TilesetDescriptor::from_json_str(json).unwrap(), config).unwrap()
    }

    #[test]
    fn test_resolve_and_select() {
        let engine = engine(FIELDS, EngineConfig::default());
        let grass = CornerSignature::uniform(ColorId(2));

        let candidates = engine.resolve("DirtPath", grass).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(engine.select(&candidates, &mut rng), 37);
    }

    #[test]
    fn test_resolve_errors_pass_through() {
        let engine = engine(FIELDS, EngineConfig::default());
        let grass = CornerSignature::uniform(ColorId(2));

        assert!(matches!(
            engine.resolve("Water", grass),
            Err(EngineError::Autotile(AutotileError::UnknownWangSet(_)))
        ));
    }

    #[test]
    fn test_render_tile_follows_animation() {
        let engine = engine(OBJECTS, EngineConfig::default());

        let at = |ms| engine.render_tile(15, Duration::from_millis(ms), Duration::ZERO).unwrap();
        assert_eq!(at(0).tile_id, 15);
        assert_eq!(at(300).tile_id, 16);
        assert_eq!(at(600).tile_id, 15);

        // Phase offset shifts the cycle
        let shifted = engine
            .render_tile(15, Duration::ZERO, Duration::from_millis(300))
            .unwrap();
        assert_eq!(shifted.tile_id, 16);

        let image = at(300).image.unwrap();
        assert_eq!(image.source(), "../tiles/Objects.png");
        assert_eq!(image.size(), (16, 16));
    }

    #[test]
    fn test_static_tile_renders_itself() {
        let engine = engine(OBJECTS, EngineConfig::default());
        assert_eq!(engine.current_frame(3, Duration::from_secs(5)), 3);
        assert!(matches!(
            engine.render_tile(99, Duration::ZERO, Duration::ZERO),
            Err(EngineError::Tileset(_))
        ));
    }

    #[test]
    fn test_scheduler_takes_phase_mode_from_config() {
        let mut config = EngineConfig::default();
        config.animation.phase = PhaseMode::PerInstance;
        let engine = engine(OBJECTS, config);

        assert_eq!(engine.scheduler().phase_mode(), PhaseMode::PerInstance);
        assert_eq!(engine.scheduler().len(), 3);
    }

    #[test]
    fn test_unknown_fallback_tile_rejected() {
        let mut config = EngineConfig::default();
        config.autotile.fallback_tile = Some(500);
        let descriptor = TilesetDescriptor::from_json_str(FIELDS).unwrap();

        assert!(matches!(
            TileEngine::load(&descriptor, config),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_full_coverage_requirement() {
        let mut config = EngineConfig::default();
        config.autotile.require_full_coverage = true;
        let descriptor = TilesetDescriptor::from_json_str(FIELDS).unwrap();

        match TileEngine::load(&descriptor, config) {
            Err(EngineError::Autotile(AutotileError::IncompleteCoverage { wang_set, missing })) => {
                assert_eq!(wang_set, "DirtPath");
                assert_eq!(missing.len(), 2);
            }
            other => panic!("expected IncompleteCoverage, got {other:?}"),
        }
    }

    #[test]
    fn test_handle_replace_swaps_whole_engine() {
        let handle = EngineHandle::new(engine(FIELDS, EngineConfig::default()));
        let before = handle.snapshot();

        let previous = handle.replace(engine(FIELDS, EngineConfig::default()));
        let after = handle.snapshot();

        assert!(Arc::ptr_eq(&before, &previous));
        assert_ne!(before.registry_id(), after.registry_id());
        // Old snapshots stay usable
        assert_eq!(before.registry().name(), "FieldsTileset");
    }

    #[test]
    fn test_failed_reload_keeps_current_engine() {
        let handle = EngineHandle::new(engine(FIELDS, EngineConfig::default()));
        let id = handle.snapshot().registry_id();

        let broken = TilesetDescriptor::from_json_str(
            r#"{"name": "Broken", "tilewidth": 16, "tileheight": 16,
                "tiles": [{"id": 1}, {"id": 1}]}"#,
        )
        .unwrap();
        assert!(handle.reload(&broken).is_err());
        assert_eq!(handle.snapshot().registry_id(), id);

        let fresh = TilesetDescriptor::from_json_str(FIELDS).unwrap();
        let reloaded = handle.reload(&fresh).unwrap();
        assert_ne!(reloaded.registry_id(), id);
    }

    #[test]
    fn test_reload_returns_the_engine_it_built() {
        let handle = EngineHandle::new(engine(FIELDS, EngineConfig::default()));
        let fresh = TilesetDescriptor::from_json_str(OBJECTS).unwrap();

        let reloaded = handle.reload(&fresh).unwrap();
        assert!(Arc::ptr_eq(&reloaded, &handle.snapshot()));

        // A later replace does not change what reload handed back
        let previous = handle.replace(engine(FIELDS, EngineConfig::default()));
        assert!(Arc::ptr_eq(&reloaded, &previous));
        assert_eq!(reloaded.registry().name(), "Object");
        assert_ne!(handle.snapshot().registry_id(), reloaded.registry_id());
    }
}
