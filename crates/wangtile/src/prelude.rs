pub use crate::config::{
    AnimationConfig, AutotileConfig, EngineConfig, LoggingConfig, SelectionConfig,
};
pub use crate::engine::{EngineHandle, RenderTile, TileEngine};
pub use crate::error::{ConfigError, EngineError};
pub use crate::layer::{RefreshReport, TerrainLayer};

pub use wangtile_animation::{AnimationClock, AnimationScheduler, AnimationSpec, Frame, PhaseMode};
pub use wangtile_autotile::{
    select, AutotileError, CandidateSet, CellTerrainContext, ColorId, CornerSignature,
    TerrainColor, WangCatalog, WangSet,
};
pub use wangtile_core::{TileId, TileImage, TileRecord, TilesetDescriptor, TilesetError, TilesetRegistry};
