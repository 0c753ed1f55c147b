//! Wang corner autotiling for 2D tile maps
//!
//! Loads a tileset once, then answers "which tile image goes in this cell right
//! now" from the terrain at the cell's corners, the tiles' selection weights
//! and their animations.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wangtile::prelude::*;
//!
//! let engine = TileEngine::from_path("assets/tilesets/fields.tsj", EngineConfig::default())?;
//!
//! let grass = ColorId(2);
//! let mut layer = TerrainLayer::new("DirtPath", 16, 16, grass);
//! layer.set_cell_terrain(4, 4, ColorId(1))?;
//! layer.refresh(&engine)?;
//!
//! let drawn = layer.render_tile(&engine, 4, 4, Duration::from_millis(250))?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod layer;
pub mod prelude;

pub use config::EngineConfig;
pub use engine::{EngineHandle, RenderTile, TileEngine};
pub use error::{ConfigError, EngineError};
pub use layer::{RefreshReport, TerrainLayer};

pub use wangtile_animation;
pub use wangtile_autotile;
pub use wangtile_core;
