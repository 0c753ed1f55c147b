//! Corner-based wang terrain autotiling
//!
//! This crate decides which tile to draw for a map cell from the terrain at its
//! four corners:
//!
//! - [`terrain`] - the wang corner model: colors, corner signatures, wang sets
//! - [`wang`] - exact-match resolution of a corner context to candidate tiles
//! - [`select`] - probability-weighted choice among equivalent candidates
//!
//! # Example
//!
//! ```rust,ignore
//! use rand::{rngs::SmallRng, SeedableRng};
//! use wangtile_autotile::{select, CandidateCache, CornerSignature, WangCatalog};
//! use wangtile_core::TilesetRegistry;
//!
//! let registry = TilesetRegistry::from_path("assets/tilesets/fields.tsj")?;
//! let catalog = WangCatalog::build(&registry)?;
//!
//! let dirt = catalog.wang_set("DirtPath")?.color_by_name("Dirt").unwrap();
//! let grass = catalog.wang_set("DirtPath")?.color_by_name("Grass").unwrap();
//!
//! // Grass on the right, dirt on the left
//! let context = CornerSignature::new(dirt, grass, grass, dirt);
//!
//! let mut cache = CandidateCache::new();
//! let candidates = cache.resolve(&catalog, "DirtPath", context)?;
//! let tile = select(&candidates, &mut SmallRng::seed_from_u64(0));
//! ```

pub mod select;
pub mod terrain;
pub mod wang;

pub use select::select;
pub use terrain::{
    CellTerrainContext, ColorId, CornerSignature, TerrainColor, WangCatalog, WangEntry, WangSet,
};
pub use wang::{
    coverage_gaps, resolve, Candidate, CandidateCache, CandidateSet, MAX_ENUMERABLE_COLORS,
};

// Re-export wangtile_core
pub use wangtile_core;

use thiserror::Error;
use wangtile_core::{TilesetError, WangSetKind};

/// Errors raised while resolving terrain to tiles
#[derive(Debug, Error)]
pub enum AutotileError {
    #[error("unknown wang set '{0}'")]
    UnknownWangSet(String),
    #[error("wang set '{wang_set}' uses unsupported matching type '{kind}'")]
    UnsupportedWangType { wang_set: String, kind: WangSetKind },
    #[error("no tile in wang set '{wang_set}' matches corners {context}")]
    NoAutotileMatch {
        wang_set: String,
        context: CellTerrainContext,
    },
    #[error("wang set '{wang_set}' has no tile for {} corner combinations", .missing.len())]
    IncompleteCoverage {
        wang_set: String,
        missing: Vec<CornerSignature>,
    },
    #[error(transparent)]
    Tileset(#[from] TilesetError),
}
