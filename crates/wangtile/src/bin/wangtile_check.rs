//! Load a tileset the way the engine would and report what it contains.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use wangtile::{EngineConfig, EngineError, TileEngine};
use wangtile_autotile::{coverage_gaps, MAX_ENUMERABLE_COLORS};

#[derive(Parser)]
#[command(
    name = "wangtile-check",
    about = "Validate a JSON tileset and report its wang sets and coverage gaps",
    version
)]
struct Cli {
    /// Tileset descriptor (.tsj / .json)
    tileset: PathBuf,

    /// Engine config (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fail when a corner set is missing any color combination
    #[arg(long)]
    require_full_coverage: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };
    if cli.require_full_coverage {
        config.autotile.require_full_coverage = true;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.filter.as_str()),
    )
    .init();

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}: {e}", cli.tileset.display());
            eprintln!("error: {}: {e}", cli.tileset.display());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: EngineConfig) -> Result<(), EngineError> {
    let engine = TileEngine::from_path(&cli.tileset, config)?;
    let registry = engine.registry();
    let (tile_width, tile_height) = registry.tile_size();

    println!(
        "tileset '{}': {} tiles of {}x{}, {} animated",
        registry.name(),
        registry.tile_count(),
        tile_width,
        tile_height,
        registry.animated_tiles().count()
    );

    for (tile_id, animation) in registry.animated_tiles() {
        let frames: Vec<String> = animation.frame_tiles().map(|id| id.to_string()).collect();
        println!(
            "  tile {tile_id}: frames [{}], {} ms cycle",
            frames.join(", "),
            animation.cycle_ms()
        );
    }

    for set in engine.catalog().wang_sets() {
        println!(
            "wang set '{}' ({}): {} colors, {} tiles",
            set.name(),
            set.kind(),
            set.color_count(),
            set.entries().len()
        );
        for color in set.colors() {
            println!(
                "  color {} '{}' {}: {} pure tiles",
                color.id,
                color.name,
                color.color,
                set.pure_tiles(color.id).len()
            );
        }

        match coverage_gaps(set) {
            Some(missing) if missing.is_empty() => println!("  every corner combination covered"),
            Some(missing) => {
                println!("  {} corner combinations without a tile:", missing.len());
                for signature in missing {
                    println!("    {signature}");
                }
            }
            None if set.color_count() > MAX_ENUMERABLE_COLORS => {
                println!("  coverage not checked (more than {MAX_ENUMERABLE_COLORS} colors)")
            }
            None => println!("  coverage not checked ({} matching)", set.kind()),
        }
    }

    Ok(())
}
