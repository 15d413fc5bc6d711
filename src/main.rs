//! Tiled Image - command-line driver for the tiled image cache.
//!
//! This binary parses the configuration, picks the cache policies and runs the
//! requested command.

use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiled_image::{
    config::{CacheArgs, Cli, Command, InvertConfig, OutputFormat, SimulateConfig},
    load_gray_jpeg, map_points, regular_partition, save_gray_jpeg, CacheStats, Domain, Fifo,
    Image, ImageContainer, Last, Lru, Point, ReadPolicy, ReadPolicyKind, TileError, TiledImage,
    WriteBack, WritePolicy, WritePolicyKind, WriteThrough,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Simulate(config) => run_simulate(config),
        Command::Invert(config) => run_invert(config),
    }
}

// =============================================================================
// Simulate Command
// =============================================================================

fn run_simulate(config: SimulateConfig) -> ExitCode {
    init_logging(config.cache.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let domain = Domain::new(
        Point::new([0, 0]),
        Point::new([config.width as i64 - 1, config.height as i64 - 1]),
    );
    let mut image = match ImageContainer::from_fn(domain, synthetic_value) {
        Ok(image) => image,
        Err(e) => {
            error!("Failed to allocate {}x{} image: {}", config.width, config.height, e);
            return ExitCode::FAILURE;
        }
    };
    let tiles = regular_partition(&domain, config.cache.tile_extent());

    info!(
        "Simulating {}x{} image, {} tiles, {:?}/{:?}, {:?} access",
        config.width,
        config.height,
        tiles.len(),
        config.cache.read_policy,
        config.cache.write_policy,
        config.cache.pattern
    );

    let started = Instant::now();
    let stats = match run_with_policies(&mut image, &tiles, &config.cache, |v| v.wrapping_add(1)) {
        Ok(stats) => stats,
        Err(e) => {
            error!("Simulation failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let elapsed = started.elapsed();

    let mismatches = domain
        .points()
        .filter(|p| image.get(p) != synthetic_value(p).wrapping_add(1))
        .count();
    if mismatches > 0 {
        error!("Backing image has {} unexpected values", mismatches);
        return ExitCode::FAILURE;
    }

    info!("Completed in {:.2?}, backing image verified", elapsed);
    print_stats(&stats, config.format)
}

/// Deterministic pixel pattern for the synthetic image.
fn synthetic_value(point: &Point<2>) -> u8 {
    (point[0].wrapping_mul(31) ^ point[1].wrapping_mul(17)) as u8
}

// =============================================================================
// Invert Command
// =============================================================================

fn run_invert(config: InvertConfig) -> ExitCode {
    init_logging(config.cache.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut image = match load_gray_jpeg(&config.input) {
        Ok(image) => image,
        Err(e) => {
            error!("Failed to load {}: {}", config.input.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let domain = *image.domain();
    let tiles = regular_partition(&domain, config.cache.tile_extent());

    info!(
        "Inverting {} ({}), {} tiles",
        config.input.display(),
        domain,
        tiles.len()
    );

    let stats = match run_with_policies(&mut image, &tiles, &config.cache, |v| 255 - v) {
        Ok(stats) => stats,
        Err(e) => {
            error!("Inversion failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = save_gray_jpeg(&image, &config.output, config.quality) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!("Wrote {}", config.output.display());
    print_stats(&stats, config.format)
}

// =============================================================================
// Policy Dispatch
// =============================================================================

/// Run `f` over every pixel with the policies selected in `cache`.
fn run_with_policies<F>(
    image: &mut ImageContainer<u8, 2>,
    tiles: &[Domain<2>],
    cache: &CacheArgs,
    f: F,
) -> Result<CacheStats, TileError>
where
    F: FnMut(u8) -> u8,
{
    match cache.read_policy {
        ReadPolicyKind::Last => with_write_policy(image, tiles, cache, Last::new(), f),
        ReadPolicyKind::Fifo => {
            with_write_policy(image, tiles, cache, Fifo::new(cache.capacity), f)
        }
        ReadPolicyKind::Lru => {
            with_write_policy(image, tiles, cache, Lru::new(cache.capacity), f)
        }
    }
}

fn with_write_policy<R, F>(
    image: &mut ImageContainer<u8, 2>,
    tiles: &[Domain<2>],
    cache: &CacheArgs,
    read_policy: R,
    f: F,
) -> Result<CacheStats, TileError>
where
    R: ReadPolicy<u8, 2>,
    F: FnMut(u8) -> u8,
{
    match cache.write_policy {
        WritePolicyKind::WriteThrough => sweep(image, tiles, cache, read_policy, WriteThrough, f),
        WritePolicyKind::WriteBack => sweep(image, tiles, cache, read_policy, WriteBack, f),
    }
}

fn sweep<R, W, F>(
    image: &mut ImageContainer<u8, 2>,
    tiles: &[Domain<2>],
    cache: &CacheArgs,
    read_policy: R,
    write_policy: W,
    f: F,
) -> Result<CacheStats, TileError>
where
    R: ReadPolicy<u8, 2>,
    W: WritePolicy,
    F: FnMut(u8) -> u8,
{
    let mut tiled = TiledImage::with_policies(image, tiles, read_policy, write_policy);
    let order = cache.pattern.points(tiled.domain(), tiles);
    map_points(&mut tiled, order, f)?;
    Ok(tiled.stats())
}

// =============================================================================
// Output
// =============================================================================

fn print_stats(stats: &CacheStats, format: OutputFormat) -> ExitCode {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(stats) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize statistics: {}", e);
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Text => {
            println!("Reads:      {} hits, {} misses", stats.read_hits, stats.read_misses);
            println!("Writes:     {} hits, {} misses", stats.write_hits, stats.write_misses);
            println!("Loads:      {}", stats.loads);
            println!("Evictions:  {}", stats.evictions);
            println!(
                "Flushes:    {} tiles, {} points",
                stats.tile_flushes, stats.point_flushes
            );
            if let Some(ratio) = stats.read_hit_ratio() {
                println!("Hit ratio:  {:.4}", ratio);
            }
        }
    }
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tiled_image=debug"
    } else {
        "tiled_image=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
