//! Configuration management for the `tiled-image` binary.
//!
//! This module provides the CLI definition, supporting:
//! - Command-line arguments via clap
//! - Environment variables with `TILED_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Commands
//!
//! - `simulate` - Sweep a synthetic image through a tiled cache and report statistics
//! - `invert` - Invert a grayscale JPEG pixel by pixel through a tiled cache
//!
//! # Environment Variables
//!
//! - `TILED_READ_POLICY` - Read policy: last, fifo, lru (default: last)
//! - `TILED_CAPACITY` - Resident tiles for fifo/lru (default: 4)
//! - `TILED_WRITE_POLICY` - Write policy: write-through, write-back (default: write-through)
//! - `TILED_TILE_WIDTH` / `TILED_TILE_HEIGHT` - Tile size in pixels (default: 256)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::access::AccessPattern;

// =============================================================================
// Default Values
// =============================================================================

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: usize = 256;

/// Default number of resident tiles for multi-tile read policies.
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

/// Default synthetic image edge length in pixels.
pub const DEFAULT_IMAGE_SIZE: usize = 1024;

/// Default JPEG output quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Largest accepted image edge length.
const MAX_IMAGE_SIZE: usize = 1 << 16;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tiled Image - point-wise image access through a cache of tiles.
#[derive(Parser, Debug, Clone)]
#[command(name = "tiled-image")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Extract the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sweep a synthetic image through the tile cache and report statistics.
    Simulate(SimulateConfig),

    /// Invert a grayscale JPEG through the tile cache.
    Invert(InvertConfig),
}

/// Read policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReadPolicyKind {
    /// Keep only the last loaded tile
    #[default]
    Last,
    /// Keep `capacity` tiles, evict the oldest
    Fifo,
    /// Keep `capacity` tiles, evict the least recently used
    Lru,
}

/// Write policy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WritePolicyKind {
    /// Write every value to the backing image immediately
    #[default]
    WriteThrough,
    /// Write modified tiles back on eviction
    WriteBack,
}

/// Statistics output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable
    #[default]
    Text,
    /// JSON object
    Json,
}

/// Cache and tiling options shared by all commands.
#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    /// Tile width in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "TILED_TILE_WIDTH")]
    pub tile_width: usize,

    /// Tile height in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "TILED_TILE_HEIGHT")]
    pub tile_height: usize,

    /// Read policy deciding which tiles stay resident.
    #[arg(long, value_enum, default_value_t = ReadPolicyKind::Last, env = "TILED_READ_POLICY")]
    pub read_policy: ReadPolicyKind,

    /// Number of resident tiles for the fifo and lru policies.
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY, env = "TILED_CAPACITY")]
    pub capacity: usize,

    /// Write policy deciding when the backing image is updated.
    #[arg(
        long,
        value_enum,
        default_value_t = WritePolicyKind::WriteThrough,
        env = "TILED_WRITE_POLICY"
    )]
    pub write_policy: WritePolicyKind,

    /// Order in which pixels are visited.
    #[arg(long, value_enum, default_value_t = AccessPattern::RowMajor)]
    pub pattern: AccessPattern,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CacheArgs {
    /// Validate the cache options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err("tile_width and tile_height must be greater than 0".to_string());
        }
        if self.read_policy != ReadPolicyKind::Last && self.capacity == 0 {
            return Err("capacity must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Tile extent as `[width, height]`.
    pub fn tile_extent(&self) -> [usize; 2] {
        [self.tile_width, self.tile_height]
    }
}

/// Options for the `simulate` command.
#[derive(Args, Debug, Clone)]
pub struct SimulateConfig {
    /// Width of the synthetic image in pixels.
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE)]
    pub width: usize,

    /// Height of the synthetic image in pixels.
    #[arg(long, default_value_t = DEFAULT_IMAGE_SIZE)]
    pub height: usize,

    /// Output format for the statistics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub cache: CacheArgs,
}

impl SimulateConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }
        if self.width > MAX_IMAGE_SIZE || self.height > MAX_IMAGE_SIZE {
            return Err(format!(
                "width and height must not exceed {}",
                MAX_IMAGE_SIZE
            ));
        }
        self.cache.validate()
    }
}

/// Options for the `invert` command.
#[derive(Args, Debug, Clone)]
pub struct InvertConfig {
    /// Input image (any format the decoder recognizes, typically JPEG).
    pub input: PathBuf,

    /// Output JPEG path.
    pub output: PathBuf,

    /// JPEG quality for the output (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    pub quality: u8,

    /// Output format for the statistics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub cache: CacheArgs,
}

impl InvertConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.quality == 0 || self.quality > 100 {
            return Err("quality must be between 1 and 100".to_string());
        }
        if self.input == self.output {
            return Err("input and output must be different files".to_string());
        }
        self.cache.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
