//! # Tiled Image
//!
//! Point-wise access to a large image through a bounded cache of tiles.
//!
//! A backing image is split into an ordered list of rectangular sub-domains.
//! Each sub-domain is copied into an in-memory tile on first access, served
//! from the cache while accesses stay inside it, and written back to the
//! backing image according to the write policy.
//!
//! ## Features
//!
//! - **Lazy materialization**: tiles are copied out of the backing image only when touched
//! - **Pluggable read policies**: keep the last tile, or several tiles with FIFO or LRU eviction
//! - **Pluggable write policies**: write-through, or write-back with dirty tracking
//! - **N-dimensional**: points and domains are generic over their dimension
//! - **Image interop**: grayscale conversion and JPEG loading via the `image` crate
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`domain`] - Points, rectangular domains and regular partitions
//! - [`raster`] - The [`Image`] trait and the dense [`ImageContainer`]
//! - [`tile`] - Tile factory, tile cache, policies and [`TiledImage`]
//! - [`access`] - Access patterns for sweeping a tiled image
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use tiled_image::{regular_partition, Domain, Image, ImageContainer, Point, TiledImage};
//!
//! let domain = Domain::new(Point::new([0, 0]), Point::new([9, 9]));
//! let mut backing = ImageContainer::<u8, 2>::new(domain).unwrap();
//! let quadrants = regular_partition(&domain, [5, 5]);
//!
//! let mut tiled = TiledImage::new(&mut backing, &quadrants);
//! tiled.set(&Point::new([2, 2]), 7).unwrap();
//! tiled.set(&Point::new([7, 7]), 3).unwrap();
//!
//! assert_eq!(tiled.get(&Point::new([2, 2])).unwrap(), 7);
//! assert_eq!(tiled.get(&Point::new([7, 7])).unwrap(), 3);
//! assert_eq!(tiled.backing().get(&Point::new([2, 2])), 7);
//! ```

pub mod access;
pub mod config;
pub mod domain;
pub mod error;
pub mod raster;
pub mod tile;

// Re-export commonly used types
pub use access::{map_points, AccessPattern};
pub use config::{
    CacheArgs, Cli, Command, InvertConfig, OutputFormat, ReadPolicyKind, SimulateConfig,
    WritePolicyKind,
};
pub use domain::{regular_partition, Domain, DomainPoints, Point};
pub use error::TileError;
pub use raster::{load_gray_jpeg, save_gray_jpeg, Image, ImageContainer};
pub use tile::{
    CacheStats, CachedTile, Fifo, Flush, Last, Lru, ReadPolicy, TileCache, TileFactory,
    TiledImage, WriteBack, WritePolicy, WriteThrough,
};
