//! Tiled image layer.
//!
//! This module provides point-wise access to a large backing image through a
//! small number of materialized tiles.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               TiledImage                │
//! │   get/set → probe cache → on miss:      │
//! │   find sub-domain → update → retry      │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               TileCache                 │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  ReadPolicy  │  │  WritePolicy    │  │
//! │  │  (resident   │  │  (through /     │  │
//! │  │   tiles)     │  │   back)         │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │    TileFactory  →  backing image        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TiledImage`]: Entry point, maps points to sub-domains and drives the cache
//! - [`TileCache`]: Holds resident tiles and applies the cache policies
//! - [`TileFactory`]: Copies tiles out of the backing image and flushes them back
//! - [`Last`], [`Fifo`], [`Lru`]: Read policies
//! - [`WriteThrough`], [`WriteBack`]: Write policies
//! - [`CacheStats`]: Hit, miss, load and flush counters
//!
//! # Example
//!
//! ```
//! use tiled_image::domain::{regular_partition, Domain, Point};
//! use tiled_image::raster::{Image, ImageContainer};
//! use tiled_image::tile::{Lru, TiledImage, WriteBack};
//!
//! let domain = Domain::new(Point::new([0, 0]), Point::new([63, 63]));
//! let mut backing = ImageContainer::<u8, 2>::new(domain).unwrap();
//! let tiles = regular_partition(&domain, [16, 16]);
//!
//! let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Lru::new(4), WriteBack);
//! for point in domain.points() {
//!     let value = tiled.get(&point).unwrap();
//!     tiled.set(&point, value.wrapping_add(1)).unwrap();
//! }
//! tiled.flush().unwrap();
//!
//! assert_eq!(tiled.stats().loads, 16);
//! assert_eq!(tiled.backing().get(&Point::new([40, 40])), 1);
//! ```

mod cache;
mod factory;
mod policy;
mod tiled;

pub use cache::{CacheStats, TileCache};
pub use factory::TileFactory;
pub use policy::{
    CachedTile, Fifo, Flush, Last, Lru, ReadPolicy, WriteBack, WritePolicy, WriteThrough,
};
pub use tiled::TiledImage;
