//! Policy-driven cache of materialized tiles.
//!
//! The cache only answers for points inside a resident tile. Any other access
//! is a miss, reported as `None` / `Ok(false)` without side effects; the
//! caller resolves it with [`TileCache::update`] and retries.
//!
//! # Update Protocol
//!
//! `update(domain)` is a no-op when `domain` is already resident. Otherwise:
//!
//! 1. The new tile is requested from the factory. A failure leaves the cache
//!    untouched.
//! 2. If the read policy is at capacity, its victim is flushed according to
//!    the write policy and dropped. A failed flush puts the victim back in
//!    its place and discards the new tile.
//! 3. The new tile becomes resident.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::factory::TileFactory;
use super::policy::{CachedTile, Flush, ReadPolicy, WritePolicy};
use crate::domain::{Domain, Point};
use crate::error::TileError;
use crate::raster::Image;

// =============================================================================
// Statistics
// =============================================================================

/// Counters describing how the cache was used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads answered by a resident tile
    pub read_hits: u64,
    /// Reads outside every resident tile
    pub read_misses: u64,
    /// Writes applied to a resident tile
    pub write_hits: u64,
    /// Writes outside every resident tile
    pub write_misses: u64,
    /// Tiles materialized by the factory and made resident
    pub loads: u64,
    /// Tiles removed to make room for another
    pub evictions: u64,
    /// Whole tiles written back to the backing image
    pub tile_flushes: u64,
    /// Single points written through to the backing image
    pub point_flushes: u64,
}

impl CacheStats {
    /// Fraction of reads answered without an update, or `None` before any read.
    pub fn read_hit_ratio(&self) -> Option<f64> {
        let reads = self.read_hits + self.read_misses;
        if reads == 0 {
            None
        } else {
            Some(self.read_hits as f64 / reads as f64)
        }
    }

    fn record(&mut self, flush: Flush) {
        match flush {
            Flush::Skipped => {}
            Flush::Point => self.point_flushes += 1,
            Flush::Tile => self.tile_flushes += 1,
        }
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

/// Cache of tiles materialized from a backing image.
///
/// # Type Parameters
///
/// * `I` - The backing image type
/// * `R` - Read policy, owning the resident tiles
/// * `W` - Write policy, synchronizing writes with the backing image
///
/// # Example
///
/// ```
/// use tiled_image::domain::{Domain, Point};
/// use tiled_image::raster::ImageContainer;
/// use tiled_image::tile::{Last, TileCache, TileFactory, WriteThrough};
///
/// let domain = Domain::new(Point::new([0, 0]), Point::new([9, 9]));
/// let mut backing = ImageContainer::from_fn(domain, |p| p[0] as u8).unwrap();
///
/// let mut cache = TileCache::new(TileFactory::new(&mut backing), Last::new(), WriteThrough);
/// let point = Point::new([7, 2]);
///
/// assert_eq!(cache.read(&point), None);
///
/// let tile = Domain::new(Point::new([5, 0]), Point::new([9, 4]));
/// cache.update(&tile).unwrap();
/// assert_eq!(cache.read(&point), Some(7));
/// ```
pub struct TileCache<'a, I, const N: usize, R, W>
where
    I: Image<N>,
    R: ReadPolicy<I::Value, N>,
    W: WritePolicy,
{
    factory: TileFactory<'a, I, N>,
    read_policy: R,
    write_policy: W,
    stats: CacheStats,
}

impl<'a, I, const N: usize, R, W> TileCache<'a, I, N, R, W>
where
    I: Image<N>,
    R: ReadPolicy<I::Value, N>,
    W: WritePolicy,
{
    /// Create an empty cache.
    pub fn new(factory: TileFactory<'a, I, N>, read_policy: R, write_policy: W) -> Self {
        Self {
            factory,
            read_policy,
            write_policy,
            stats: CacheStats::default(),
        }
    }

    /// Read the value at `point` from a resident tile.
    ///
    /// Returns `None` if no resident tile contains the point.
    pub fn read(&mut self, point: &Point<N>) -> Option<I::Value> {
        match self.read_policy.find(point) {
            Some(tile) => {
                self.stats.read_hits += 1;
                Some(tile.get(point))
            }
            None => {
                self.stats.read_misses += 1;
                None
            }
        }
    }

    /// Write `value` at `point` into a resident tile.
    ///
    /// Returns `Ok(false)` without any effect if no resident tile contains the
    /// point. On a hit, the write policy decides whether the backing image is
    /// updated now or later.
    pub fn write(&mut self, point: &Point<N>, value: I::Value) -> Result<bool, TileError> {
        let Some(tile) = self.read_policy.find(point) else {
            self.stats.write_misses += 1;
            return Ok(false);
        };

        tile.set(point, value);
        let flush = self
            .write_policy
            .on_write(&mut self.factory, tile, point, value)?;

        self.stats.write_hits += 1;
        self.stats.record(flush);
        Ok(true)
    }

    /// Make `domain` resident, evicting a tile if the read policy is full.
    ///
    /// After a successful update, reads and writes of points inside `domain`
    /// hit the cache.
    pub fn update(&mut self, domain: &Domain<N>) -> Result<(), TileError> {
        self.update_shadowed(domain, Vec::new())
    }

    /// Make `domain` resident as a tile that leaves the points inside
    /// `shadows` to other tiles.
    ///
    /// Used when sub-domains overlap: `shadows` are the domains that take
    /// precedence over `domain` wherever they intersect it.
    pub fn update_shadowed(
        &mut self,
        domain: &Domain<N>,
        shadows: Vec<Domain<N>>,
    ) -> Result<(), TileError> {
        if self.read_policy.contains(domain) {
            debug!(domain = %domain, "Tile already resident");
            return Ok(());
        }

        let tile = CachedTile::shadowed(self.factory.request_tile(domain)?, shadows);

        if let Some(mut victim) = self.read_policy.evict() {
            match self.write_policy.on_flush(&mut self.factory, &mut victim) {
                Ok(flush) => {
                    let flushed = flush == Flush::Tile;
                    debug!(evicted = %victim.domain(), flushed, "Evicted tile");
                    self.stats.evictions += 1;
                    self.stats.record(flush);
                }
                Err(err) => {
                    warn!(victim = %victim.domain(), error = %err, "Failed to flush evicted tile");
                    self.read_policy.restore(victim);
                    return Err(err);
                }
            }
        }

        self.read_policy.insert(tile);
        self.stats.loads += 1;
        debug!(domain = %domain, resident = self.read_policy.len(), "Loaded tile");
        Ok(())
    }

    /// Write every modified resident tile back to the backing image.
    ///
    /// This is a no-op for write policies that never defer writes.
    pub fn flush(&mut self) -> Result<(), TileError> {
        for tile in self.read_policy.tiles_mut() {
            let flush = self.write_policy.on_flush(&mut self.factory, tile)?;
            self.stats.record(flush);
        }
        Ok(())
    }

    /// Flush, then drop every resident tile and reset the statistics.
    pub fn clear(&mut self) -> Result<(), TileError> {
        self.flush()?;
        let dropped = self.read_policy.drain();
        debug!(tiles = dropped.len(), "Cleared tile cache");
        self.stats = CacheStats::default();
        Ok(())
    }

    /// Domains of the resident tiles.
    pub fn resident_domains(&self) -> Vec<Domain<N>> {
        self.read_policy.domains()
    }

    /// Number of resident tiles.
    pub fn len(&self) -> usize {
        self.read_policy.len()
    }

    /// Check if no tile is resident.
    pub fn is_empty(&self) -> bool {
        self.read_policy.is_empty()
    }

    /// Maximum number of resident tiles.
    pub fn capacity(&self) -> usize {
        self.read_policy.capacity()
    }

    /// Usage counters since creation or the last [`TileCache::clear`].
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// The factory used to load and flush tiles.
    pub fn factory(&self) -> &TileFactory<'a, I, N> {
        &self.factory
    }
}

impl<'a, I, const N: usize, R, W> Drop for TileCache<'a, I, N, R, W>
where
    I: Image<N>,
    R: ReadPolicy<I::Value, N>,
    W: WritePolicy,
{
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(error = %err, "Failed to flush resident tiles on drop");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
