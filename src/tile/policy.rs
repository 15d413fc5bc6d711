//! Read and write policies for the tile cache.
//!
//! A [`ReadPolicy`] owns the resident tiles and decides which one leaves when
//! a new tile is loaded. A [`WritePolicy`] decides when modified values reach
//! the backing image.
//!
//! | Read policy | Resident tiles | Victim                    |
//! |-------------|----------------|---------------------------|
//! | [`Last`]    | 1              | the resident tile         |
//! | [`Fifo`]    | `capacity`     | oldest loaded tile        |
//! | [`Lru`]     | `capacity`     | least recently used tile  |
//!
//! | Write policy     | On write                | On eviction / flush     |
//! |------------------|-------------------------|-------------------------|
//! | [`WriteThrough`] | update backing point    | nothing                 |
//! | [`WriteBack`]    | mark tile dirty         | write dirty tile back   |
//!
//! Write-back only writes the points a tile owns, so a stale copy of a point
//! held by an overlapping tile never reaches the backing image.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use lru::LruCache;

use super::factory::TileFactory;
use crate::domain::{Domain, Point};
use crate::error::TileError;
use crate::raster::{Image, ImageContainer};

// =============================================================================
// Cached Tile
// =============================================================================

/// A materialized tile held by the cache.
///
/// A tile answers only for the points it owns: those of its domain that lie
/// outside every shadowing domain. Shadows are the sub-domains listed before
/// this one that overlap it, so each point has exactly one owning tile.
#[derive(Debug, Clone)]
pub struct CachedTile<V, const N: usize> {
    image: ImageContainer<V, N>,
    shadows: Vec<Domain<N>>,
    dirty: bool,
}

impl<V: Copy + Default, const N: usize> CachedTile<V, N> {
    /// Wrap a freshly loaded tile.
    pub fn new(image: ImageContainer<V, N>) -> Self {
        Self::shadowed(image, Vec::new())
    }

    /// Wrap a freshly loaded tile whose points inside `shadows` belong to
    /// other tiles.
    pub fn shadowed(image: ImageContainer<V, N>, shadows: Vec<Domain<N>>) -> Self {
        Self {
            image,
            shadows,
            dirty: false,
        }
    }

    /// Domain covered by the tile.
    pub fn domain(&self) -> &Domain<N> {
        self.image.domain()
    }

    /// Tile contents.
    pub fn image(&self) -> &ImageContainer<V, N> {
        &self.image
    }

    /// Domains owning part of this tile's domain.
    pub fn shadows(&self) -> &[Domain<N>] {
        &self.shadows
    }

    /// Whether reads and writes of `point` are served by this tile.
    pub fn owns(&self, point: &Point<N>) -> bool {
        self.domain().is_inside(point) && !self.shadows.iter().any(|d| d.is_inside(point))
    }

    /// Value at `point`, which must lie inside the tile.
    pub fn get(&self, point: &Point<N>) -> V {
        self.image.get(point)
    }

    /// Overwrite the value at `point`, which must lie inside the tile.
    pub fn set(&mut self, point: &Point<N>, value: V) {
        self.image.set(point, value);
    }

    /// Whether the tile holds values not yet written to the backing image.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record a write that the backing image has not seen yet.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Record that the backing image matches the owned points.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

// =============================================================================
// Read Policies
// =============================================================================

/// Storage and eviction strategy for resident tiles.
pub trait ReadPolicy<V, const N: usize> {
    /// Maximum number of resident tiles.
    fn capacity(&self) -> usize;

    /// Number of resident tiles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resident tile owning `point`, if any. Counts as a use of the tile.
    fn find(&mut self, point: &Point<N>) -> Option<&mut CachedTile<V, N>>;

    /// Whether a tile for exactly `domain` is resident. Counts as a use of the tile.
    fn contains(&mut self, domain: &Domain<N>) -> bool;

    /// Remove and return the next victim if the policy is at capacity.
    fn evict(&mut self) -> Option<CachedTile<V, N>>;

    /// Make `tile` resident. The caller makes room with [`ReadPolicy::evict`] first.
    fn insert(&mut self, tile: CachedTile<V, N>);

    /// Put back a tile returned by [`ReadPolicy::evict`], so that it is the
    /// next victim again.
    fn restore(&mut self, tile: CachedTile<V, N>) {
        self.insert(tile);
    }

    /// Mutable access to every resident tile.
    fn tiles_mut(&mut self) -> Vec<&mut CachedTile<V, N>>;

    /// Domains of the resident tiles.
    fn domains(&self) -> Vec<Domain<N>>;

    /// Remove and return every resident tile.
    fn drain(&mut self) -> Vec<CachedTile<V, N>>;
}

/// Keep only the last loaded tile.
#[derive(Debug, Clone)]
pub struct Last<V, const N: usize> {
    tile: Option<CachedTile<V, N>>,
}

impl<V, const N: usize> Last<V, N> {
    /// Create an empty policy.
    pub fn new() -> Self {
        Self { tile: None }
    }
}

impl<V, const N: usize> Default for Last<V, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Copy + Default, const N: usize> ReadPolicy<V, N> for Last<V, N> {
    fn capacity(&self) -> usize {
        1
    }

    fn len(&self) -> usize {
        usize::from(self.tile.is_some())
    }

    fn find(&mut self, point: &Point<N>) -> Option<&mut CachedTile<V, N>> {
        self.tile
            .as_mut()
            .filter(|tile| tile.owns(point))
    }

    fn contains(&mut self, domain: &Domain<N>) -> bool {
        self.tile
            .as_ref()
            .is_some_and(|tile| tile.domain() == domain)
    }

    fn evict(&mut self) -> Option<CachedTile<V, N>> {
        self.tile.take()
    }

    fn insert(&mut self, tile: CachedTile<V, N>) {
        self.tile = Some(tile);
    }

    fn tiles_mut(&mut self) -> Vec<&mut CachedTile<V, N>> {
        self.tile.iter_mut().collect()
    }

    fn domains(&self) -> Vec<Domain<N>> {
        self.tile.iter().map(|tile| *tile.domain()).collect()
    }

    fn drain(&mut self) -> Vec<CachedTile<V, N>> {
        self.tile.take().into_iter().collect()
    }
}

/// Keep up to `capacity` tiles and evict the one loaded first.
#[derive(Debug, Clone)]
pub struct Fifo<V, const N: usize> {
    capacity: usize,
    tiles: VecDeque<CachedTile<V, N>>,
}

impl<V, const N: usize> Fifo<V, N> {
    /// Create a FIFO policy. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            tiles: VecDeque::with_capacity(capacity),
        }
    }
}

impl<V: Copy + Default, const N: usize> ReadPolicy<V, N> for Fifo<V, N> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.tiles.len()
    }

    fn find(&mut self, point: &Point<N>) -> Option<&mut CachedTile<V, N>> {
        self.tiles
            .iter_mut()
            .find(|tile| tile.owns(point))
    }

    fn contains(&mut self, domain: &Domain<N>) -> bool {
        self.tiles.iter().any(|tile| tile.domain() == domain)
    }

    fn evict(&mut self) -> Option<CachedTile<V, N>> {
        if self.tiles.len() >= self.capacity {
            self.tiles.pop_front()
        } else {
            None
        }
    }

    fn insert(&mut self, tile: CachedTile<V, N>) {
        self.tiles.push_back(tile);
    }

    fn restore(&mut self, tile: CachedTile<V, N>) {
        self.tiles.push_front(tile);
    }

    fn tiles_mut(&mut self) -> Vec<&mut CachedTile<V, N>> {
        self.tiles.iter_mut().collect()
    }

    fn domains(&self) -> Vec<Domain<N>> {
        self.tiles.iter().map(|tile| *tile.domain()).collect()
    }

    fn drain(&mut self) -> Vec<CachedTile<V, N>> {
        self.tiles.drain(..).collect()
    }
}

/// Keep up to `capacity` tiles and evict the least recently used one.
pub struct Lru<V, const N: usize> {
    tiles: LruCache<Domain<N>, CachedTile<V, N>>,
}

impl<V, const N: usize> Lru<V, N> {
    /// Create an LRU policy. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            tiles: LruCache::new(capacity),
        }
    }
}

impl<V: Copy + Default, const N: usize> ReadPolicy<V, N> for Lru<V, N> {
    fn capacity(&self) -> usize {
        self.tiles.cap().get()
    }

    fn len(&self) -> usize {
        self.tiles.len()
    }

    fn find(&mut self, point: &Point<N>) -> Option<&mut CachedTile<V, N>> {
        let domain = self
            .tiles
            .iter()
            .find(|(_, tile)| tile.owns(point))
            .map(|(domain, _)| *domain)?;
        self.tiles.get_mut(&domain)
    }

    fn contains(&mut self, domain: &Domain<N>) -> bool {
        self.tiles.get(domain).is_some()
    }

    fn evict(&mut self) -> Option<CachedTile<V, N>> {
        if self.tiles.len() >= self.tiles.cap().get() {
            self.tiles.pop_lru().map(|(_, tile)| tile)
        } else {
            None
        }
    }

    fn insert(&mut self, tile: CachedTile<V, N>) {
        self.tiles.put(*tile.domain(), tile);
    }

    fn restore(&mut self, tile: CachedTile<V, N>) {
        let domain = *tile.domain();
        self.tiles.put(domain, tile);
        self.tiles.demote(&domain);
    }

    fn tiles_mut(&mut self) -> Vec<&mut CachedTile<V, N>> {
        self.tiles.iter_mut().map(|(_, tile)| tile).collect()
    }

    /// Most recently used first.
    fn domains(&self) -> Vec<Domain<N>> {
        self.tiles.iter().map(|(domain, _)| *domain).collect()
    }

    fn drain(&mut self) -> Vec<CachedTile<V, N>> {
        let mut drained = Vec::with_capacity(self.tiles.len());
        while let Some((_, tile)) = self.tiles.pop_lru() {
            drained.push(tile);
        }
        drained
    }
}

// =============================================================================
// Write Policies
// =============================================================================

/// What a write policy sent to the backing image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    /// Nothing was written
    Skipped,
    /// A single point was written
    Point,
    /// A whole tile was written
    Tile,
}

/// Synchronization strategy between resident tiles and the backing image.
pub trait WritePolicy {
    /// Called after `value` was written into `tile` at `point`.
    fn on_write<I, const N: usize>(
        &self,
        factory: &mut TileFactory<'_, I, N>,
        tile: &mut CachedTile<I::Value, N>,
        point: &Point<N>,
        value: I::Value,
    ) -> Result<Flush, TileError>
    where
        I: Image<N>;

    /// Called before `tile` is evicted, and on explicit flushes.
    fn on_flush<I, const N: usize>(
        &self,
        factory: &mut TileFactory<'_, I, N>,
        tile: &mut CachedTile<I::Value, N>,
    ) -> Result<Flush, TileError>
    where
        I: Image<N>;
}

/// Propagate every write to the backing image immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteThrough;

impl WritePolicy for WriteThrough {
    fn on_write<I, const N: usize>(
        &self,
        factory: &mut TileFactory<'_, I, N>,
        _tile: &mut CachedTile<I::Value, N>,
        point: &Point<N>,
        value: I::Value,
    ) -> Result<Flush, TileError>
    where
        I: Image<N>,
    {
        factory.flush_point(point, value);
        Ok(Flush::Point)
    }

    fn on_flush<I, const N: usize>(
        &self,
        _factory: &mut TileFactory<'_, I, N>,
        _tile: &mut CachedTile<I::Value, N>,
    ) -> Result<Flush, TileError>
    where
        I: Image<N>,
    {
        Ok(Flush::Skipped)
    }
}

/// Defer writes until the tile is evicted or flushed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteBack;

impl WritePolicy for WriteBack {
    fn on_write<I, const N: usize>(
        &self,
        _factory: &mut TileFactory<'_, I, N>,
        tile: &mut CachedTile<I::Value, N>,
        _point: &Point<N>,
        _value: I::Value,
    ) -> Result<Flush, TileError>
    where
        I: Image<N>,
    {
        tile.mark_dirty();
        Ok(Flush::Skipped)
    }

    fn on_flush<I, const N: usize>(
        &self,
        factory: &mut TileFactory<'_, I, N>,
        tile: &mut CachedTile<I::Value, N>,
    ) -> Result<Flush, TileError>
    where
        I: Image<N>,
    {
        if !tile.is_dirty() {
            return Ok(Flush::Skipped);
        }
        let domain = *tile.domain();
        factory.flush_tile_except(&domain, tile.image(), tile.shadows())?;
        tile.mark_clean();
        Ok(Flush::Tile)
    }
}

// =============================================================================
// Tests
// =============================================================================
