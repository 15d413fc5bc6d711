//! Tiled view over a backing image.

use tracing::debug;

use super::cache::{CacheStats, TileCache};
use super::factory::TileFactory;
use super::policy::{Last, ReadPolicy, WritePolicy, WriteThrough};
use crate::domain::{Domain, Point};
use crate::error::TileError;
use crate::raster::Image;

/// Point-wise access to a backing image through a cache of tiles.
///
/// The image is split into the caller-supplied list of sub-domains. Accesses
/// are served by the resident tiles; on a miss, the sub-domain owning the
/// point is loaded and the access is retried. Consecutive accesses within one
/// tile therefore never search the domain list.
///
/// The backing image and the domain list are borrowed for the lifetime of the
/// tiled image. Sub-domains should cover the backing domain without overlap;
/// when they overlap, each point is read and written only through the first
/// matching sub-domain in list order, even if a later one is also resident.
///
/// # Type Parameters
///
/// * `I` - The backing image type
/// * `R` - Read policy, [`Last`] by default
/// * `W` - Write policy, [`WriteThrough`] by default
///
/// # Example
///
/// ```
/// use tiled_image::domain::{regular_partition, Domain, Point};
/// use tiled_image::raster::{Image, ImageContainer};
/// use tiled_image::tile::TiledImage;
///
/// let domain = Domain::new(Point::new([0, 0]), Point::new([9, 9]));
/// let mut backing = ImageContainer::<u8, 2>::new(domain).unwrap();
/// let tiles = regular_partition(&domain, [5, 5]);
///
/// let mut tiled = TiledImage::new(&mut backing, &tiles);
/// tiled.set(&Point::new([2, 2]), 7).unwrap();
/// tiled.set(&Point::new([7, 7]), 3).unwrap();
/// assert_eq!(tiled.get(&Point::new([2, 2])).unwrap(), 7);
/// drop(tiled);
///
/// assert_eq!(backing.get(&Point::new([7, 7])), 3);
/// ```
pub struct TiledImage<
    'a,
    I,
    const N: usize,
    R = Last<<I as Image<N>>::Value, N>,
    W = WriteThrough,
> where
    I: Image<N>,
    R: ReadPolicy<I::Value, N>,
    W: WritePolicy,
{
    /// Sub-domains, searched in order
    domains: &'a [Domain<N>],

    /// Tile cache, owning the factory
    cache: TileCache<'a, I, N, R, W>,
}

impl<'a, I, const N: usize> TiledImage<'a, I, N>
where
    I: Image<N>,
{
    /// Create a tiled image keeping one tile resident and writing through.
    ///
    /// # Arguments
    ///
    /// * `image` - Backing image
    /// * `domains` - Sub-domains covering the backing domain
    pub fn new(image: &'a mut I, domains: &'a [Domain<N>]) -> Self {
        Self::with_policies(image, domains, Last::new(), WriteThrough)
    }
}

impl<'a, I, const N: usize, R, W> TiledImage<'a, I, N, R, W>
where
    I: Image<N>,
    R: ReadPolicy<I::Value, N>,
    W: WritePolicy,
{
    /// Create a tiled image with explicit cache policies.
    pub fn with_policies(
        image: &'a mut I,
        domains: &'a [Domain<N>],
        read_policy: R,
        write_policy: W,
    ) -> Self {
        debug!(
            domain = %image.domain(),
            sub_domains = domains.len(),
            capacity = read_policy.capacity(),
            "Creating tiled image"
        );
        let factory = TileFactory::new(image);
        Self {
            domains,
            cache: TileCache::new(factory, read_policy, write_policy),
        }
    }

    /// Whether the backing image is valid.
    pub fn is_valid(&self) -> bool {
        self.cache.factory().is_valid()
    }

    /// Domain of the backing image.
    pub fn domain(&self) -> &Domain<N> {
        self.cache.factory().backing().domain()
    }

    /// Sub-domains the image is split into.
    pub fn sub_domains(&self) -> &'a [Domain<N>] {
        self.domains
    }

    /// First sub-domain containing `point`, if any.
    pub fn try_find_sub_domain(&self, point: &Point<N>) -> Option<&'a Domain<N>> {
        self.domains.iter().find(|domain| domain.is_inside(point))
    }

    fn owner_index(&self, point: &Point<N>) -> usize {
        debug_assert!(
            self.domain().is_inside(point),
            "point {} is outside image domain {}",
            point,
            self.domain()
        );

        match self.domains.iter().position(|domain| domain.is_inside(point)) {
            Some(index) => index,
            None => panic!(
                "point {} is not covered by any of the {} sub-domains",
                point,
                self.domains.len()
            ),
        }
    }

    /// First sub-domain containing `point`.
    ///
    /// # Panics
    ///
    /// Panics if no sub-domain contains the point: the sub-domains are
    /// required to cover the backing domain. Debug builds also panic if the
    /// point is outside the backing domain.
    pub fn find_sub_domain(&self, point: &Point<N>) -> &'a Domain<N> {
        &self.domains[self.owner_index(point)]
    }

    /// Load the sub-domain owning `point`.
    ///
    /// Earlier sub-domains overlapping it are passed along as shadows, so the
    /// new tile never serves or writes back a point owned by another one.
    fn load_owner(&mut self, point: &Point<N>) -> Result<&'a Domain<N>, TileError> {
        let index = self.owner_index(point);
        let domains = self.domains;
        let domain = &domains[index];
        let shadows = domains[..index]
            .iter()
            .filter(|earlier| earlier.intersects(domain))
            .copied()
            .collect();

        self.cache.update_shadowed(domain, shadows)?;
        Ok(domain)
    }

    /// Value at `point`.
    ///
    /// The point must lie inside the backing domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the tile owning the point cannot be loaded, or if
    /// the evicted tile cannot be flushed.
    pub fn get(&mut self, point: &Point<N>) -> Result<I::Value, TileError> {
        if let Some(value) = self.cache.read(point) {
            return Ok(value);
        }

        let domain = self.load_owner(point)?;

        match self.cache.read(point) {
            Some(value) => Ok(value),
            None => unreachable!("point {} missing from loaded tile {}", point, domain),
        }
    }

    /// Overwrite the value at `point`.
    ///
    /// The point must lie inside the backing domain. Whether the backing image
    /// sees the value immediately depends on the write policy.
    ///
    /// # Errors
    ///
    /// Same as [`TiledImage::get`].
    pub fn set(&mut self, point: &Point<N>, value: I::Value) -> Result<(), TileError> {
        if self.cache.write(point, value)? {
            return Ok(());
        }

        let domain = self.load_owner(point)?;

        if self.cache.write(point, value)? {
            Ok(())
        } else {
            unreachable!("point {} missing from loaded tile {}", point, domain)
        }
    }

    /// Write deferred modifications back to the backing image.
    pub fn flush(&mut self) -> Result<(), TileError> {
        self.cache.flush()
    }

    /// Flush and drop every resident tile, resetting the statistics.
    pub fn clear_cache(&mut self) -> Result<(), TileError> {
        self.cache.clear()
    }

    /// Domains of the resident tiles.
    pub fn resident_domains(&self) -> Vec<Domain<N>> {
        self.cache.resident_domains()
    }

    /// Cache usage counters.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Read access to the backing image, bypassing the cache.
    ///
    /// Under a deferred write policy, call [`TiledImage::flush`] first to
    /// observe every write.
    pub fn backing(&self) -> &I {
        self.cache.factory().backing()
    }
}

// =============================================================================
// Tests
// =============================================================================
