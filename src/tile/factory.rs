//! Tile factory: materializes tiles from a backing image and writes them back.

use tracing::trace;

use crate::domain::{Domain, Point};
use crate::error::TileError;
use crate::raster::{Image, ImageContainer};

/// Creates in-memory tiles from a borrowed backing image.
///
/// The factory keeps no state of its own besides the borrow: every call to
/// [`TileFactory::request_tile`] copies the requested region afresh.
pub struct TileFactory<'a, I, const N: usize> {
    /// Backing image, owned by the caller
    image: &'a mut I,
}

impl<'a, I, const N: usize> TileFactory<'a, I, N>
where
    I: Image<N>,
{
    /// Create a factory over `image`.
    pub fn new(image: &'a mut I) -> Self {
        Self { image }
    }

    /// Read access to the backing image.
    pub fn backing(&self) -> &I {
        &*self.image
    }

    /// Whether the backing image is valid.
    pub fn is_valid(&self) -> bool {
        self.image.is_valid()
    }

    /// Copy the values of the backing image over `domain` into a new tile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing image is invalid, if `domain` is not
    /// a sub-region of the backing domain, or if the tile cannot be allocated.
    pub fn request_tile(
        &self,
        domain: &Domain<N>,
    ) -> Result<ImageContainer<I::Value, N>, TileError> {
        self.check_domain(domain)?;

        let image = &*self.image;
        ImageContainer::from_fn(*domain, |p| image.get(p))
    }

    /// Write every value of `tile` back into the backing image over `domain`.
    ///
    /// # Errors
    ///
    /// Returns an error if `tile` does not cover exactly `domain`, or if
    /// `domain` is not a sub-region of the backing domain.
    pub fn flush_tile(
        &mut self,
        domain: &Domain<N>,
        tile: &ImageContainer<I::Value, N>,
    ) -> Result<(), TileError> {
        self.flush_tile_except(domain, tile, &[])
    }

    /// Like [`TileFactory::flush_tile`], but leaves points inside any of
    /// `skipped` untouched in the backing image.
    pub fn flush_tile_except(
        &mut self,
        domain: &Domain<N>,
        tile: &ImageContainer<I::Value, N>,
        skipped: &[Domain<N>],
    ) -> Result<(), TileError> {
        if tile.domain() != domain {
            return Err(TileError::TileDomainMismatch {
                tile: tile.domain().to_string(),
                domain: domain.to_string(),
            });
        }
        self.check_domain(domain)?;

        for (point, value) in domain.points().zip(tile.as_slice()) {
            if !skipped.iter().any(|d| d.is_inside(&point)) {
                self.image.set(&point, *value);
            }
        }
        Ok(())
    }

    /// Write a single value into the backing image.
    pub fn flush_point(&mut self, point: &Point<N>, value: I::Value) {
        trace!(point = %point, "Flushing point to backing image");
        self.image.set(point, value);
    }

    fn check_domain(&self, domain: &Domain<N>) -> Result<(), TileError> {
        if !self.image.is_valid() {
            return Err(TileError::InvalidImage);
        }
        if !self.image.domain().contains_domain(domain) {
            return Err(TileError::DomainOutsideImage {
                domain: domain.to_string(),
                image: self.image.domain().to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
