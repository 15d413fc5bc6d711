//! In-memory images over integer domains.
//!
//! [`Image`] is the contract a backing image must fulfil to be tiled, and
//! [`ImageContainer`] is the dense, `Vec`-backed implementation used both for
//! materialized tiles and as a general purpose backing image.

mod codec;

pub use codec::{load_gray_jpeg, save_gray_jpeg};

use crate::domain::{Domain, Point};
use crate::error::TileError;

// =============================================================================
// Image Trait
// =============================================================================

/// A mapping from the points of a rectangular domain to values.
///
/// Point-wise access outside [`Image::domain`] is a caller bug; implementations
/// are allowed to panic.
pub trait Image<const N: usize> {
    /// Pixel / sample type.
    type Value: Copy + Default;

    /// Domain the image is defined on.
    fn domain(&self) -> &Domain<N>;

    /// Whether the image is in a usable state.
    fn is_valid(&self) -> bool {
        true
    }

    /// Value at `point`.
    fn get(&self, point: &Point<N>) -> Self::Value;

    /// Overwrite the value at `point`.
    fn set(&mut self, point: &Point<N>, value: Self::Value);
}

// =============================================================================
// Image Container
// =============================================================================

/// Dense image storing one value per domain point.
///
/// # Example
///
/// ```
/// use tiled_image::domain::{Domain, Point};
/// use tiled_image::raster::{Image, ImageContainer};
///
/// let domain = Domain::new(Point::new([0, 0]), Point::new([3, 3]));
/// let mut image = ImageContainer::<u8, 2>::new(domain).unwrap();
///
/// image.set(&Point::new([1, 2]), 42);
/// assert_eq!(image.get(&Point::new([1, 2])), 42);
/// assert_eq!(image.get(&Point::new([0, 0])), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ImageContainer<V, const N: usize> {
    domain: Domain<N>,
    data: Vec<V>,
}

impl<V: Copy + Default, const N: usize> ImageContainer<V, N> {
    /// Create an image filled with `V::default()`.
    pub fn new(domain: Domain<N>) -> Result<Self, TileError> {
        Self::from_fn(domain, |_| V::default())
    }

    /// Create an image whose value at each point is `f(point)`.
    ///
    /// Storage is reserved up front; allocation failure is reported as
    /// [`TileError::Allocation`] rather than aborting.
    pub fn from_fn<F>(domain: Domain<N>, mut f: F) -> Result<Self, TileError>
    where
        F: FnMut(&Point<N>) -> V,
    {
        let points = domain
            .checked_size()
            .ok_or_else(|| TileError::SizeOverflow(domain.to_string()))?;

        let mut data = Vec::new();
        data.try_reserve_exact(points)
            .map_err(|e| TileError::Allocation {
                points,
                message: e.to_string(),
            })?;
        data.extend(domain.points().map(|p| f(&p)));

        Ok(Self { domain, data })
    }

    /// Wrap an existing buffer laid out in [`Domain::points`] order.
    ///
    /// Returns `None` if the buffer length does not match the domain size.
    pub fn from_vec(domain: Domain<N>, data: Vec<V>) -> Option<Self> {
        if domain.checked_size() == Some(data.len()) {
            Some(Self { domain, data })
        } else {
            None
        }
    }

    /// Values in buffer order.
    pub fn as_slice(&self) -> &[V] {
        &self.data
    }

    /// Consume the image and return its buffer.
    pub fn into_vec(self) -> Vec<V> {
        self.data
    }

    #[inline]
    fn offset(&self, point: &Point<N>) -> usize {
        match self.domain.index_of(point) {
            Some(offset) => offset,
            None => panic!("point {} is outside image domain {}", point, self.domain),
        }
    }
}

impl<V: Copy + Default, const N: usize> Image<N> for ImageContainer<V, N> {
    type Value = V;

    fn domain(&self) -> &Domain<N> {
        &self.domain
    }

    fn is_valid(&self) -> bool {
        self.domain.checked_size() == Some(self.data.len())
    }

    fn get(&self, point: &Point<N>) -> V {
        self.data[self.offset(point)]
    }

    fn set(&mut self, point: &Point<N>, value: V) {
        let offset = self.offset(point);
        self.data[offset] = value;
    }
}

// =============================================================================
// Tests
// =============================================================================
