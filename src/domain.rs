//! Integer points and rectangular domains.
//!
//! A [`Domain`] is an axis-aligned box of integer coordinates with inclusive
//! lower and upper corners. Every image in this crate is defined over one
//! domain, and a tiled image is described by an ordered list of sub-domains.
//!
//! Points inside a domain are linearized with the first coordinate varying
//! fastest: for a 2D domain, `(x, y)` is stored at `x + y * width`.

use std::fmt;
use std::ops::Index;

// =============================================================================
// Point
// =============================================================================

/// A point in `N`-dimensional integer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point<const N: usize>(pub [i64; N]);

impl<const N: usize> Point<N> {
    /// Create a point from its coordinates.
    pub const fn new(coords: [i64; N]) -> Self {
        Self(coords)
    }

    /// Coordinates of the point.
    pub fn coords(&self) -> &[i64; N] {
        &self.0
    }
}

impl<const N: usize> From<[i64; N]> for Point<N> {
    fn from(coords: [i64; N]) -> Self {
        Self(coords)
    }
}

impl<const N: usize> Index<usize> for Point<N> {
    type Output = i64;

    fn index(&self, dim: usize) -> &i64 {
        &self.0[dim]
    }
}

impl<const N: usize> fmt::Display for Point<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// Domain
// =============================================================================

/// Axis-aligned rectangular domain with inclusive bounds.
///
/// A domain is never empty: `lower[d] <= upper[d]` holds in every dimension.
///
/// # Example
///
/// ```
/// use tiled_image::domain::{Domain, Point};
///
/// let domain = Domain::new(Point::new([0, 0]), Point::new([9, 4]));
/// assert!(domain.is_inside(&Point::new([9, 0])));
/// assert!(!domain.is_inside(&Point::new([10, 0])));
/// assert_eq!(domain.checked_size(), Some(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Domain<const N: usize> {
    lower: Point<N>,
    upper: Point<N>,
}

impl<const N: usize> Domain<N> {
    /// Create a domain from its inclusive corners.
    ///
    /// # Panics
    ///
    /// Panics if `lower` exceeds `upper` in any dimension.
    pub fn new(lower: Point<N>, upper: Point<N>) -> Self {
        match Self::try_new(lower, upper) {
            Some(domain) => domain,
            None => panic!("invalid domain: lower {} exceeds upper {}", lower, upper),
        }
    }

    /// Create a domain, returning `None` if `lower` exceeds `upper` in any dimension.
    pub fn try_new(lower: Point<N>, upper: Point<N>) -> Option<Self> {
        if (0..N).all(|d| lower[d] <= upper[d]) {
            Some(Self { lower, upper })
        } else {
            None
        }
    }

    /// Lower (inclusive) corner.
    pub fn lower(&self) -> &Point<N> {
        &self.lower
    }

    /// Upper (inclusive) corner.
    pub fn upper(&self) -> &Point<N> {
        &self.upper
    }

    /// Check whether `point` lies inside the domain.
    #[inline]
    pub fn is_inside(&self, point: &Point<N>) -> bool {
        (0..N).all(|d| self.lower[d] <= point[d] && point[d] <= self.upper[d])
    }

    /// Check whether `other` lies entirely inside this domain.
    pub fn contains_domain(&self, other: &Domain<N>) -> bool {
        self.is_inside(&other.lower) && self.is_inside(&other.upper)
    }

    /// Check whether the two domains share at least one point.
    pub fn intersects(&self, other: &Domain<N>) -> bool {
        (0..N).all(|d| self.lower[d] <= other.upper[d] && other.lower[d] <= self.upper[d])
    }

    /// Number of points along each dimension.
    ///
    /// Returns `None` if an extent does not fit in `usize`.
    pub fn extent(&self) -> Option<[usize; N]> {
        let mut extent = [0usize; N];
        for (d, e) in extent.iter_mut().enumerate() {
            let span = self.upper[d].abs_diff(self.lower[d]).checked_add(1)?;
            *e = usize::try_from(span).ok()?;
        }
        Some(extent)
    }

    /// Total number of points in the domain.
    ///
    /// Returns `None` if the count does not fit in `usize`.
    pub fn checked_size(&self) -> Option<usize> {
        self.extent()?
            .iter()
            .try_fold(1usize, |acc, &e| acc.checked_mul(e))
    }

    /// Linear offset of `point` in a buffer laid out over this domain.
    ///
    /// Returns `None` if the point is outside the domain.
    pub fn index_of(&self, point: &Point<N>) -> Option<usize> {
        if !self.is_inside(point) {
            return None;
        }
        let extent = self.extent()?;
        let mut index = 0usize;
        for d in (0..N).rev() {
            let offset = usize::try_from(point[d].abs_diff(self.lower[d])).ok()?;
            index = index.checked_mul(extent[d])?.checked_add(offset)?;
        }
        Some(index)
    }

    /// Iterate over every point of the domain, first coordinate fastest.
    pub fn points(&self) -> DomainPoints<N> {
        DomainPoints {
            domain: *self,
            next: Some(self.lower),
        }
    }
}

impl<const N: usize> fmt::Display for Domain<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.lower, self.upper)
    }
}

/// Iterator over the points of a [`Domain`], in buffer order.
#[derive(Debug, Clone)]
pub struct DomainPoints<const N: usize> {
    domain: Domain<N>,
    next: Option<Point<N>>,
}

impl<const N: usize> Iterator for DomainPoints<N> {
    type Item = Point<N>;

    fn next(&mut self) -> Option<Point<N>> {
        let current = self.next?;

        let mut advanced = current;
        let mut carried = true;
        for d in 0..N {
            if advanced.0[d] < self.domain.upper[d] {
                advanced.0[d] += 1;
                carried = false;
                break;
            }
            advanced.0[d] = self.domain.lower[d];
        }
        self.next = if carried { None } else { Some(advanced) };

        Some(current)
    }
}

// =============================================================================
// Partitioning
// =============================================================================

/// Split `domain` into a regular grid of sub-domains of at most `tile_extent`
/// points along each dimension.
///
/// Tiles on the upper border are clipped to the domain. The result is ordered
/// like [`Domain::points`]: the first grid coordinate varies fastest.
///
/// # Panics
///
/// Panics if any entry of `tile_extent` is zero.
///
/// # Example
///
/// ```
/// use tiled_image::domain::{regular_partition, Domain, Point};
///
/// let domain = Domain::new(Point::new([0, 0]), Point::new([9, 9]));
/// let tiles = regular_partition(&domain, [5, 5]);
/// assert_eq!(tiles.len(), 4);
/// assert_eq!(tiles[1], Domain::new(Point::new([5, 0]), Point::new([9, 4])));
/// ```
pub fn regular_partition<const N: usize>(
    domain: &Domain<N>,
    tile_extent: [usize; N],
) -> Vec<Domain<N>> {
    assert!(
        tile_extent.iter().all(|&e| e > 0),
        "tile extent must be non-zero in every dimension"
    );

    // Inclusive [start, end] ranges of each tile row, per dimension
    let ranges: Vec<Vec<(i64, i64)>> = (0..N)
        .map(|d| {
            let step = i64::try_from(tile_extent[d]).unwrap_or(i64::MAX);
            let mut spans = Vec::new();
            let mut start = domain.lower[d];
            loop {
                let end = start.saturating_add(step - 1).min(domain.upper[d]);
                spans.push((start, end));
                if end >= domain.upper[d] {
                    break;
                }
                start = end + 1;
            }
            spans
        })
        .collect();

    let mut tiles = Vec::new();
    let mut cursor = [0usize; N];
    loop {
        let mut lower = [0i64; N];
        let mut upper = [0i64; N];
        for d in 0..N {
            let (start, end) = ranges[d][cursor[d]];
            lower[d] = start;
            upper[d] = end;
        }
        tiles.push(Domain::new(Point(lower), Point(upper)));

        let mut carried = true;
        for d in 0..N {
            if cursor[d] + 1 < ranges[d].len() {
                cursor[d] += 1;
                carried = false;
                break;
            }
            cursor[d] = 0;
        }
        if carried {
            break;
        }
    }
    tiles
}

// =============================================================================
// Tests
// =============================================================================
