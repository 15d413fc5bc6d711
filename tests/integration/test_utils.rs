//! Test utilities for integration tests.
//!
//! This module provides a backing image that counts every access made to it,
//! which lets tests tell cache hits apart from reloads and flushes.

use std::cell::Cell;

use tiled_image::{regular_partition, Domain, Image, ImageContainer, Point};

// =============================================================================
// Counting Backing Image
// =============================================================================

/// A backing image that tracks how often it is read and written.
pub struct CountingImage<V, const N: usize> {
    inner: ImageContainer<V, N>,
    reads: Cell<usize>,
    writes: usize,
}

impl<V: Copy + Default, const N: usize> CountingImage<V, N> {
    pub fn new(inner: ImageContainer<V, N>) -> Self {
        Self {
            inner,
            reads: Cell::new(0),
            writes: 0,
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Value at `point` without counting the access.
    pub fn peek(&self, point: &Point<N>) -> V {
        self.inner.get(point)
    }
}

impl<V: Copy + Default, const N: usize> Image<N> for CountingImage<V, N> {
    type Value = V;

    fn domain(&self) -> &Domain<N> {
        self.inner.domain()
    }

    fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    fn get(&self, point: &Point<N>) -> V {
        self.reads.set(self.reads.get() + 1);
        self.inner.get(point)
    }

    fn set(&mut self, point: &Point<N>, value: V) {
        self.writes += 1;
        self.inner.set(point, value);
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// The `[0,9]×[0,9]` domain used by the quadrant scenario.
pub fn ten_by_ten() -> Domain<2> {
    Domain::new(Point::new([0, 0]), Point::new([9, 9]))
}

/// Four 5×5 quadrants of [`ten_by_ten`], lower-left first.
pub fn quadrants() -> Vec<Domain<2>> {
    regular_partition(&ten_by_ten(), [5, 5])
}

/// Zero-filled counting image over `domain`.
pub fn zeroed(domain: Domain<2>) -> CountingImage<i32, 2> {
    CountingImage::new(ImageContainer::new(domain).unwrap())
}

/// Counting image over `domain` where each pixel holds `x + 1000 * y`.
pub fn coordinates(domain: Domain<2>) -> CountingImage<i32, 2> {
    CountingImage::new(ImageContainer::from_fn(domain, |p| (p[0] + 1000 * p[1]) as i32).unwrap())
}
