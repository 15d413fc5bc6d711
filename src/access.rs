//! Access patterns for sweeping a tiled image.
//!
//! The order in which points are visited decides how often the cache misses:
//! a sweep following the tile layout loads each tile once, while a sweep
//! across tile rows reloads tiles unless the read policy keeps enough of them.

use clap::ValueEnum;

use crate::domain::{Domain, Point};
use crate::error::TileError;
use crate::raster::Image;
use crate::tile::{ReadPolicy, TiledImage, WritePolicy};

/// Order in which the points of an image are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AccessPattern {
    /// First coordinate fastest (scanlines for 2D images)
    #[default]
    RowMajor,
    /// Last coordinate fastest (columns for 2D images)
    ColumnMajor,
    /// Sub-domain by sub-domain, in list order
    TileOrder,
}

impl AccessPattern {
    /// Points of `domain` in this pattern's order.
    ///
    /// For [`AccessPattern::TileOrder`], points covered by several sub-domains
    /// are visited once per sub-domain, and points outside `domain` are skipped.
    pub fn points<const N: usize>(
        &self,
        domain: &Domain<N>,
        sub_domains: &[Domain<N>],
    ) -> Vec<Point<N>> {
        match self {
            AccessPattern::RowMajor => domain.points().collect(),
            AccessPattern::ColumnMajor => {
                let mut points: Vec<_> = domain.points().collect();
                points.sort_unstable();
                points
            }
            AccessPattern::TileOrder => sub_domains
                .iter()
                .flat_map(|sub| sub.points())
                .filter(|p| domain.is_inside(p))
                .collect(),
        }
    }
}

/// Replace the value at every point of `order` by `f(value)`.
///
/// Returns the number of points visited.
pub fn map_points<I, const N: usize, R, W, F>(
    tiled: &mut TiledImage<'_, I, N, R, W>,
    order: impl IntoIterator<Item = Point<N>>,
    mut f: F,
) -> Result<usize, TileError>
where
    I: Image<N>,
    R: ReadPolicy<I::Value, N>,
    W: WritePolicy,
    F: FnMut(I::Value) -> I::Value,
{
    let mut visited = 0;
    for point in order {
        let value = tiled.get(&point)?;
        tiled.set(&point, f(value))?;
        visited += 1;
    }
    tiled.flush()?;
    Ok(visited)
}
