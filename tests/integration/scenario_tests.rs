//! End-to-end scenarios for the tiled image with default policies.
//!
//! The default configuration keeps a single tile resident and writes every
//! value through to the backing image.

use tiled_image::{
    Domain, Fifo, Image, ImageContainer, Last, Lru, Point, TileCache, TileFactory, TiledImage,
    WriteBack, WriteThrough,
};

use super::test_utils::{coordinates, quadrants, ten_by_ten, zeroed};

#[test]
fn test_quadrant_scenario() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    assert_eq!(tiled.stats().loads, 0);

    tiled.set(&Point::new([2, 2]), 7).unwrap();
    assert_eq!(tiled.stats().loads, 1);
    assert_eq!(tiled.resident_domains(), vec![tiles[0]]);

    tiled.set(&Point::new([7, 7]), 3).unwrap();
    assert_eq!(tiled.stats().loads, 2);
    assert_eq!(tiled.stats().evictions, 1);
    assert_eq!(tiled.resident_domains(), vec![tiles[3]]);

    assert_eq!(tiled.get(&Point::new([2, 2])).unwrap(), 7);
    assert_eq!(tiled.get(&Point::new([7, 7])).unwrap(), 3);
    assert_eq!(tiled.stats().loads, 4);
    drop(tiled);

    assert_eq!(backing.peek(&Point::new([2, 2])), 7);
    assert_eq!(backing.peek(&Point::new([7, 7])), 3);
    assert_eq!(backing.writes(), 2);
}

#[test]
fn test_accesses_within_one_tile_load_once() {
    let tiles = quadrants();
    let mut backing = coordinates(ten_by_ten());

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    for point in tiles[1].points() {
        let expected = (point[0] + 1000 * point[1]) as i32;
        assert_eq!(tiled.get(&point).unwrap(), expected);
    }

    assert_eq!(tiled.stats().loads, 1);
    assert_eq!(tiled.stats().evictions, 0);
    // One miss on the first access, everything else hits
    assert_eq!(tiled.stats().read_misses, 1);
    assert_eq!(tiled.stats().read_hits, 25);
    drop(tiled);

    // The tile was copied exactly once
    assert_eq!(backing.reads(), 25);
}

#[test]
fn test_miss_loads_the_owning_sub_domain() {
    let tiles = quadrants();
    let mut backing = coordinates(ten_by_ten());

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    assert_eq!(tiled.get(&Point::new([8, 1])).unwrap(), 1008);
    assert_eq!(tiled.resident_domains(), vec![tiles[1]]);

    assert_eq!(tiled.get(&Point::new([1, 8])).unwrap(), 8001);
    assert_eq!(tiled.resident_domains(), vec![tiles[2]]);
}

#[test]
fn test_write_through_reaches_backing_immediately() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    tiled.set(&Point::new([4, 4]), 11).unwrap();
    tiled.set(&Point::new([0, 0]), 12).unwrap();

    assert_eq!(tiled.backing().peek(&Point::new([4, 4])), 11);
    assert_eq!(tiled.backing().peek(&Point::new([0, 0])), 12);
    assert_eq!(tiled.stats().point_flushes, 2);
    assert_eq!(tiled.stats().tile_flushes, 0);
}

#[test]
fn test_reloaded_tile_sees_earlier_writes() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    tiled.set(&Point::new([3, 1]), 5).unwrap();
    // Evicts the first quadrant
    tiled.get(&Point::new([9, 9])).unwrap();
    assert_eq!(tiled.get(&Point::new([3, 1])).unwrap(), 5);
    assert_eq!(tiled.stats().loads, 3);
}

#[test]
fn test_update_of_resident_domain_is_noop() {
    let tiles = quadrants();
    let mut backing = coordinates(ten_by_ten());
    let point = Point::new([6, 2]);

    let mut cache = TileCache::new(TileFactory::new(&mut backing), Last::new(), WriteBack);
    cache.update(&tiles[1]).unwrap();
    assert!(cache.write(&point, -1).unwrap());

    // A second update neither reloads nor flushes the modified tile
    cache.update(&tiles[1]).unwrap();
    assert_eq!(cache.read(&point), Some(-1));
    assert_eq!(cache.stats().loads, 1);
    assert_eq!(cache.stats().tile_flushes, 0);
    assert_eq!(cache.factory().backing().peek(&point), 6 + 2000);
    assert_eq!(cache.factory().backing().reads(), 25);
}

#[test]
fn test_update_of_resident_domain_refreshes_lru_recency() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut cache = TileCache::new(TileFactory::new(&mut backing), Lru::new(2), WriteBack);
    cache.update(&tiles[0]).unwrap();
    cache.update(&tiles[1]).unwrap();
    cache.update(&tiles[0]).unwrap();
    cache.update(&tiles[2]).unwrap();

    let resident = cache.resident_domains();
    assert!(resident.contains(&tiles[0]));
    assert!(!resident.contains(&tiles[1]));
    assert_eq!(cache.stats().loads, 3);
}

#[test]
fn test_single_sub_domain_never_evicts() {
    let domain = ten_by_ten();
    let tiles = vec![domain];
    let mut backing = zeroed(domain);

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    for point in domain.points() {
        tiled.set(&point, (point[0] * point[1]) as i32).unwrap();
    }

    assert_eq!(tiled.stats().loads, 1);
    assert_eq!(tiled.stats().evictions, 0);
    assert_eq!(tiled.get(&Point::new([9, 9])).unwrap(), 81);
}

#[test]
fn test_overlapping_sub_domains_use_first_match() {
    let domain = ten_by_ten();
    let wide = Domain::new(Point::new([0, 0]), Point::new([9, 9]));
    let small = Domain::new(Point::new([0, 0]), Point::new([1, 1]));
    let tiles = vec![wide, small];
    let mut backing = zeroed(domain);

    let tiled = TiledImage::new(&mut backing, &tiles);
    assert_eq!(tiled.find_sub_domain(&Point::new([1, 1])), &wide);
}

/// `[0, 19]` split into `[0, 5]`, `[3, 9]` and `[10, 19]`.
fn overlapping_intervals() -> (Domain<1>, Vec<Domain<1>>) {
    let interval = |lo, hi| Domain::new(Point::new([lo]), Point::new([hi]));
    (
        interval(0, 19),
        vec![interval(0, 5), interval(3, 9), interval(10, 19)],
    )
}

#[test]
fn test_overlap_write_survives_eviction_of_other_tile() {
    let (domain, tiles) = overlapping_intervals();
    let mut backing = ImageContainer::<i32, 1>::new(domain).unwrap();

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Fifo::new(2), WriteThrough);
    tiled.get(&Point::new([7])).unwrap();
    tiled.get(&Point::new([1])).unwrap();
    // Both resident tiles contain 4, the first sub-domain owns it
    tiled.set(&Point::new([4]), 42).unwrap();

    // Evicts [3, 9]
    tiled.get(&Point::new([15])).unwrap();
    assert_eq!(tiled.resident_domains(), vec![tiles[0], tiles[2]]);

    assert_eq!(tiled.backing().get(&Point::new([4])), 42);
    assert_eq!(tiled.get(&Point::new([4])).unwrap(), 42);
}

#[test]
fn test_overlap_write_back_is_not_overwritten_by_stale_copy() {
    let (domain, tiles) = overlapping_intervals();
    let mut backing = ImageContainer::<i32, 1>::new(domain).unwrap();

    {
        let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Fifo::new(2), WriteBack);
        tiled.get(&Point::new([1])).unwrap();
        tiled.get(&Point::new([7])).unwrap();
        tiled.set(&Point::new([4]), 42).unwrap();
        // Dirties [3, 9], which still holds the old value at 4
        tiled.set(&Point::new([7]), 1).unwrap();
        tiled.flush().unwrap();
    }

    assert_eq!(backing.get(&Point::new([4])), 42);
    assert_eq!(backing.get(&Point::new([7])), 1);
}

#[test]
fn test_clear_cache_resets_statistics_and_reloads() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    tiled.get(&Point::new([0, 0])).unwrap();
    tiled.clear_cache().unwrap();

    assert!(tiled.resident_domains().is_empty());
    assert_eq!(tiled.stats().loads, 0);

    tiled.get(&Point::new([0, 0])).unwrap();
    assert_eq!(tiled.stats().loads, 1);
}

#[test]
fn test_invalid_backing_image_fails_on_first_access() {
    let domain = Domain::new(Point::new([0]), Point::new([15]));
    let tiles = tiled_image::regular_partition(&domain, [4]);
    let mut backing = InvalidImage {
        inner: ImageContainer::new(domain).unwrap(),
    };

    let mut tiled = TiledImage::new(&mut backing, &tiles);
    assert!(!tiled.is_valid());
    assert!(tiled.get(&Point::new([3])).is_err());
    assert!(tiled.resident_domains().is_empty());
}

struct InvalidImage {
    inner: ImageContainer<u8, 1>,
}

impl Image<1> for InvalidImage {
    type Value = u8;

    fn domain(&self) -> &Domain<1> {
        self.inner.domain()
    }

    fn is_valid(&self) -> bool {
        false
    }

    fn get(&self, point: &Point<1>) -> u8 {
        self.inner.get(point)
    }

    fn set(&mut self, point: &Point<1>, value: u8) {
        self.inner.set(point, value)
    }
}
