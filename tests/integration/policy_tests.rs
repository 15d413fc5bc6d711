//! Read and write policy behavior through the tiled image.

use tiled_image::{
    regular_partition, AccessPattern, Domain, Fifo, Last, Lru, Point, TiledImage, WriteBack,
    WriteThrough,
};

use super::test_utils::{coordinates, quadrants, ten_by_ten, zeroed};

// =============================================================================
// Read Policies
// =============================================================================

#[test]
fn test_fifo_evicts_oldest_loaded_tile() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Fifo::new(2), WriteThrough);
    tiled.get(&Point::new([0, 0])).unwrap();
    tiled.get(&Point::new([9, 0])).unwrap();
    // Touching the oldest tile does not protect it
    tiled.get(&Point::new([0, 0])).unwrap();
    tiled.get(&Point::new([0, 9])).unwrap();

    let resident = tiled.resident_domains();
    assert_eq!(resident.len(), 2);
    assert!(!resident.contains(&tiles[0]));
    assert!(resident.contains(&tiles[1]));
    assert!(resident.contains(&tiles[2]));
    assert_eq!(tiled.stats().evictions, 1);
}

#[test]
fn test_lru_keeps_recently_used_tile() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Lru::new(2), WriteThrough);
    tiled.get(&Point::new([0, 0])).unwrap();
    tiled.get(&Point::new([9, 0])).unwrap();
    tiled.get(&Point::new([0, 0])).unwrap();
    tiled.get(&Point::new([0, 9])).unwrap();

    let resident = tiled.resident_domains();
    assert_eq!(resident.len(), 2);
    assert!(resident.contains(&tiles[0]));
    assert!(!resident.contains(&tiles[1]));
    assert!(resident.contains(&tiles[2]));
}

#[test]
fn test_capacity_covering_all_tiles_loads_each_once() {
    let tiles = quadrants();
    let mut backing = coordinates(ten_by_ten());

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Lru::new(4), WriteThrough);
    for _ in 0..3 {
        for point in AccessPattern::ColumnMajor.points(&ten_by_ten(), &tiles) {
            tiled.get(&point).unwrap();
        }
    }

    assert_eq!(tiled.stats().loads, 4);
    assert_eq!(tiled.stats().evictions, 0);
    assert_eq!(tiled.stats().read_misses, 4);
}

#[test]
fn test_row_sweep_thrashes_single_tile_cache() {
    let domain = Domain::new(Point::new([0, 0]), Point::new([7, 1]));
    let tiles = regular_partition(&domain, [4, 2]);
    let mut backing = zeroed(domain);

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Last::new(), WriteThrough);
    for point in AccessPattern::RowMajor.points(&domain, &tiles) {
        tiled.get(&point).unwrap();
    }

    // Each scanline crosses both tiles
    assert_eq!(tiled.stats().loads, 4);
    assert_eq!(tiled.stats().evictions, 3);
}

// =============================================================================
// Write Policies
// =============================================================================

#[test]
fn test_write_back_defers_until_eviction() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Last::new(), WriteBack);
    tiled.set(&Point::new([1, 1]), 9).unwrap();
    assert_eq!(tiled.backing().peek(&Point::new([1, 1])), 0);
    assert_eq!(tiled.backing().writes(), 0);

    tiled.get(&Point::new([6, 6])).unwrap();
    assert_eq!(tiled.backing().peek(&Point::new([1, 1])), 9);
    // The whole tile is written back
    assert_eq!(tiled.backing().writes(), 25);
    assert_eq!(tiled.stats().tile_flushes, 1);
    assert_eq!(tiled.stats().point_flushes, 0);
}

#[test]
fn test_write_back_skips_clean_tiles() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Fifo::new(1), WriteBack);
    for corner in [[0, 0], [9, 0], [0, 9], [9, 9]] {
        tiled.get(&Point::new(corner)).unwrap();
    }

    assert_eq!(tiled.stats().evictions, 3);
    assert_eq!(tiled.stats().tile_flushes, 0);
    assert_eq!(tiled.backing().writes(), 0);
}

#[test]
fn test_write_back_explicit_flush() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Lru::new(4), WriteBack);
    tiled.set(&Point::new([2, 3]), 4).unwrap();
    tiled.set(&Point::new([8, 8]), 6).unwrap();
    assert_eq!(tiled.backing().writes(), 0);

    tiled.flush().unwrap();
    assert_eq!(tiled.backing().peek(&Point::new([2, 3])), 4);
    assert_eq!(tiled.backing().peek(&Point::new([8, 8])), 6);
    assert_eq!(tiled.stats().tile_flushes, 2);

    // Nothing left to flush
    tiled.flush().unwrap();
    assert_eq!(tiled.stats().tile_flushes, 2);
    assert_eq!(tiled.resident_domains().len(), 2);
}

#[test]
fn test_write_back_flushes_on_drop() {
    let tiles = quadrants();
    let mut backing = zeroed(ten_by_ten());

    {
        let mut tiled = TiledImage::with_policies(&mut backing, &tiles, Lru::new(4), WriteBack);
        for point in ten_by_ten().points() {
            tiled.set(&point, 1).unwrap();
        }
        assert_eq!(tiled.backing().writes(), 0);
    }

    assert_eq!(backing.writes(), 100);
    assert!(ten_by_ten().points().all(|p| backing.peek(&p) == 1));
}

#[test]
fn test_write_through_and_write_back_agree() {
    let tiles = regular_partition(&ten_by_ten(), [3, 4]);
    let order = AccessPattern::ColumnMajor.points(&ten_by_ten(), &tiles);

    let mut through = coordinates(ten_by_ten());
    {
        let mut tiled = TiledImage::with_policies(&mut through, &tiles, Fifo::new(2), WriteThrough);
        tiled_image::map_points(&mut tiled, order.iter().copied(), |v| v * 2 + 1).unwrap();
    }

    let mut back = coordinates(ten_by_ten());
    {
        let mut tiled = TiledImage::with_policies(&mut back, &tiles, Fifo::new(2), WriteBack);
        tiled_image::map_points(&mut tiled, order.iter().copied(), |v| v * 2 + 1).unwrap();
    }

    for point in ten_by_ten().points() {
        assert_eq!(through.peek(&point), back.peek(&point), "at {}", point);
    }
    assert_eq!(through.writes(), 100);
}
