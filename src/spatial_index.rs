//! Tile-partitioned container for spatial queries over immutable items.
//!
//! Items are grouped into one bucket per occupied tile. Buckets are sorted by
//! `(tile.x, tile.z)` so a rectangular query only walks the columns it
//! covers. The list is never patched: a changed item set is indexed anew.

use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::constants::TILE_SIZE;
use crate::geometry::{PointD, Tile};

/// An item that can be placed in a [`TileIndexedList`]
pub trait TileItem {
    /// The single tile this item is filed under
    fn tile(&self) -> Tile;

    /// Squared distance from a world point to this item
    fn distance_squared(&self, point: PointD) -> f64;

    /// Farthest any part of the item lies from the point it is filed by.
    /// Zero for point-like items.
    fn reach(&self) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone)]
struct TileBucket<T> {
    tile: Tile,
    items: Vec<T>,
}

/// Items grouped by tile, queryable by tile rectangle or by proximity
#[derive(Debug, Clone)]
pub struct TileIndexedList<T> {
    buckets: Vec<TileBucket<T>>,
    // Parallel to `buckets`, for binary search
    tiles: Vec<Tile>,
    len: usize,
    max_reach: f64,
}

impl<T> Default for TileIndexedList<T> {
    fn default() -> Self {
        Self {
            buckets: Vec::new(),
            tiles: Vec::new(),
            len: 0,
            max_reach: 0.0,
        }
    }
}

impl<T: TileItem> TileIndexedList<T> {
    /// Index a set of items. Items keep their relative order within a tile.
    #[must_use]
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let mut grouped: IndexMap<Tile, Vec<T>> = IndexMap::new();
        let mut len = 0;
        let mut max_reach: f64 = 0.0;
        for item in items {
            max_reach = max_reach.max(item.reach());
            grouped.entry(item.tile()).or_default().push(item);
            len += 1;
        }
        grouped.sort_keys();

        let buckets: Vec<TileBucket<T>> = grouped
            .into_iter()
            .map(|(tile, items)| TileBucket { tile, items })
            .collect();
        let tiles = buckets.iter().map(|bucket| bucket.tile).collect();

        Self { buckets, tiles, len, max_reach }
    }

    /// Items in buckets whose tile lies in the inclusive rectangle spanned by
    /// `bottom_left` and `top_right`, in tile order
    pub fn bounding_box(&self, bottom_left: Tile, top_right: Tile) -> impl Iterator<Item = &T> + '_ {
        let first = self.tiles.partition_point(|tile| tile.x < bottom_left.x);
        self.buckets[first..]
            .iter()
            .take_while(move |bucket| bucket.tile.x <= top_right.x)
            .filter(move |bucket| bucket.tile.within(bottom_left, top_right))
            .flat_map(|bucket| bucket.items.iter())
    }

    /// Items within the tile rectangle, nearest to `point` first.
    ///
    /// The search starts at the tile containing `point` and grows one ring of
    /// tiles at a time. An item is only yielded once no unvisited ring can hold
    /// anything closer.
    pub fn find_nearest(&self, point: PointD, bottom_left: Tile, top_right: Tile) -> NearestItems<'_, T> {
        let origin = point.tile();
        let max_ring = if bottom_left.x > top_right.x || bottom_left.z > top_right.z {
            None
        } else {
            Some(
                [
                    bottom_left,
                    top_right,
                    Tile::new(bottom_left.x, top_right.z),
                    Tile::new(top_right.x, bottom_left.z),
                ]
                .into_iter()
                .map(|corner| origin.chebyshev_distance(corner))
                .max()
                .unwrap_or(0),
            )
        };

        let min = origin.corner_min();
        let max = origin.corner_max();
        let edge_distance = (point.x - min.x)
            .min(max.x - point.x)
            .min(point.y - min.y)
            .min(max.y - point.y)
            .max(0.0);

        NearestItems {
            list: self,
            point,
            origin,
            bottom_left,
            top_right,
            next_ring: 0,
            max_ring,
            edge_distance,
            pending: Vec::new(),
        }
    }
}

impl<T> TileIndexedList<T> {
    /// Total number of indexed items
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest [`TileItem::reach`] among the indexed items
    #[must_use]
    pub fn max_reach(&self) -> f64 {
        self.max_reach
    }

    /// Number of occupied tiles
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Occupied tiles in ascending `(x, z)` order
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Items filed under exactly one tile
    #[must_use]
    pub fn items_in_tile(&self, tile: Tile) -> &[T] {
        self.tiles
            .binary_search(&tile)
            .map_or(&[], |position| self.buckets[position].items.as_slice())
    }

    /// All items in tile order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.items.iter())
    }
}

/// Lazy nearest-first iterator returned by [`TileIndexedList::find_nearest`]
pub struct NearestItems<'a, T> {
    list: &'a TileIndexedList<T>,
    point: PointD,
    origin: Tile,
    bottom_left: Tile,
    top_right: Tile,
    next_ring: u32,
    max_ring: Option<u32>,
    edge_distance: f64,
    // Sorted farthest-first so the nearest candidate pops off the end
    pending: Vec<(f64, &'a T)>,
}

impl<'a, T: TileItem> NearestItems<'a, T> {
    fn rings_remaining(&self) -> bool {
        self.max_ring.is_some_and(|max| self.next_ring <= max)
    }

    /// Smallest distance any item filed in ring `ring` can have from the point,
    /// allowing for items that extend beyond their own tile
    fn ring_min_distance(&self, ring: u32) -> f64 {
        if ring == 0 {
            0.0
        } else {
            (f64::from(ring - 1) * TILE_SIZE + self.edge_distance - self.list.max_reach).max(0.0)
        }
    }

    fn load_ring(&mut self, ring: u32) {
        let radius = i32::try_from(ring).unwrap_or(i32::MAX);
        let lo = self.origin.offset(-radius, -radius);
        let hi = self.origin.offset(radius, radius);
        let bottom_left = Tile::new(lo.x.max(self.bottom_left.x), lo.z.max(self.bottom_left.z));
        let top_right = Tile::new(hi.x.min(self.top_right.x), hi.z.min(self.top_right.z));
        if bottom_left.x > top_right.x || bottom_left.z > top_right.z {
            return;
        }

        let origin = self.origin;
        let point = self.point;
        let list: &'a TileIndexedList<T> = self.list;
        let candidates = list
            .bounding_box(bottom_left, top_right)
            .filter(|item| item.tile().chebyshev_distance(origin) == ring)
            .map(|item| (item.distance_squared(point).sqrt(), item));
        self.pending.extend(candidates);
        self.pending
            .sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    }
}

impl<'a, T: TileItem> Iterator for NearestItems<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bound = if self.rings_remaining() {
                self.ring_min_distance(self.next_ring)
            } else {
                f64::INFINITY
            };
            if let Some(&(distance, item)) = self.pending.last() {
                if distance <= bound {
                    self.pending.pop();
                    return Some(item);
                }
            }
            if !self.rings_remaining() {
                return None;
            }
            let ring = self.next_ring;
            self.next_ring += 1;
            self.load_ring(ring);
        }
    }
}

/// Position of one car, indexed afresh every frame
#[derive(Debug, Clone, PartialEq)]
pub struct CarLocation {
    pub car_id: u32,
    pub location: PointD,
}

impl TileItem for CarLocation {
    fn tile(&self) -> Tile {
        self.location.tile()
    }

    fn distance_squared(&self, point: PointD) -> f64 {
        self.location.distance_squared(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SegmentKind, TrackSegment};

    fn car(car_id: u32, x: f64, y: f64) -> CarLocation {
        CarLocation { car_id, location: PointD::new(x, y) }
    }

    fn sample_cars() -> Vec<CarLocation> {
        vec![
            car(1, 0.0, 0.0),
            car(2, 100.0, 50.0),
            car(3, 2500.0, 0.0),
            car(4, -2100.0, 4100.0),
            car(5, 6000.0, -6000.0),
            car(6, 2200.0, 10.0),
        ]
    }

    fn ids<'a>(items: impl Iterator<Item = &'a CarLocation>) -> Vec<u32> {
        items.map(|c| c.car_id).collect()
    }

    #[test]
    fn test_groups_by_tile_in_order() {
        let list = TileIndexedList::new(sample_cars());
        assert_eq!(list.len(), 6);
        assert_eq!(list.tile_count(), 4);
        let tiles = list.tiles();
        assert!(tiles.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids(list.items_in_tile(Tile::new(0, 0)).iter()), vec![1, 2]);
        assert_eq!(ids(list.items_in_tile(Tile::new(1, 0)).iter()), vec![3, 6]);
        assert!(list.items_in_tile(Tile::new(9, 9)).is_empty());
    }

    #[test]
    fn test_bounding_box_round_trip() {
        let cars = sample_cars();
        let list = TileIndexedList::new(cars.clone());
        for item in &cars {
            let tile = item.tile();
            let covering = ids(list.bounding_box(tile.offset(-1, -1), tile.offset(1, 1)));
            assert!(covering.contains(&item.car_id));
            let exact = ids(list.bounding_box(tile, tile));
            assert!(exact.contains(&item.car_id));
            let excluding = ids(list.bounding_box(tile.offset(1, 0), tile.offset(5, 5)));
            assert!(!excluding.contains(&item.car_id));
        }
        // each item appears exactly once in a query covering everything
        let mut all = ids(list.bounding_box(Tile::new(i32::MIN, i32::MIN), Tile::new(i32::MAX, i32::MAX)));
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_bounding_box_empty_cases() {
        let list = TileIndexedList::new(sample_cars());
        assert_eq!(list.bounding_box(Tile::new(20, 20), Tile::new(30, 30)).count(), 0);
        assert_eq!(list.bounding_box(Tile::new(1, 1), Tile::new(0, 0)).count(), 0);
        let empty: TileIndexedList<CarLocation> = TileIndexedList::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.bounding_box(Tile::new(-1, -1), Tile::new(1, 1)).count(), 0);
    }

    #[test]
    fn test_find_nearest_orders_by_distance() {
        let list = TileIndexedList::new(sample_cars());
        let point = PointD::new(2000.0, 0.0);
        let found = ids(list.find_nearest(point, Tile::new(-5, -5), Tile::new(5, 5)));
        assert_eq!(found, vec![6, 3, 2, 1, 4, 5]);
    }

    #[test]
    fn test_find_nearest_crosses_tile_edge() {
        // the point sits at the east edge of tile (0,0); the nearest car is
        // just across the border in tile (1,0)
        let list = TileIndexedList::new(vec![car(1, 0.0, 0.0), car(2, 1030.0, 0.0)]);
        let first = list
            .find_nearest(PointD::new(1020.0, 0.0), Tile::new(-1, -1), Tile::new(1, 1))
            .next()
            .map(|c| c.car_id);
        assert_eq!(first, Some(2));
    }

    #[test]
    fn test_find_nearest_respects_bounds() {
        let list = TileIndexedList::new(sample_cars());
        let found = ids(list.find_nearest(PointD::new(2000.0, 0.0), Tile::new(-1, -1), Tile::new(0, 0)));
        assert_eq!(found, vec![2, 1]);
        assert_eq!(list.find_nearest(PointD::new(0.0, 0.0), Tile::new(1, 1), Tile::new(0, 0)).count(), 0);
    }

    #[test]
    fn test_find_nearest_never_skips_closer_item() {
        let cars: Vec<CarLocation> = (0..40)
            .map(|i| {
                let f = f64::from(i);
                car(i, (f * 733.0) % 9000.0 - 4500.0, (f * 1291.0) % 9000.0 - 4500.0)
            })
            .collect();
        let list = TileIndexedList::new(cars.clone());
        for probe in [PointD::new(0.0, 0.0), PointD::new(-3000.0, 1500.0), PointD::new(4000.0, -4000.0)] {
            let first = list
                .find_nearest(probe, Tile::new(-10, -10), Tile::new(10, 10))
                .next()
                .expect("index is not empty");
            let best = cars
                .iter()
                .map(|c| c.distance_squared(probe))
                .fold(f64::INFINITY, f64::min);
            assert!((first.distance_squared(probe) - best).abs() < 1e-9);
        }
    }

    #[test]
    fn test_find_nearest_with_segments_reaching_across_tiles() {
        // filed in tile (1, 0) but running back to within 50 of the query
        let long = TrackSegment::straight(SegmentKind::Rail, 1, PointD::new(1100.0, 50.0), PointD::new(800.0, 50.0));
        let short = TrackSegment::straight(SegmentKind::Rail, 2, PointD::new(900.0, 100.0), PointD::new(900.0, 110.0));
        assert_eq!(long.tile(), Tile::new(1, 0));
        assert_eq!(short.tile(), Tile::new(0, 0));

        let list = TileIndexedList::new(vec![long, short]);
        assert!((list.max_reach() - 300.0).abs() < 1e-9);
        let order: Vec<u32> = list
            .find_nearest(PointD::new(900.0, 0.0), Tile::new(-2, -2), Tile::new(2, 2))
            .map(|segment| segment.node_index)
            .collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn test_point_items_have_no_reach() {
        let list = TileIndexedList::new(sample_cars());
        assert_eq!(list.max_reach(), 0.0);
    }
}
