//! World-space value types shared by the network, the spatial index and paths.
//!
//! World coordinates are a flat 2D plane: `x` grows east and `y` grows north.
//! A heading `h` (radians) points along `(sin h, cos h)`, so `0` is north and
//! `π/2` is east.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::constants::{HALF_TILE_SIZE, TILE_SIZE};

/// A point in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointD {
    pub x: f64,
    pub y: f64,
}

impl PointD {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector for a heading
    #[must_use]
    pub fn from_heading(heading: f64) -> Self {
        Self::new(heading.sin(), heading.cos())
    }

    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// The tile containing this point
    #[must_use]
    pub fn tile(self) -> Tile {
        Tile::from_point(self)
    }
}

impl Add for PointD {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for PointD {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for PointD {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Coarse grid cell used to partition the world for indexing.
///
/// Tile `(x, z)` is centred on `(x * TILE_SIZE, z * TILE_SIZE)`. The `z`
/// coordinate follows the world's north axis (`PointD::y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub z: i32,
}

impl Tile {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    #[must_use]
    pub fn from_point(point: PointD) -> Self {
        Self::new(tile_coordinate(point.x), tile_coordinate(point.y))
    }

    /// South-west corner of the tile in world space
    #[must_use]
    pub fn corner_min(self) -> PointD {
        PointD::new(
            f64::from(self.x) * TILE_SIZE - HALF_TILE_SIZE,
            f64::from(self.z) * TILE_SIZE - HALF_TILE_SIZE,
        )
    }

    /// North-east corner of the tile in world space
    #[must_use]
    pub fn corner_max(self) -> PointD {
        PointD::new(
            f64::from(self.x) * TILE_SIZE + HALF_TILE_SIZE,
            f64::from(self.z) * TILE_SIZE + HALF_TILE_SIZE,
        )
    }

    #[must_use]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }

    /// Number of tile rings between two tiles
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// True if this tile lies in the inclusive rectangle spanned by two corners
    #[must_use]
    pub fn within(self, bottom_left: Self, top_right: Self) -> bool {
        (bottom_left.x..=top_right.x).contains(&self.x)
            && (bottom_left.z..=top_right.z).contains(&self.z)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn tile_coordinate(value: f64) -> i32 {
    ((value + HALF_TILE_SIZE) / TILE_SIZE).floor() as i32
}

/// A straight 2D vector with a start and an end
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointVector {
    pub start: PointD,
    pub end: PointD,
}

impl PointVector {
    #[must_use]
    pub const fn new(start: PointD, end: PointD) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Heading from start to end
    #[must_use]
    pub fn heading(&self) -> f64 {
        let delta = self.end - self.start;
        delta.x.atan2(delta.y)
    }

    /// Distance from `point` to the closest point of this vector
    #[must_use]
    pub fn distance_to(&self, point: PointD) -> f64 {
        point_to_line_segment_distance(point, self.start, self.end)
    }
}

/// Axis-aligned bounds, grown incrementally
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// Bounds containing nothing; including any point makes them non-empty
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include(&mut self, point: PointD) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    #[must_use]
    pub fn union(mut self, other: &Self) -> Self {
        if other.is_empty() {
            return self;
        }
        self.include(PointD::new(other.min_x, other.min_y));
        self.include(PointD::new(other.max_x, other.max_y));
        self
    }

    /// Corner with the smallest `x` and largest `y` (map top-left)
    #[must_use]
    pub fn top_left(&self) -> PointD {
        PointD::new(self.min_x, self.max_y)
    }

    /// Corner with the largest `x` and smallest `y` (map bottom-right)
    #[must_use]
    pub fn bottom_right(&self) -> PointD {
        PointD::new(self.max_x, self.min_y)
    }

    #[must_use]
    pub fn mid_point(&self) -> PointD {
        PointD::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    #[must_use]
    pub fn contains(&self, point: PointD) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }
}

/// Calculates the shortest angular distance between two angles in radians.
///
/// Returns a value in the range [0, π], representing the smallest angle
/// between the two input angles when considering the circular nature of angles.
///
/// # Examples
/// ```
/// use std::f64::consts::PI;
/// use rail_topology::geometry::angle_difference;
///
/// // Angles wrapping around (350° and 10° are only 20° apart)
/// let diff = angle_difference(350.0 * PI / 180.0, 10.0 * PI / 180.0);
/// assert!((diff - 20.0 * PI / 180.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn angle_difference(a1: f64, a2: f64) -> f64 {
    let diff = normalize_angle(a1 - a2).abs();
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

/// Wraps an angle into the range [0, 2π)
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Unit vector pointing to the right of a heading
#[must_use]
pub fn right_of(heading: f64) -> PointD {
    PointD::from_heading(heading + FRAC_PI_2)
}

/// Calculates the minimum distance from a point to a line segment.
///
/// # Arguments
/// * `point` - The point to measure from
/// * `seg_start` - Starting point of the line segment
/// * `seg_end` - Ending point of the line segment
#[must_use]
pub fn point_to_line_segment_distance(point: PointD, seg_start: PointD, seg_end: PointD) -> f64 {
    let delta = seg_end - seg_start;
    let len_sq = delta.dot(delta);

    if len_sq == 0.0 {
        return point.distance(seg_start);
    }

    let t = ((point - seg_start).dot(delta) / len_sq).clamp(0.0, 1.0);
    point.distance(seg_start + delta * t)
}
