use std::f64::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::geometry::{normalize_angle, right_of, Bounds, PointD, PointVector, Tile};
use crate::models::source::{TrackSection, TrackVectorSection};
use crate::spatial_index::TileItem;

/// What a segment describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Rail,
    Road,
    /// A piece of rail clipped to a train path, or a placeholder link
    TrainPath,
}

impl SegmentKind {
    pub const COUNT: usize = 3;
    pub const ALL: [SegmentKind; SegmentKind::COUNT] = [SegmentKind::Rail, SegmentKind::Road, SegmentKind::TrainPath];

    /// Slot of this kind in per-kind arrays
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

const _: () = {
    let mut slot = 0;
    while slot < SegmentKind::COUNT {
        assert!(SegmentKind::ALL[slot].index() == slot);
        slot += 1;
    }
};

/// Where a point falls relative to a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Offset along the segment of the closest point, in `0..=length`
    pub offset: f64,
    /// Distance from the point to the closest point on the segment
    pub distance: f64,
}

/// One straight or circular piece of track, placed in the world.
///
/// Curved segments turn by `angle` radians over their length; a positive angle
/// turns clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub kind: SegmentKind,
    /// Track node this segment belongs to; 0 for placeholder links
    pub node_index: u32,
    /// Position of the segment within its node
    pub section_index: usize,
    pub location: PointD,
    /// Heading at `location`
    pub direction: f64,
    pub length: f64,
    pub curved: bool,
    pub radius: f64,
    pub angle: f64,
    /// Distance from the start of the node to `location`
    pub node_offset: f64,
    pub end_location: PointD,
    pub bounds: Bounds,
}

impl TrackSegment {
    /// Place a section on a node
    #[must_use]
    pub fn from_section(
        kind: SegmentKind,
        node_index: u32,
        section_index: usize,
        placement: &TrackVectorSection,
        section: &TrackSection,
        node_offset: f64,
    ) -> Self {
        let curved = section.curved && section.radius > 0.0;
        Self::build(
            kind,
            node_index,
            section_index,
            placement.location,
            placement.direction,
            section.track_length(),
            curved,
            section.radius,
            if curved { section.angle.to_radians() } else { 0.0 },
            node_offset,
        )
    }

    /// A straight segment between two arbitrary points
    #[must_use]
    pub fn straight(kind: SegmentKind, node_index: u32, from: PointD, to: PointD) -> Self {
        let vector = PointVector::new(from, to);
        Self::build(kind, node_index, 0, from, vector.heading(), vector.length(), false, 0.0, 0.0, 0.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        kind: SegmentKind,
        node_index: u32,
        section_index: usize,
        location: PointD,
        direction: f64,
        length: f64,
        curved: bool,
        radius: f64,
        angle: f64,
        node_offset: f64,
    ) -> Self {
        let mut segment = Self {
            kind,
            node_index,
            section_index,
            location,
            direction,
            length,
            curved,
            radius,
            angle,
            node_offset,
            end_location: location,
            bounds: Bounds::empty(),
        };
        segment.end_location = segment.location_at(length);
        segment.bounds = segment.compute_bounds();
        segment
    }

    fn turn_sign(&self) -> f64 {
        if self.angle < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    fn center(&self) -> PointD {
        self.location + right_of(self.direction) * (self.turn_sign() * self.radius)
    }

    /// Offset of this segment's end along its node
    #[must_use]
    pub fn node_end_offset(&self) -> f64 {
        self.node_offset + self.length
    }

    /// Heading at a distance along the segment
    #[must_use]
    pub fn heading_at(&self, offset: f64) -> f64 {
        let offset = offset.clamp(0.0, self.length);
        if self.curved {
            self.direction + self.turn_sign() * offset / self.radius
        } else {
            self.direction
        }
    }

    /// World location at a distance along the segment
    #[must_use]
    pub fn location_at(&self, offset: f64) -> PointD {
        let offset = offset.clamp(0.0, self.length);
        if self.curved {
            let heading = self.heading_at(offset);
            self.location + (right_of(self.direction) - right_of(heading)) * (self.turn_sign() * self.radius)
        } else {
            self.location + PointD::from_heading(self.direction) * offset
        }
    }

    /// Closest point on the segment to `point`
    #[must_use]
    pub fn project(&self, point: PointD) -> Projection {
        if !self.curved {
            let along = PointD::from_heading(self.direction);
            let offset = (point - self.location).dot(along).clamp(0.0, self.length);
            return Projection { offset, distance: point.distance(self.location_at(offset)) };
        }

        let sign = self.turn_sign();
        let center = self.center();
        let radial = point - center;
        let bearing = radial.x.atan2(radial.y);
        // bearing from the centre to the segment start
        let start_bearing = self.direction - sign * FRAC_PI_2;
        let swept = normalize_angle(sign * (bearing - start_bearing));
        let sweep = self.angle.abs();

        if swept <= sweep {
            return Projection {
                offset: (swept * self.radius).min(self.length),
                distance: (radial.length() - self.radius).abs(),
            };
        }

        let to_start = point.distance(self.location);
        let to_end = point.distance(self.end_location);
        if to_start <= to_end {
            Projection { offset: 0.0, distance: to_start }
        } else {
            Projection { offset: self.length, distance: to_end }
        }
    }

    /// The part of this segment between two local offsets, as a train path piece
    #[must_use]
    pub fn clip(&self, from: f64, to: f64) -> Self {
        let from = from.clamp(0.0, self.length);
        let to = to.clamp(from, self.length);
        let length = to - from;
        let angle = if self.curved { self.turn_sign() * length / self.radius } else { 0.0 };
        Self::build(
            SegmentKind::TrainPath,
            self.node_index,
            self.section_index,
            self.location_at(from),
            self.heading_at(from),
            length,
            self.curved && length > 0.0,
            self.radius,
            angle,
            self.node_offset + from,
        )
    }

    fn compute_bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        bounds.include(self.location);
        bounds.include(self.end_location);
        if !self.curved {
            return bounds;
        }

        // include every axis extreme the arc sweeps through
        let sign = self.turn_sign();
        let center = self.center();
        let start_bearing = self.direction - sign * FRAC_PI_2;
        let end_bearing = start_bearing + sign * self.angle.abs().min(TAU);
        let (lo, hi) = if start_bearing <= end_bearing {
            (start_bearing, end_bearing)
        } else {
            (end_bearing, start_bearing)
        };
        #[allow(clippy::cast_possible_truncation)]
        let first = (lo / FRAC_PI_2).ceil() as i64;
        #[allow(clippy::cast_possible_truncation)]
        let last = (hi / FRAC_PI_2).floor() as i64;
        for quarter in first..=last {
            #[allow(clippy::cast_precision_loss)]
            let bearing = quarter as f64 * FRAC_PI_2;
            bounds.include(center + PointD::from_heading(bearing) * self.radius);
        }
        bounds
    }
}

impl TileItem for TrackSegment {
    fn tile(&self) -> Tile {
        self.location.tile()
    }

    fn distance_squared(&self, point: PointD) -> f64 {
        let distance = self.project(point).distance;
        distance * distance
    }

    /// Distance from the start to the farthest corner of the bounds
    fn reach(&self) -> f64 {
        let Bounds { min_x, min_y, max_x, max_y } = self.bounds;
        [
            PointD::new(min_x, min_y),
            PointD::new(min_x, max_y),
            PointD::new(max_x, min_y),
            PointD::new(max_x, max_y),
        ]
        .into_iter()
        .map(|corner| self.location.distance(corner))
        .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn quarter_curve(angle_degrees: f64) -> TrackSegment {
        let placement = TrackVectorSection {
            section_index: 1,
            location: PointD::new(0.0, 0.0),
            direction: 0.0,
        };
        let section = TrackSection::curve(1, 100.0, angle_degrees);
        TrackSegment::from_section(SegmentKind::Rail, 5, 0, &placement, &section, 0.0)
    }

    fn close(a: PointD, b: PointD) -> bool {
        a.distance(b) < 1e-6
    }

    #[test]
    fn test_straight_segment() {
        let segment = TrackSegment::straight(SegmentKind::Rail, 1, PointD::new(0.0, 0.0), PointD::new(0.0, 50.0));
        assert!((segment.length - 50.0).abs() < 1e-9);
        assert!(close(segment.location_at(20.0), PointD::new(0.0, 20.0)));
        assert!(close(segment.end_location, PointD::new(0.0, 50.0)));

        let projection = segment.project(PointD::new(3.0, 10.0));
        assert!((projection.offset - 10.0).abs() < 1e-9);
        assert!((projection.distance - 3.0).abs() < 1e-9);

        let beyond = segment.project(PointD::new(0.0, 60.0));
        assert!((beyond.offset - 50.0).abs() < 1e-9);
        assert!((beyond.distance - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_clockwise_curve_geometry() {
        // heading north, turning right by 90 degrees around (100, 0)
        let segment = quarter_curve(90.0);
        assert!((segment.length - 50.0 * PI).abs() < 1e-9);
        assert!(close(segment.end_location, PointD::new(100.0, 100.0)));
        assert!((segment.heading_at(segment.length) - FRAC_PI_2).abs() < 1e-9);

        let mid = segment.location_at(segment.length / 2.0);
        let expected = PointD::new(100.0 - 100.0 * (PI / 4.0).cos(), 100.0 * (PI / 4.0).sin());
        assert!(close(mid, expected));
    }

    #[test]
    fn test_anticlockwise_curve_geometry() {
        let segment = quarter_curve(-90.0);
        assert!(close(segment.end_location, PointD::new(-100.0, 100.0)));
        assert!((segment.heading_at(segment.length) + FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_curve_projection() {
        let segment = quarter_curve(90.0);
        let on_arc = segment.location_at(30.0);
        let projection = segment.project(on_arc);
        assert!((projection.offset - 30.0).abs() < 1e-6);
        assert!(projection.distance < 1e-6);

        // a point outside the arc radius, half way round
        let outside = PointD::new(100.0 - 110.0 * (PI / 4.0).cos(), 110.0 * (PI / 4.0).sin());
        let projection = segment.project(outside);
        assert!((projection.distance - 10.0).abs() < 1e-6);
        assert!((projection.offset - segment.length / 2.0).abs() < 1e-6);

        // behind the start snaps to the start
        let behind = segment.project(PointD::new(0.0, -5.0));
        assert_eq!(behind.offset, 0.0);
        assert!((behind.distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_bounds_include_extremes() {
        // a half circle turning right bulges east of its end points
        let placement = TrackVectorSection { section_index: 1, location: PointD::new(0.0, 0.0), direction: 0.0 };
        let section = TrackSection::curve(1, 100.0, 180.0);
        let segment = TrackSegment::from_section(SegmentKind::Rail, 5, 0, &placement, &section, 0.0);
        assert!(close(segment.end_location, PointD::new(200.0, 0.0)));
        assert!((segment.bounds.max_y - 100.0).abs() < 1e-9);
        assert!((segment.bounds.min_y - 0.0).abs() < 1e-9);
        assert!((segment.bounds.max_x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_clip_keeps_geometry() {
        let segment = quarter_curve(90.0);
        let clipped = segment.clip(10.0, 40.0);
        assert_eq!(clipped.kind, SegmentKind::TrainPath);
        assert_eq!(clipped.node_index, 5);
        assert!((clipped.length - 30.0).abs() < 1e-9);
        assert!((clipped.node_offset - 10.0).abs() < 1e-9);
        assert!(close(clipped.location, segment.location_at(10.0)));
        assert!(close(clipped.end_location, segment.location_at(40.0)));
    }

    #[test]
    fn test_tile_item_distance() {
        let segment = TrackSegment::straight(SegmentKind::Road, 2, PointD::new(0.0, 0.0), PointD::new(10.0, 0.0));
        assert_eq!(segment.tile(), Tile::new(0, 0));
        assert!((segment.distance_squared(PointD::new(5.0, 2.0)) - 4.0).abs() < 1e-9);
    }
}
