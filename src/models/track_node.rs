use serde::{Deserialize, Serialize};

use crate::constants::{FLOAT_TOLERANCE, NO_NODE};
use crate::geometry::{Bounds, PointD};
use crate::models::source::TrackPin;
use crate::models::track_segment::{Projection, TrackSegment};

/// A run of track between two other nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorNode {
    pub index: u32,
    pub pins: Vec<TrackPin>,
    /// Segments in construction order, each starting where the previous ends
    pub segments: Vec<TrackSegment>,
    pub length: f64,
    pub bounds: Bounds,
}

impl VectorNode {
    /// Node connected at the start (offset 0)
    #[must_use]
    pub fn start_link(&self) -> u32 {
        self.pins.first().map_or(NO_NODE, |pin| pin.link)
    }

    /// Node connected at the end (offset `length`)
    #[must_use]
    pub fn end_link(&self) -> u32 {
        self.pins.get(1).map_or(NO_NODE, |pin| pin.link)
    }

    #[must_use]
    pub fn start_location(&self) -> PointD {
        self.segments.first().map_or_else(PointD::default, |segment| segment.location)
    }

    #[must_use]
    pub fn end_location(&self) -> PointD {
        self.segments.last().map_or_else(PointD::default, |segment| segment.end_location)
    }

    /// Offset along the node at which another node is attached
    #[must_use]
    pub fn offset_of_link(&self, link: u32) -> Option<f64> {
        if self.start_link() == link {
            Some(0.0)
        } else if self.end_link() == link {
            Some(self.length)
        } else {
            None
        }
    }

    /// Closest point of the node to `point`, as an offset from the node start
    #[must_use]
    pub fn project(&self, point: PointD) -> Option<Projection> {
        self.segments
            .iter()
            .map(|segment| {
                let projection = segment.project(point);
                Projection {
                    offset: segment.node_offset + projection.offset,
                    distance: projection.distance,
                }
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// World location at an offset from the node start
    #[must_use]
    pub fn location_at(&self, offset: f64) -> PointD {
        let offset = offset.clamp(0.0, self.length);
        self.segments
            .iter()
            .find(|segment| offset <= segment.node_end_offset())
            .or_else(|| self.segments.last())
            .map_or_else(PointD::default, |segment| segment.location_at(offset - segment.node_offset))
    }

    /// Clipped copies of the segments covering the offsets between `from` and
    /// `to`, in node order. Slivers shorter than the float tolerance are left
    /// out.
    #[must_use]
    pub fn segments_between(&self, from: f64, to: f64) -> Vec<TrackSegment> {
        let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
        self.segments
            .iter()
            .filter(|segment| segment.node_end_offset() > lo + FLOAT_TOLERANCE && segment.node_offset < hi - FLOAT_TOLERANCE)
            .map(|segment| segment.clip(lo - segment.node_offset, hi - segment.node_offset))
            .collect()
    }
}

/// A switch joining one trailing connection to two or more routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JunctionNode {
    pub index: u32,
    pub location: PointD,
    pub pins: Vec<TrackPin>,
    pub shape_index: u32,
    /// Selector among the outgoing pins taken from the junction's shape
    pub main_route: u32,
    /// Node reached through the main-route pin
    pub main_route_node: u32,
}

impl JunctionNode {
    #[must_use]
    pub fn is_main_route(&self, node: u32) -> bool {
        node != NO_NODE && node == self.main_route_node
    }

    /// Indices of every node connected to this junction
    pub fn links(&self) -> impl Iterator<Item = u32> + '_ {
        self.pins.iter().map(|pin| pin.link)
    }
}

/// A buffer stop terminating a vector node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndNode {
    pub index: u32,
    pub location: PointD,
    pub pin: TrackPin,
    /// Angle of the rendered end stub, a quarter-turn from the track heading
    pub direction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrackNode {
    Vector(VectorNode),
    Junction(JunctionNode),
    End(EndNode),
}

impl TrackNode {
    #[must_use]
    pub fn index(&self) -> u32 {
        match self {
            TrackNode::Vector(v) => v.index,
            TrackNode::Junction(j) => j.index,
            TrackNode::End(e) => e.index,
        }
    }

    #[must_use]
    pub fn pins(&self) -> &[TrackPin] {
        match self {
            TrackNode::Vector(v) => &v.pins,
            TrackNode::Junction(j) => &j.pins,
            TrackNode::End(e) => std::slice::from_ref(&e.pin),
        }
    }

    #[must_use]
    pub fn is_junction(&self) -> bool {
        matches!(self, TrackNode::Junction(_))
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&VectorNode> {
        match self {
            TrackNode::Vector(v) => Some(v),
            TrackNode::Junction(_) | TrackNode::End(_) => None,
        }
    }

    #[must_use]
    pub fn as_junction(&self) -> Option<&JunctionNode> {
        match self {
            TrackNode::Junction(j) => Some(j),
            TrackNode::Vector(_) | TrackNode::End(_) => None,
        }
    }

    #[must_use]
    pub fn as_end(&self) -> Option<&EndNode> {
        match self {
            TrackNode::End(e) => Some(e),
            TrackNode::Vector(_) | TrackNode::Junction(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::source::{TrackSection, TrackVectorSection};
    use crate::models::track_segment::SegmentKind;

    fn two_piece_node() -> VectorNode {
        let first = TrackSegment::from_section(
            SegmentKind::Rail,
            1,
            0,
            &TrackVectorSection { section_index: 1, location: PointD::new(0.0, 0.0), direction: 0.0 },
            &TrackSection::straight(1, 100.0),
            0.0,
        );
        let second = TrackSegment::from_section(
            SegmentKind::Rail,
            1,
            1,
            &TrackVectorSection { section_index: 1, location: PointD::new(0.0, 100.0), direction: 0.0 },
            &TrackSection::straight(1, 100.0),
            100.0,
        );
        VectorNode {
            index: 1,
            pins: vec![TrackPin::ahead(2), TrackPin::ahead(3)],
            segments: vec![first, second],
            length: 200.0,
            bounds: Bounds::empty(),
        }
    }

    #[test]
    fn test_vector_node_links() {
        let node = two_piece_node();
        assert_eq!(node.start_link(), 2);
        assert_eq!(node.end_link(), 3);
        assert_eq!(node.offset_of_link(2), Some(0.0));
        assert_eq!(node.offset_of_link(3), Some(200.0));
        assert_eq!(node.offset_of_link(9), None);
    }

    #[test]
    fn test_vector_node_projection() {
        let node = two_piece_node();
        let projection = node.project(PointD::new(0.5, 150.0)).expect("node has segments");
        assert!((projection.offset - 150.0).abs() < 1e-9);
        assert!((projection.distance - 0.5).abs() < 1e-9);
        assert!(node.location_at(150.0).distance(PointD::new(0.0, 150.0)) < 1e-9);
    }

    #[test]
    fn test_segments_between_clips_both_ends() {
        let node = two_piece_node();
        let pieces = node.segments_between(150.0, 50.0);
        assert_eq!(pieces.len(), 2);
        let total: f64 = pieces.iter().map(|s| s.length).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((pieces[0].node_offset - 50.0).abs() < 1e-9);
        assert!(pieces[1].end_location.distance(PointD::new(0.0, 150.0)) < 1e-9);
    }

    #[test]
    fn test_node_wrapper() {
        let node = TrackNode::Vector(two_piece_node());
        assert_eq!(node.index(), 1);
        assert_eq!(node.pins().len(), 2);
        assert!(node.as_vector().is_some());
        assert!(node.as_junction().is_none());
        assert!(!node.is_junction());
    }
}
