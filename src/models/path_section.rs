use serde::{Deserialize, Serialize};

use crate::constants::NO_NODE;
use crate::geometry::{Bounds, PointD};
use crate::models::track_node::VectorNode;
use crate::models::track_segment::{SegmentKind, TrackSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathType {
    MainPath,
    PassingPath,
    /// Placeholder drawn between points that could not be connected
    Invalid,
}

/// A directed run of track on a single node between two path points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSection {
    pub path_type: PathType,
    /// Track node travelled; 0 for placeholders
    pub node_index: u32,
    /// Segments in travel order
    pub segments: Vec<TrackSegment>,
    /// Travel runs against the node's construction order
    pub reverse: bool,
    pub start: PointD,
    pub end: PointD,
    pub length: f64,
    pub bounds: Bounds,
    /// Index of the path point this section leads to
    pub end_point: usize,
}

impl PathSection {
    /// The part of `node` between two offsets, travelled from `from` to `to`
    #[must_use]
    pub fn on_node(node: &VectorNode, from: f64, to: f64, path_type: PathType, end_point: usize) -> Self {
        let reverse = to < from;
        let mut segments = node.segments_between(from, to);
        if reverse {
            segments.reverse();
        }

        let mut bounds = Bounds::empty();
        let start = node.location_at(from);
        let end = node.location_at(to);
        bounds.include(start);
        bounds.include(end);
        for segment in &segments {
            bounds = bounds.union(&segment.bounds);
        }

        Self {
            path_type,
            node_index: node.index,
            segments,
            reverse,
            start,
            end,
            length: (to - from).abs(),
            bounds,
            end_point,
        }
    }

    /// A straight placeholder between two raw locations
    #[must_use]
    pub fn invalid(start: PointD, end: PointD, end_point: usize) -> Self {
        let segment = TrackSegment::straight(SegmentKind::TrainPath, NO_NODE, start, end);
        Self {
            path_type: PathType::Invalid,
            node_index: NO_NODE,
            length: segment.length,
            bounds: segment.bounds,
            segments: vec![segment],
            reverse: false,
            start,
            end,
            end_point,
        }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.path_type == PathType::Invalid
    }
}
