use serde::{Deserialize, Serialize};

use crate::geometry::PointD;
use crate::models::network::NetworkModel;
use crate::models::path_node::{PathNode, PathNodeType};
use crate::models::track_node::JunctionNode;
use crate::models::track_segment::TrackSegment;

bitflags::bitflags! {
    /// Problems found while placing a path point on the network.
    ///
    /// An empty set means the point is valid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValidationResult: u8 {
        const NO_JUNCTION_NODE       = 0b0001;
        const NOT_ON_TRACK           = 0b0010;
        const NO_CONNECTION_POSSIBLE = 0b0100;
        const INVALID                = 0b1000;
    }
}

impl ValidationResult {
    pub const NONE: Self = Self::empty();

    /// Problems with the point's own location, which make every section
    /// touching it unusable
    pub const LOCATION: Self = Self::NO_JUNCTION_NODE.union(Self::NOT_ON_TRACK);
}

impl Serialize for ValidationResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for ValidationResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// A path node resolved against the network
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    pub node: PathNode,
    pub junction: Option<JunctionNode>,
    /// Every segment passing through the point's location
    pub segments: Vec<TrackSegment>,
    pub validation: ValidationResult,
    pub next_main: Option<usize>,
    pub next_siding: Option<usize>,
    /// Point whose main or siding link leads here
    pub previous: Option<usize>,
}

impl PathPoint {
    /// Resolve a raw node. Links are left unset.
    #[must_use]
    pub fn new(network: &NetworkModel, node: PathNode) -> Self {
        let segments: Vec<TrackSegment> = network.segments_at(node.location).into_iter().cloned().collect();
        let junction = if node.node_type.contains(PathNodeType::JUNCTION) {
            network.junction_at(node.location).cloned()
        } else {
            None
        };

        let mut validation = ValidationResult::NONE;
        if segments.is_empty() {
            log::warn!("Path point at ({:.1}, {:.1}) is not on track", node.location.x, node.location.y);
            validation |= ValidationResult::NOT_ON_TRACK;
        }
        if node.node_type.contains(PathNodeType::JUNCTION) && junction.is_none() {
            log::warn!("No junction at path point ({:.1}, {:.1})", node.location.x, node.location.y);
            validation |= ValidationResult::NO_JUNCTION_NODE;
        }

        Self {
            node,
            junction,
            segments,
            validation,
            next_main: None,
            next_siding: None,
            previous: None,
        }
    }

    /// A copy of this point with additional validation flags
    #[must_use]
    pub fn with_validation(&self, flags: ValidationResult) -> Self {
        Self {
            validation: self.validation | flags,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn location(&self) -> PointD {
        self.node.location
    }

    #[must_use]
    pub fn node_type(&self) -> PathNodeType {
        self.node.node_type
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation.is_empty()
    }

    /// True if the location itself could not be placed on the network
    #[must_use]
    pub fn is_misplaced(&self) -> bool {
        self.validation.intersects(ValidationResult::LOCATION)
    }

    /// Distinct indices of the vector nodes this point lies on, ascending
    #[must_use]
    pub fn node_indices(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self.segments.iter().map(|segment| segment.node_index).collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}
