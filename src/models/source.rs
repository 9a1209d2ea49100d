//! Raw track tables as produced by the route file readers.

use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::geometry::PointD;

/// Which end of the linked node a pin attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDirection {
    Ahead,
    Reverse,
}

/// One connection from a track node to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPin {
    pub link: u32,
    pub direction: PinDirection,
}

impl TrackPin {
    #[must_use]
    pub const fn ahead(link: u32) -> Self {
        Self { link, direction: PinDirection::Ahead }
    }

    #[must_use]
    pub const fn reverse(link: u32) -> Self {
        Self { link, direction: PinDirection::Reverse }
    }
}

/// Geometric definition of one piece of track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSection {
    pub index: u32,
    /// Length of a straight section; ignored for curves
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub curved: bool,
    #[serde(default)]
    pub radius: f64,
    /// Sweep of a curved section in degrees, positive turning clockwise
    #[serde(default)]
    pub angle: f64,
}

impl TrackSection {
    #[must_use]
    pub fn straight(index: u32, length: f64) -> Self {
        Self { index, length, curved: false, radius: 0.0, angle: 0.0 }
    }

    #[must_use]
    pub fn curve(index: u32, radius: f64, angle: f64) -> Self {
        Self { index, length: 0.0, curved: true, radius, angle }
    }

    /// Length along the track
    #[must_use]
    pub fn track_length(&self) -> f64 {
        if self.curved {
            self.radius * self.angle.to_radians().abs()
        } else {
            self.length
        }
    }
}

/// Shape of a junction: which outgoing route is the main (straight) one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackShape {
    pub index: u32,
    /// Zero-based selector among the junction's outgoing pins
    pub main_route: u32,
}

/// Placement of one track section on a vector node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackVectorSection {
    pub section_index: u32,
    pub location: PointD,
    /// Heading at the start of the section, in radians
    pub direction: f64,
}

/// Raw vector node: a run of track between two other nodes.
///
/// `pins[0]` is the node at its start, `pins[1]` the node at its end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVectorNode {
    pub index: u32,
    pub pins: Vec<TrackPin>,
    pub sections: Vec<TrackVectorSection>,
}

/// Raw junction node: `pins[0]` is the trailing (incoming) connection, the
/// rest are the outgoing routes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawJunctionNode {
    pub index: u32,
    pub location: PointD,
    pub shape_index: u32,
    pub pins: Vec<TrackPin>,
}

/// Raw end node: a buffer stop with one back-link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEndNode {
    pub index: u32,
    pub location: PointD,
    pub pin: TrackPin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawTrackNode {
    Vector(RawVectorNode),
    Junction(RawJunctionNode),
    End(RawEndNode),
}

impl RawTrackNode {
    #[must_use]
    pub fn index(&self) -> u32 {
        match self {
            RawTrackNode::Vector(node) => node.index,
            RawTrackNode::Junction(node) => node.index,
            RawTrackNode::End(node) => node.index,
        }
    }

    #[must_use]
    pub fn pins(&self) -> &[TrackPin] {
        match self {
            RawTrackNode::Vector(node) => &node.pins,
            RawTrackNode::Junction(node) => &node.pins,
            RawTrackNode::End(node) => std::slice::from_ref(&node.pin),
        }
    }
}

/// The full raw input for one route's rail or road network.
///
/// `nodes` is indexed by node id; slot 0 is reserved and must be `None`.
/// Sections and shapes are looked up by their `index` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackDatabase {
    pub nodes: Vec<Option<RawTrackNode>>,
    pub sections: Vec<TrackSection>,
    pub shapes: Vec<TrackShape>,
}

impl TrackDatabase {
    /// Parse a database from JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the database to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String, TopologyError> {
        Ok(serde_json::to_string(self)?)
    }

    #[must_use]
    pub fn section(&self, index: u32) -> Option<&TrackSection> {
        self.sections.iter().find(|section| section.index == index)
    }

    #[must_use]
    pub fn shape(&self, index: u32) -> Option<&TrackShape> {
        self.shapes.iter().find(|shape| shape.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_length() {
        let curve = TrackSection::curve(1, 100.0, -90.0);
        assert!((curve.track_length() - 100.0 * std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert_eq!(TrackSection::straight(2, 25.0).track_length(), 25.0);
    }

    #[test]
    fn test_end_node_pins() {
        let node = RawTrackNode::End(RawEndNode {
            index: 3,
            location: PointD::new(0.0, 0.0),
            pin: TrackPin::reverse(1),
        });
        assert_eq!(node.index(), 3);
        assert_eq!(node.pins(), &[TrackPin::reverse(1)]);
    }

    #[test]
    fn test_database_json() {
        let json = r#"{
            "nodes": [
                null,
                { "type": "End", "index": 1, "location": { "x": 0.0, "y": 0.0 },
                  "pin": { "link": 2, "direction": "Ahead" } }
            ],
            "sections": [ { "index": 7, "length": 50.0 } ],
            "shapes": [ { "index": 4, "main_route": 1 } ]
        }"#;
        let db = TrackDatabase::from_json(json).expect("database should parse");
        assert_eq!(db.nodes.len(), 2);
        assert!(db.nodes[0].is_none());
        assert_eq!(db.section(7).map(TrackSection::track_length), Some(50.0));
        assert_eq!(db.shape(4).map(|s| s.main_route), Some(1));
        assert!(db.section(8).is_none());

        let again = TrackDatabase::from_json(&db.to_json().expect("serializes")).expect("parses");
        assert_eq!(again, db);
    }
}
