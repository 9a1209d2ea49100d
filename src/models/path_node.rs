use serde::{Deserialize, Serialize};

use crate::error::TopologyError;
use crate::geometry::PointD;

/// Raw link value meaning "no next node"
pub const NO_NEXT_NODE: i32 = -1;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PathNodeType: u16 {
        const START        = 0b0_0000_0001;
        const END          = 0b0_0000_0010;
        const INTERMEDIATE = 0b0_0000_0100;
        const JUNCTION     = 0b0_0000_1000;
        const SIDING_START = 0b0_0001_0000;
        const SIDING_END   = 0b0_0010_0000;
        const REVERSE      = 0b0_0100_0000;
        const WAIT         = 0b0_1000_0000;
        const TEMPORARY    = 0b1_0000_0000;
    }
}

impl Default for PathNodeType {
    fn default() -> Self {
        Self::INTERMEDIATE
    }
}

impl PathNodeType {
    /// Short label for editor display
    #[must_use]
    pub fn to_display_string(self) -> String {
        let mut parts = Vec::new();
        if self.contains(Self::START) { parts.push("Start"); }
        if self.contains(Self::END) { parts.push("End"); }
        if self.contains(Self::INTERMEDIATE) { parts.push("Intermediate"); }
        if self.contains(Self::JUNCTION) { parts.push("Junction"); }
        if self.contains(Self::SIDING_START) { parts.push("Siding start"); }
        if self.contains(Self::SIDING_END) { parts.push("Siding end"); }
        if self.contains(Self::REVERSE) { parts.push("Reverse"); }
        if self.contains(Self::WAIT) { parts.push("Wait"); }
        if self.contains(Self::TEMPORARY) { parts.push("Temporary"); }
        parts.join(", ")
    }
}

impl Serialize for PathNodeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> Deserialize<'de> for PathNodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

const fn no_next_node() -> i32 {
    NO_NEXT_NODE
}

/// A waypoint as persisted in a path file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub location: PointD,
    #[serde(default)]
    pub node_type: PathNodeType,
    /// Index of the next node along the main path, or -1
    #[serde(default = "no_next_node")]
    pub next_main: i32,
    /// Index of the next node along the passing path, or -1
    #[serde(default = "no_next_node")]
    pub next_siding: i32,
    /// Seconds to wait at a `WAIT` node
    #[serde(default)]
    pub wait_time: u32,
}

impl PathNode {
    #[must_use]
    pub fn new(location: PointD, node_type: PathNodeType) -> Self {
        Self {
            location,
            node_type,
            next_main: NO_NEXT_NODE,
            next_siding: NO_NEXT_NODE,
            wait_time: 0,
        }
    }

    #[must_use]
    pub fn with_next_main(mut self, next: usize) -> Self {
        self.next_main = i32::try_from(next).unwrap_or(NO_NEXT_NODE);
        self
    }

    #[must_use]
    pub fn with_next_siding(mut self, next: usize) -> Self {
        self.next_siding = i32::try_from(next).unwrap_or(NO_NEXT_NODE);
        self
    }
}

/// A path as persisted: a name and its raw, index-linked nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathFile {
    pub name: String,
    pub nodes: Vec<PathNode>,
}

impl PathFile {
    /// Parse a path file from JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self, TopologyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the path file to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> Result<String, TopologyError> {
        Ok(serde_json::to_string(self)?)
    }
}
