mod connectivity;
mod network;
mod path_node;
mod path_point;
mod path_section;
mod route;
mod source;
mod track_node;
mod track_segment;
mod train_path;

#[cfg(test)]
pub(crate) mod fixtures;

pub use connectivity::{JunctionConnectivityResolver, Resolution};
pub use network::{Intermediary, IntermediaryConnection, JunctionMarker, NetworkModel};
pub use path_node::{PathFile, PathNode, PathNodeType, NO_NEXT_NODE};
pub use path_point::{PathPoint, ValidationResult};
pub use path_section::{PathSection, PathType};
pub use route::RouteTopology;
pub use source::{
    PinDirection, RawEndNode, RawJunctionNode, RawTrackNode, RawVectorNode, TrackDatabase, TrackPin, TrackSection,
    TrackShape, TrackVectorSection,
};
pub use track_node::{EndNode, JunctionNode, TrackNode, VectorNode};
pub use track_segment::{Projection, SegmentKind, TrackSegment};
pub use train_path::TrainPath;
