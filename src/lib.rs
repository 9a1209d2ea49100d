#![allow(clippy::implicit_hasher)]
#![allow(unknown_lints)]
#![allow(clippy::manual_is_multiple_of)]

pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod models;
pub mod spatial_index;

#[doc(hidden)]
pub use ::log as __log;

pub use config::TopologyConfig;
pub use error::TopologyError;
pub use geometry::{Bounds, PointD, PointVector, Tile};
pub use models::{
    JunctionConnectivityResolver, NetworkModel, PathFile, PathNode, PathNodeType, PathPoint, PathSection, PathType,
    RouteTopology, SegmentKind, TrackDatabase, TrainPath, ValidationResult,
};
pub use spatial_index::{CarLocation, TileIndexedList, TileItem};
