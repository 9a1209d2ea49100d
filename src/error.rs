use thiserror::Error;

/// Failures that abort loading a route.
///
/// These indicate corrupt source tables rather than editing mistakes; problems
/// with a path (off-track points, unreachable links) are reported through
/// [`crate::models::ValidationResult`] instead.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("Track node {node} references missing track section {section}")]
    MissingSection { node: u32, section: u32 },

    #[error("Junction node {node} references missing track shape {shape}")]
    MissingShape { node: u32, shape: u32 },

    #[error("Track node {node} has a pin linking to invalid node {link}")]
    InvalidPinLink { node: u32, link: u32 },

    #[error("Node table fills reserved slot 0")]
    ReservedNodeIndex,

    #[error("Node in table slot {slot} declares index {index}")]
    NodeIndexMismatch { slot: usize, index: u32 },

    #[error("Vector node {node} has no track vector sections")]
    EmptyVectorNode { node: u32 },

    #[error("Junction node {node} has main route {main_route} but no matching pin")]
    InvalidMainRoute { node: u32, main_route: u32 },

    #[error("Failed to parse source data: {0}")]
    Json(#[from] serde_json::Error),
}
