use std::f64::consts::{FRAC_PI_2, PI};

use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;

use crate::config::TopologyConfig;
use crate::constants::{NO_NODE, TILE_SIZE};
use crate::error::TopologyError;
use crate::geometry::{Bounds, PointD, Tile};
use crate::log;
use crate::models::path_point::PathPoint;
use crate::models::source::{
    PinDirection, RawEndNode, RawJunctionNode, RawTrackNode, RawVectorNode, TrackDatabase,
};
use crate::models::track_node::{EndNode, JunctionNode, TrackNode, VectorNode};
use crate::models::track_segment::{SegmentKind, TrackSegment};
use crate::spatial_index::{TileIndexedList, TileItem};

/// Location of a junction, filed in the junction lookup index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunctionMarker {
    pub index: u32,
    pub location: PointD,
}

impl TileItem for JunctionMarker {
    fn tile(&self) -> Tile {
        self.location.tile()
    }

    fn distance_squared(&self, point: PointD) -> f64 {
        self.location.distance_squared(point)
    }
}

/// A single vector node bridging two junctions, one reached from each end of
/// a connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntermediaryConnection {
    /// Vector node the start point lies on
    pub start_node: u32,
    /// Junction between `start_node` and `node`
    pub start_junction: u32,
    /// The bridging vector node
    pub node: u32,
    /// Junction between `node` and `end_node`
    pub end_junction: u32,
    /// Vector node the end point lies on
    pub end_node: u32,
}

/// Outcome of looking for an intermediary node
#[derive(Debug, Clone, PartialEq)]
pub enum Intermediary {
    None,
    Found(IntermediaryConnection),
    /// Several bridging nodes and none on a main route
    Ambiguous(Vec<IntermediaryConnection>),
}

/// Read-only topology and geometry of one route's track network.
///
/// Built once from a [`TrackDatabase`] and never patched; reloading a route
/// builds a fresh model.
#[derive(Debug, Clone)]
pub struct NetworkModel {
    kind: SegmentKind,
    config: TopologyConfig,
    nodes: Vec<Option<TrackNode>>,
    // Node `i` of the graph is track node `i`
    graph: UnGraph<u32, PinDirection>,
    segments: TileIndexedList<TrackSegment>,
    junctions: TileIndexedList<JunctionMarker>,
}

impl NetworkModel {
    /// Build the model for a rail or road database
    ///
    /// # Errors
    ///
    /// Returns an error if a node references a section, shape or node that
    /// does not exist, or if the node table is not densely indexed
    pub fn build(database: &TrackDatabase, kind: SegmentKind, config: &TopologyConfig) -> Result<Self, TopologyError> {
        #[cfg(feature = "perf_timing")]
        let started = std::time::Instant::now();

        if matches!(database.nodes.first(), Some(Some(_))) {
            return Err(TopologyError::ReservedNodeIndex);
        }

        let build_slot = |(slot, raw): (usize, &Option<RawTrackNode>)| -> Result<Option<TrackNode>, TopologyError> {
            raw.as_ref()
                .map(|raw| build_node(database, kind, slot, raw))
                .transpose()
        };

        let nodes: Vec<Option<TrackNode>> = if config.parallel_build {
            database.nodes.par_iter().enumerate().map(build_slot).collect::<Result<_, _>>()?
        } else {
            database.nodes.iter().enumerate().map(build_slot).collect::<Result<_, _>>()?
        };

        let mut graph = UnGraph::with_capacity(nodes.len(), nodes.len() * 2);
        for slot in 0..nodes.len() {
            graph.add_node(u32::try_from(slot).unwrap_or(u32::MAX));
        }
        for node in nodes.iter().flatten() {
            let from = NodeIndex::new(node.index() as usize);
            for pin in node.pins() {
                graph.update_edge(from, NodeIndex::new(pin.link as usize), pin.direction);
            }
        }

        let segments = TileIndexedList::new(
            nodes
                .iter()
                .flatten()
                .filter_map(TrackNode::as_vector)
                .flat_map(|vector| vector.segments.iter().cloned()),
        );
        let junctions = TileIndexedList::new(
            nodes
                .iter()
                .flatten()
                .filter_map(TrackNode::as_junction)
                .map(|junction| JunctionMarker { index: junction.index, location: junction.location }),
        );

        log!(
            "Built {:?} network: {} nodes, {} segments in {} tiles, {} junctions",
            kind,
            nodes.iter().flatten().count(),
            segments.len(),
            segments.tile_count(),
            junctions.len()
        );
        #[cfg(feature = "perf_timing")]
        log!("Network construction took {:.2}ms", started.elapsed().as_secs_f64() * 1000.0);

        Ok(Self {
            kind,
            config: config.clone(),
            nodes,
            graph,
            segments,
            junctions,
        })
    }

    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    #[must_use]
    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Size of the node table, including the reserved slot 0
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn node(&self, index: u32) -> Option<&TrackNode> {
        self.nodes.get(index as usize).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn vector_node(&self, index: u32) -> Option<&VectorNode> {
        self.node(index).and_then(TrackNode::as_vector)
    }

    #[must_use]
    pub fn junction_node(&self, index: u32) -> Option<&JunctionNode> {
        self.node(index).and_then(TrackNode::as_junction)
    }

    #[must_use]
    pub fn end_node(&self, index: u32) -> Option<&EndNode> {
        self.node(index).and_then(TrackNode::as_end)
    }

    /// Every real node in index order
    pub fn nodes(&self) -> impl Iterator<Item = &TrackNode> + '_ {
        self.nodes.iter().flatten()
    }

    /// Spatial index over all segments of all vector nodes
    #[must_use]
    pub fn segments(&self) -> &TileIndexedList<TrackSegment> {
        &self.segments
    }

    /// Bounds of every segment in the network
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.segments
            .iter()
            .fold(Bounds::empty(), |bounds, segment| bounds.union(&segment.bounds))
    }

    /// Indices of the nodes linked to `index` by a pin
    pub fn neighbours(&self, index: u32) -> impl Iterator<Item = u32> + '_ {
        self.graph
            .neighbors(NodeIndex::new(index as usize))
            .map(|neighbour| self.graph[neighbour])
    }

    /// Junctions at either end of a vector node
    #[must_use]
    pub fn junctions_of(&self, vector_node: u32) -> Vec<u32> {
        let mut junctions: Vec<u32> = self
            .neighbours(vector_node)
            .filter(|&index| self.junction_node(index).is_some())
            .collect();
        junctions.sort_unstable();
        junctions
    }

    /// Offset along `vector_node` at which `junction` is attached
    #[must_use]
    pub fn offset_of_junction(&self, vector_node: u32, junction: u32) -> Option<f64> {
        self.vector_node(vector_node)?.offset_of_link(junction)
    }

    /// Tiles around `location` to search, widened by the tiles an item can
    /// span beyond the one it is filed under
    fn search_range(&self, location: PointD, reach: f64) -> (Tile, Tile) {
        let tile = location.tile();
        #[allow(clippy::cast_possible_truncation)]
        let spill = (reach / TILE_SIZE).ceil().min(f64::from(i32::MAX)) as i32;
        let radius = self.config.search_radius_tiles.saturating_add(spill);
        (tile.offset(-radius, -radius), tile.offset(radius, radius))
    }

    /// The junction located within the proximity tolerance of `location`
    #[must_use]
    pub fn junction_at(&self, location: PointD) -> Option<&JunctionNode> {
        let (bottom_left, top_right) = self.search_range(location, self.junctions.max_reach());
        let tolerance = self.config.proximity_tolerance;
        self.junctions
            .find_nearest(location, bottom_left, top_right)
            .next()
            .filter(|marker| marker.location.distance(location) <= tolerance)
            .and_then(|marker| self.junction_node(marker.index))
    }

    /// All segments passing within the proximity tolerance of `location`,
    /// including segments that merely end there
    #[must_use]
    pub fn segments_at(&self, location: PointD) -> Vec<&TrackSegment> {
        let (bottom_left, top_right) = self.search_range(location, self.segments.max_reach());
        let tolerance = self.config.proximity_tolerance;
        self.segments
            .bounding_box(bottom_left, top_right)
            .filter(|segment| segment.project(location).distance <= tolerance)
            .collect()
    }

    /// Look for a single vector node joining a junction reachable from `start`
    /// to a junction reachable from `end`.
    ///
    /// When several nodes qualify the one on a junction's main route wins.
    #[must_use]
    pub fn find_intermediary_connection(&self, start: &PathPoint, end: &PathPoint) -> Intermediary {
        let start_nodes = start.node_indices();
        let end_nodes = end.node_indices();

        let mut candidates: Vec<IntermediaryConnection> = Vec::new();
        for &start_node in &start_nodes {
            for start_junction in self.junctions_of(start_node) {
                for node in self.neighbours(start_junction) {
                    if self.vector_node(node).is_none() || start_nodes.contains(&node) || end_nodes.contains(&node) {
                        continue;
                    }
                    for end_junction in self.junctions_of(node) {
                        if end_junction == start_junction {
                            continue;
                        }
                        for &end_node in &end_nodes {
                            let connection = IntermediaryConnection {
                                start_node,
                                start_junction,
                                node,
                                end_junction,
                                end_node,
                            };
                            if self.junctions_of(end_node).contains(&end_junction) && !candidates.contains(&connection) {
                                candidates.push(connection);
                            }
                        }
                    }
                }
            }
        }

        match candidates.len() {
            0 => Intermediary::None,
            1 => Intermediary::Found(candidates[0]),
            _ => candidates
                .iter()
                .find(|candidate| {
                    [candidate.start_junction, candidate.end_junction].iter().any(|&junction| {
                        self.junction_node(junction)
                            .is_some_and(|junction| junction.is_main_route(candidate.node))
                    })
                })
                .map_or(Intermediary::Ambiguous(candidates.clone()), |found| Intermediary::Found(*found)),
        }
    }
}

fn build_node(
    database: &TrackDatabase,
    kind: SegmentKind,
    slot: usize,
    raw: &RawTrackNode,
) -> Result<TrackNode, TopologyError> {
    let index = raw.index();
    if index as usize != slot {
        return Err(TopologyError::NodeIndexMismatch { slot, index });
    }
    for pin in raw.pins() {
        let link_exists = matches!(database.nodes.get(pin.link as usize), Some(Some(_)));
        if pin.link == NO_NODE || !link_exists {
            return Err(TopologyError::InvalidPinLink { node: index, link: pin.link });
        }
    }

    match raw {
        RawTrackNode::Vector(vector) => build_vector_node(database, kind, vector).map(TrackNode::Vector),
        RawTrackNode::Junction(junction) => build_junction_node(database, junction).map(TrackNode::Junction),
        RawTrackNode::End(end) => build_end_node(database, end).map(TrackNode::End),
    }
}

fn build_vector_node(
    database: &TrackDatabase,
    kind: SegmentKind,
    raw: &RawVectorNode,
) -> Result<VectorNode, TopologyError> {
    if raw.sections.is_empty() {
        return Err(TopologyError::EmptyVectorNode { node: raw.index });
    }

    let mut segments = Vec::with_capacity(raw.sections.len());
    let mut offset = 0.0;
    let mut bounds = Bounds::empty();
    for (position, placement) in raw.sections.iter().enumerate() {
        let section = database
            .section(placement.section_index)
            .ok_or(TopologyError::MissingSection { node: raw.index, section: placement.section_index })?;
        let segment = TrackSegment::from_section(kind, raw.index, position, placement, section, offset);
        offset += segment.length;
        bounds = bounds.union(&segment.bounds);
        segments.push(segment);
    }

    Ok(VectorNode {
        index: raw.index,
        pins: raw.pins.clone(),
        segments,
        length: offset,
        bounds,
    })
}

fn build_junction_node(database: &TrackDatabase, raw: &RawJunctionNode) -> Result<JunctionNode, TopologyError> {
    let shape = database
        .shape(raw.shape_index)
        .ok_or(TopologyError::MissingShape { node: raw.index, shape: raw.shape_index })?;
    // pins[0] is the trailing connection; routes start at pins[1]
    let main_pin = raw
        .pins
        .get(shape.main_route as usize + 1)
        .ok_or(TopologyError::InvalidMainRoute { node: raw.index, main_route: shape.main_route })?;

    Ok(JunctionNode {
        index: raw.index,
        location: raw.location,
        pins: raw.pins.clone(),
        shape_index: raw.shape_index,
        main_route: shape.main_route,
        main_route_node: main_pin.link,
    })
}

fn build_end_node(database: &TrackDatabase, raw: &RawEndNode) -> Result<EndNode, TopologyError> {
    let invalid_link = TopologyError::InvalidPinLink { node: raw.index, link: raw.pin.link };
    let Some(Some(RawTrackNode::Vector(vector))) = database.nodes.get(raw.pin.link as usize) else {
        return Err(invalid_link);
    };

    let at_start = vector.pins.first().is_some_and(|pin| pin.link == raw.index);
    let heading = if at_start {
        let first = vector.sections.first().ok_or(TopologyError::EmptyVectorNode { node: vector.index })?;
        // the track leaves the buffer stop heading into the node
        first.direction + PI
    } else {
        let last = vector.sections.last().ok_or(TopologyError::EmptyVectorNode { node: vector.index })?;
        let section = database
            .section(last.section_index)
            .ok_or(TopologyError::MissingSection { node: vector.index, section: last.section_index })?;
        let correction = if section.curved { section.angle.to_radians() } else { 0.0 };
        last.direction + correction
    };

    Ok(EndNode {
        index: raw.index,
        location: raw.location,
        pin: raw.pin,
        direction: heading - FRAC_PI_2,
    })
}
