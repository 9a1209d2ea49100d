//! Joining two path points with runs of track.
//!
//! Connections are tried in order: both points on one node, two nodes meeting
//! at one junction, then two nodes bridged by one intermediary node. When a
//! choice is ambiguous the junction's main route wins. Anything else becomes
//! an `Invalid` straight placeholder so the point stays visible to the editor.

use crate::models::network::{Intermediary, IntermediaryConnection, NetworkModel};
use crate::models::path_point::{PathPoint, ValidationResult};
use crate::models::path_section::{PathSection, PathType};

/// Sections joining two points, plus any flags for the end point
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub sections: Vec<PathSection>,
    pub validation: ValidationResult,
}

impl Resolution {
    fn connected(sections: Vec<PathSection>) -> Self {
        Self { sections, validation: ValidationResult::NONE }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.sections.iter().any(PathSection::is_invalid)
    }
}

/// A planned run along one vector node
#[derive(Debug, Clone, Copy, PartialEq)]
struct NodeRun {
    node: u32,
    from: f64,
    to: f64,
}

/// Two vector nodes meeting at a junction
#[derive(Debug, Clone, Copy, PartialEq)]
struct JunctionCandidate {
    start_node: u32,
    junction: u32,
    end_node: u32,
}

pub struct JunctionConnectivityResolver<'a> {
    network: &'a NetworkModel,
}

impl<'a> JunctionConnectivityResolver<'a> {
    #[must_use]
    pub fn new(network: &'a NetworkModel) -> Self {
        Self { network }
    }

    /// Sections from `start` to `end`, tagged `path_type` and owned by the
    /// point at index `end_point`
    #[must_use]
    pub fn resolve(&self, start: &PathPoint, end: &PathPoint, path_type: PathType, end_point: usize) -> Resolution {
        if start.is_misplaced() || end.is_misplaced() {
            return Self::placeholder(start, end, end_point, ValidationResult::NONE);
        }

        let runs = self.same_node(start, end).or_else(|| self.via_junction(start, end)).or_else(|| {
            match self.network.find_intermediary_connection(start, end) {
                Intermediary::Found(connection) => Some(self.via_intermediary(start, end, &connection)),
                Intermediary::None => None,
                Intermediary::Ambiguous(candidates) => {
                    log::warn!("{} intermediary nodes and no main route", candidates.len());
                    None
                }
            }
        });

        let Some(runs) = runs.flatten() else {
            log::warn!(
                "No connection from ({:.1}, {:.1}) to ({:.1}, {:.1})",
                start.location().x,
                start.location().y,
                end.location().x,
                end.location().y
            );
            return Self::placeholder(start, end, end_point, ValidationResult::NO_CONNECTION_POSSIBLE);
        };

        let sections = runs
            .iter()
            .filter_map(|run| {
                self.network
                    .vector_node(run.node)
                    .map(|node| PathSection::on_node(node, run.from, run.to, path_type, end_point))
            })
            .collect();
        Resolution::connected(sections)
    }

    fn placeholder(start: &PathPoint, end: &PathPoint, end_point: usize, validation: ValidationResult) -> Resolution {
        Resolution {
            sections: vec![PathSection::invalid(start.location(), end.location(), end_point)],
            validation,
        }
    }

    fn offset_on(&self, node: u32, point: &PathPoint) -> Option<f64> {
        self.network
            .vector_node(node)?
            .project(point.location())
            .map(|projection| projection.offset)
    }

    /// True if a junction at either point prefers `node`. Points placed on
    /// a junction without the junction flag still count.
    fn preferred_at_points(&self, node: u32, start: &PathPoint, end: &PathPoint) -> bool {
        [start, end]
            .into_iter()
            .filter_map(|point| point.junction.as_ref().or_else(|| self.network.junction_at(point.location())))
            .any(|junction| junction.is_main_route(node))
    }

    /// Both points on one vector node.
    ///
    /// `None` means the case does not apply; `Some(None)` means it applies but
    /// cannot be decided.
    #[allow(clippy::option_option)]
    fn same_node(&self, start: &PathPoint, end: &PathPoint) -> Option<Option<Vec<NodeRun>>> {
        let end_nodes = end.node_indices();
        let shared: Vec<u32> = start
            .node_indices()
            .into_iter()
            .filter(|node| end_nodes.contains(node))
            .collect();

        let node = match shared.as_slice() {
            [] => return None,
            [node] => *node,
            _ => match shared.iter().find(|&&node| self.preferred_at_points(node, start, end)) {
                Some(node) => *node,
                None => return Some(None),
            },
        };

        Some(
            self.offset_on(node, start)
                .zip(self.offset_on(node, end))
                .map(|(from, to)| vec![NodeRun { node, from, to }]),
        )
    }

    /// Two vector nodes meeting at one junction
    #[allow(clippy::option_option)]
    fn via_junction(&self, start: &PathPoint, end: &PathPoint) -> Option<Option<Vec<NodeRun>>> {
        let end_nodes = end.node_indices();
        let mut candidates = Vec::new();
        for start_node in start.node_indices() {
            for junction in self.network.junctions_of(start_node) {
                for &end_node in &end_nodes {
                    if end_node != start_node && self.network.junctions_of(end_node).contains(&junction) {
                        candidates.push(JunctionCandidate { start_node, junction, end_node });
                    }
                }
            }
        }

        let candidate = match candidates.as_slice() {
            [] => return None,
            [candidate] => *candidate,
            _ => {
                let preferred = candidates.iter().find(|candidate| {
                    self.network.junction_node(candidate.junction).is_some_and(|junction| {
                        junction.is_main_route(candidate.start_node) || junction.is_main_route(candidate.end_node)
                    })
                });
                match preferred {
                    Some(candidate) => *candidate,
                    None => return Some(None),
                }
            }
        };

        Some(self.runs_through_junction(start, end, candidate))
    }

    fn runs_through_junction(&self, start: &PathPoint, end: &PathPoint, candidate: JunctionCandidate) -> Option<Vec<NodeRun>> {
        let JunctionCandidate { start_node, junction, end_node } = candidate;
        Some(vec![
            NodeRun {
                node: start_node,
                from: self.offset_on(start_node, start)?,
                to: self.network.offset_of_junction(start_node, junction)?,
            },
            NodeRun {
                node: end_node,
                from: self.network.offset_of_junction(end_node, junction)?,
                to: self.offset_on(end_node, end)?,
            },
        ])
    }

    fn via_intermediary(&self, start: &PathPoint, end: &PathPoint, connection: &IntermediaryConnection) -> Option<Vec<NodeRun>> {
        let network = self.network;
        Some(vec![
            NodeRun {
                node: connection.start_node,
                from: self.offset_on(connection.start_node, start)?,
                to: network.offset_of_junction(connection.start_node, connection.start_junction)?,
            },
            NodeRun {
                node: connection.node,
                from: network.offset_of_junction(connection.node, connection.start_junction)?,
                to: network.offset_of_junction(connection.node, connection.end_junction)?,
            },
            NodeRun {
                node: connection.end_node,
                from: network.offset_of_junction(connection.end_node, connection.end_junction)?,
                to: self.offset_on(connection.end_node, end)?,
            },
        ])
    }
}
