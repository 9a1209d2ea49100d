//! Train paths: raw path nodes resolved into validated points and drawable
//! sections.

use crate::geometry::{Bounds, PointD};
use crate::models::connectivity::JunctionConnectivityResolver;
use crate::models::network::NetworkModel;
use crate::models::path_node::{PathFile, PathNode, PathNodeType, NO_NEXT_NODE};
use crate::models::path_point::{PathPoint, ValidationResult};
use crate::models::path_section::{PathSection, PathType};

/// Where a raw next-node index leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Unset,
    To(usize),
    Dangling(i32),
}

impl Link {
    fn parse(raw: i32, len: usize) -> Self {
        match usize::try_from(raw) {
            Err(_) => Link::Unset,
            Ok(index) if index < len => Link::To(index),
            Ok(_) => Link::Dangling(raw),
        }
    }
}

/// A resolved path: points in file order, sections in link order, and the
/// cached extent of both.
///
/// Points are never dropped for being invalid; their flags say what is wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainPath {
    name: String,
    points: Vec<PathPoint>,
    sections: Vec<PathSection>,
    bounds: Bounds,
    length: f64,
}

impl TrainPath {
    /// Resolve a raw node sequence against the network
    #[must_use]
    pub fn from_path_nodes(network: &NetworkModel, name: impl Into<String>, nodes: Vec<PathNode>) -> Self {
        let mut path = Self {
            name: name.into(),
            points: Vec::new(),
            sections: Vec::new(),
            bounds: Bounds::empty(),
            length: 0.0,
        };
        path.rebuild(network, nodes);
        path
    }

    #[must_use]
    pub fn from_path_file(network: &NetworkModel, file: PathFile) -> Self {
        Self::from_path_nodes(network, file.name, file.nodes)
    }

    fn rebuild(&mut self, network: &NetworkModel, nodes: Vec<PathNode>) {
        let len = nodes.len();
        let mut points: Vec<PathPoint> = nodes.into_iter().map(|node| PathPoint::new(network, node)).collect();
        let mut flags = vec![ValidationResult::NONE; len];

        for index in 0..len {
            let main = Link::parse(points[index].node.next_main, len);
            let siding = Link::parse(points[index].node.next_siding, len);
            for link in [main, siding] {
                match link {
                    Link::Unset => {}
                    Link::To(next) => {
                        if points[next].previous.is_none() {
                            points[next].previous = Some(index);
                        }
                    }
                    Link::Dangling(raw) => {
                        log::warn!("Path point {index} links to missing point {raw}");
                        flags[index] |= ValidationResult::INVALID;
                    }
                }
            }
            if let Link::To(next) = main {
                points[index].next_main = Some(next);
            }
            if let Link::To(next) = siding {
                points[index].next_siding = Some(next);
            }
        }

        let resolver = JunctionConnectivityResolver::new(network);
        let mut sections = Vec::new();
        for point in &points {
            let links = [(point.next_main, PathType::MainPath), (point.next_siding, PathType::PassingPath)];
            for (next, path_type) in links {
                let Some(next) = next else { continue };
                let resolution = resolver.resolve(point, &points[next], path_type, next);
                flags[next] |= resolution.validation;
                sections.extend(resolution.sections);
            }
        }

        self.points = points
            .into_iter()
            .zip(flags)
            .map(|(point, flags)| if flags.is_empty() { point } else { point.with_validation(flags) })
            .collect();
        self.sections = sections;
        self.update_extent();

        crate::log!(
            "Built path '{}': {} points, {} sections, {} invalid points",
            self.name,
            self.points.len(),
            self.sections.len(),
            self.invalid_points().count()
        );
    }

    fn update_extent(&mut self) {
        self.length = self.sections.iter().map(|section| section.length).sum();

        let mut bounds = self
            .sections
            .iter()
            .fold(Bounds::empty(), |bounds, section| bounds.union(&section.bounds));
        if let Some(start) = self.points.first() {
            bounds.include(start.location());
        }
        if let Some(end) = self.main_tail().map(|tail| &self.points[tail]) {
            bounds.include(end.location());
        }
        self.bounds = bounds;
    }

    /// Last point reached by following main links from the first point
    fn main_tail(&self) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }
        let mut visited = vec![false; self.points.len()];
        let mut current = 0;
        visited[current] = true;
        while let Some(next) = self.points[current].next_main.filter(|&next| !visited[next]) {
            visited[next] = true;
            current = next;
        }
        Some(current)
    }

    /// Append a point after the end of the main chain, resolving only the new
    /// link.
    ///
    /// A tail that closes a main cycle or carries a broken link is relinked
    /// and the whole path rebuilt, so no section or flag from the old link
    /// survives.
    pub fn add_path_point(&mut self, network: &NetworkModel, mut node: PathNode) -> &PathPoint {
        let index = self.points.len();
        node.next_main = NO_NEXT_NODE;
        node.next_siding = NO_NEXT_NODE;

        if let Some(tail) = self.main_tail().filter(|&tail| self.has_stale_main_link(tail)) {
            log::warn!("Relinking path point {tail} to new point {index}");
            self.points[tail].node = self.points[tail].node.clone().with_next_main(index);
            self.points.push(PathPoint::new(network, node));
            self.revalidate(network);
            return &self.points[index];
        }

        let mut point = PathPoint::new(network, node);
        if let Some(tail) = self.main_tail() {
            self.points[tail].node = self.points[tail].node.clone().with_next_main(index);
            self.points[tail].next_main = Some(index);
            point.previous = Some(tail);

            let resolution =
                JunctionConnectivityResolver::new(network).resolve(&self.points[tail], &point, PathType::MainPath, index);
            if !resolution.validation.is_empty() {
                point = point.with_validation(resolution.validation);
            }
            self.sections.extend(resolution.sections);
        }

        self.points.push(point);
        self.update_extent();
        &self.points[index]
    }

    /// True if the tail's main link loops back into the chain or was flagged
    /// as pointing nowhere
    fn has_stale_main_link(&self, tail: usize) -> bool {
        let point = &self.points[tail];
        point.next_main.is_some() || point.validation.contains(ValidationResult::INVALID)
    }

    /// Change a point's type flags and re-run validation over the whole path.
    ///
    /// Returns `None` if there is no point at `index`.
    pub fn set_node_type(&mut self, network: &NetworkModel, index: usize, node_type: PathNodeType) -> Option<&PathPoint> {
        self.points.get_mut(index)?.node.node_type = node_type;
        self.revalidate(network);
        self.points.get(index)
    }

    /// Rebuild every point and section from the raw nodes
    pub fn revalidate(&mut self, network: &NetworkModel) {
        let nodes = self.to_path_nodes();
        self.rebuild(network, nodes);
    }

    /// The raw node sequence, as persisted
    #[must_use]
    pub fn to_path_nodes(&self) -> Vec<PathNode> {
        self.points.iter().map(|point| point.node.clone()).collect()
    }

    #[must_use]
    pub fn to_path_file(&self) -> PathFile {
        PathFile { name: self.name.clone(), nodes: self.to_path_nodes() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path_points(&self) -> &[PathPoint] {
        &self.points
    }

    #[must_use]
    pub fn path_sections(&self) -> &[PathSection] {
        &self.sections
    }

    /// Sections leading to the point at `index`
    pub fn sections_of(&self, index: usize) -> impl Iterator<Item = &PathSection> + '_ {
        self.sections.iter().filter(move |section| section.end_point == index)
    }

    pub fn invalid_points(&self) -> impl Iterator<Item = (usize, &PathPoint)> + '_ {
        self.points.iter().enumerate().filter(|(_, point)| !point.is_valid())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.points.iter().all(PathPoint::is_valid) && !self.sections.iter().any(PathSection::is_invalid)
    }

    /// Summed length of every section, passing runs and placeholders
    /// included
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn top_left_bound(&self) -> PointD {
        self.bounds.top_left()
    }

    #[must_use]
    pub fn bottom_right_bound(&self) -> PointD {
        self.bounds.bottom_right()
    }

    #[must_use]
    pub fn mid_point(&self) -> PointD {
        self.bounds.mid_point()
    }
}
