use crate::config::TopologyConfig;
use crate::error::TopologyError;
use crate::log;
use crate::models::network::NetworkModel;
use crate::models::source::TrackDatabase;
use crate::models::track_segment::SegmentKind;

/// The networks of one loaded route, one slot per segment kind.
///
/// Pass this (or a single [`NetworkModel`] from it) to whatever needs
/// topology; reloading the route means building a new one.
#[derive(Debug, Clone, Default)]
pub struct RouteTopology {
    networks: [Option<NetworkModel>; SegmentKind::COUNT],
}

impl RouteTopology {
    /// Build the rail network and, when the route has one, the road network
    ///
    /// # Errors
    ///
    /// Returns the first error from either network's construction
    pub fn build(rail: &TrackDatabase, road: Option<&TrackDatabase>, config: &TopologyConfig) -> Result<Self, TopologyError> {
        let mut topology = Self::default();
        topology.networks[SegmentKind::Rail.index()] = Some(NetworkModel::build(rail, SegmentKind::Rail, config)?);
        if let Some(road) = road {
            topology.networks[SegmentKind::Road.index()] = Some(NetworkModel::build(road, SegmentKind::Road, config)?);
        }
        log!("Loaded route with {} networks", topology.iter().count());
        Ok(topology)
    }

    #[must_use]
    pub fn network(&self, kind: SegmentKind) -> Option<&NetworkModel> {
        self.networks[kind.index()].as_ref()
    }

    #[must_use]
    pub fn rail(&self) -> Option<&NetworkModel> {
        self.network(SegmentKind::Rail)
    }

    #[must_use]
    pub fn road(&self) -> Option<&NetworkModel> {
        self.network(SegmentKind::Road)
    }

    /// Loaded networks in kind order
    pub fn iter(&self) -> impl Iterator<Item = &NetworkModel> + '_ {
        self.networks.iter().flatten()
    }
}
