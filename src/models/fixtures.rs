//! Small hand-built networks shared by the model tests.
//!
//! The passing loop runs north from a buffer stop at the origin:
//!
//! ```text
//!            BUFFER_NORTH (curving east)
//!                 |
//!                 C
//!                 |
//!                 J2 (0, 500)
//!                / \
//!               B   D  (loop, 30 east of the main line)
//!                \ /
//!                 J1 (0, 200)
//!                 |
//!                 A
//!                 |
//!            BUFFER_SOUTH (0, 0)
//! ```

use crate::config::TopologyConfig;
use crate::geometry::PointD;
use crate::models::network::NetworkModel;
use crate::models::source::{
    RawEndNode, RawJunctionNode, RawTrackNode, RawVectorNode, TrackDatabase, TrackPin, TrackSection, TrackShape,
    TrackVectorSection,
};
use crate::models::track_segment::SegmentKind;

pub mod ids {
    pub const BUFFER_SOUTH: u32 = 1;
    pub const A: u32 = 2;
    pub const J1: u32 = 3;
    pub const B: u32 = 4;
    pub const J2: u32 = 5;
    pub const D: u32 = 6;
    pub const C: u32 = 7;
    pub const BUFFER_NORTH: u32 = 8;

    pub const ISLAND: u32 = 9;
    pub const ISLAND_SOUTH: u32 = 10;
    pub const ISLAND_NORTH: u32 = 11;
}

pub const STRAIGHT_200: u32 = 1;
pub const STRAIGHT_300: u32 = 2;
pub const LOOP_LEAD: u32 = 3;
pub const STRAIGHT_220: u32 = 4;
pub const STRAIGHT_100: u32 = 5;
pub const CURVE_30: u32 = 6;
pub const LONG_5000: u32 = 7;

pub const SWITCH: u32 = 1;

fn placed(section_index: u32, x: f64, y: f64, direction: f64) -> TrackVectorSection {
    TrackVectorSection { section_index, location: PointD::new(x, y), direction }
}

fn vector(index: u32, pins: [u32; 2], sections: Vec<TrackVectorSection>) -> Option<RawTrackNode> {
    Some(RawTrackNode::Vector(RawVectorNode {
        index,
        pins: pins.iter().map(|&link| TrackPin::ahead(link)).collect(),
        sections,
    }))
}

fn junction(index: u32, x: f64, y: f64, pins: &[u32]) -> Option<RawTrackNode> {
    Some(RawTrackNode::Junction(RawJunctionNode {
        index,
        location: PointD::new(x, y),
        shape_index: SWITCH,
        pins: pins.iter().map(|&link| TrackPin::ahead(link)).collect(),
    }))
}

fn end(index: u32, x: f64, y: f64, link: u32) -> Option<RawTrackNode> {
    Some(RawTrackNode::End(RawEndNode { index, location: PointD::new(x, y), pin: TrackPin::reverse(link) }))
}

fn sections() -> Vec<TrackSection> {
    vec![
        TrackSection::straight(STRAIGHT_200, 200.0),
        TrackSection::straight(STRAIGHT_300, 300.0),
        TrackSection::straight(LOOP_LEAD, 50.0),
        TrackSection::straight(STRAIGHT_220, 220.0),
        TrackSection::straight(STRAIGHT_100, 100.0),
        TrackSection::curve(CURVE_30, 200.0, 30.0),
    ]
}

/// Main line A-B-C with a loop D between J1 and J2
pub fn passing_loop_database() -> TrackDatabase {
    let lead_out = f64::atan2(30.0, 40.0);
    let lead_in = f64::atan2(-30.0, 40.0);
    let north_x = 200.0 * (1.0 - 30f64.to_radians().cos());
    let north_y = 600.0 + 200.0 * 30f64.to_radians().sin();

    TrackDatabase {
        nodes: vec![
            None,
            end(ids::BUFFER_SOUTH, 0.0, 0.0, ids::A),
            vector(ids::A, [ids::BUFFER_SOUTH, ids::J1], vec![placed(STRAIGHT_200, 0.0, 0.0, 0.0)]),
            junction(ids::J1, 0.0, 200.0, &[ids::A, ids::B, ids::D]),
            vector(ids::B, [ids::J1, ids::J2], vec![placed(STRAIGHT_300, 0.0, 200.0, 0.0)]),
            junction(ids::J2, 0.0, 500.0, &[ids::C, ids::B, ids::D]),
            vector(
                ids::D,
                [ids::J1, ids::J2],
                vec![
                    placed(LOOP_LEAD, 0.0, 200.0, lead_out),
                    placed(STRAIGHT_220, 30.0, 240.0, 0.0),
                    placed(LOOP_LEAD, 30.0, 460.0, lead_in),
                ],
            ),
            vector(
                ids::C,
                [ids::J2, ids::BUFFER_NORTH],
                vec![placed(STRAIGHT_100, 0.0, 500.0, 0.0), placed(CURVE_30, 0.0, 600.0, 0.0)],
            ),
            end(ids::BUFFER_NORTH, north_x, north_y, ids::C),
        ],
        sections: sections(),
        shapes: vec![TrackShape { index: SWITCH, main_route: 0 }],
    }
}

/// The passing loop with D removed, leaving two-way junctions on a plain line
pub fn plain_line_database() -> TrackDatabase {
    let mut database = passing_loop_database();
    database.nodes[ids::D as usize] = None;
    database.nodes[ids::J1 as usize] = junction(ids::J1, 0.0, 200.0, &[ids::A, ids::B]);
    database.nodes[ids::J2 as usize] = junction(ids::J2, 0.0, 500.0, &[ids::C, ids::B]);
    database
}

/// The plain line plus an unconnected straight far to the east
pub fn two_islands_database() -> TrackDatabase {
    let mut database = plain_line_database();
    database.nodes.extend([
        vector(
            ids::ISLAND,
            [ids::ISLAND_SOUTH, ids::ISLAND_NORTH],
            vec![placed(STRAIGHT_200, 5000.0, 0.0, 0.0)],
        ),
        end(ids::ISLAND_SOUTH, 5000.0, 0.0, ids::ISLAND),
        end(ids::ISLAND_NORTH, 5000.0, 200.0, ids::ISLAND),
    ]);
    database
}

/// The passing loop with both junctions trailing from B, so their main
/// routes lead on to A and C instead of through either loop line
pub fn trailing_loop_database() -> TrackDatabase {
    let mut database = passing_loop_database();
    database.nodes[ids::J1 as usize] = junction(ids::J1, 0.0, 200.0, &[ids::B, ids::A, ids::D]);
    database.nodes[ids::J2 as usize] = junction(ids::J2, 0.0, 500.0, &[ids::B, ids::C, ids::D]);
    database
}

/// A single 5 km straight between two buffer stops, spanning several tiles
pub fn long_line_database() -> TrackDatabase {
    TrackDatabase {
        nodes: vec![
            None,
            end(1, 0.0, 0.0, 2),
            vector(2, [1, 3], vec![placed(LONG_5000, 0.0, 0.0, 0.0)]),
            end(3, 0.0, 5000.0, 2),
        ],
        sections: vec![TrackSection::straight(LONG_5000, 5000.0)],
        shapes: Vec::new(),
    }
}

fn build(database: &TrackDatabase) -> NetworkModel {
    NetworkModel::build(database, SegmentKind::Rail, &TopologyConfig::default()).expect("fixture network builds")
}

pub fn passing_loop_network() -> NetworkModel {
    build(&passing_loop_database())
}

pub fn plain_line_network() -> NetworkModel {
    build(&plain_line_database())
}

pub fn two_islands_network() -> NetworkModel {
    build(&two_islands_database())
}

pub fn trailing_loop_network() -> NetworkModel {
    build(&trailing_loop_database())
}

pub fn long_line_network() -> NetworkModel {
    build(&long_line_database())
}
