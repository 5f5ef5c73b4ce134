pub mod data;
pub mod generation;
pub mod geometry;
pub mod graph;
pub mod spatial;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::vector::Vector;

pub use crate::generation::{generate, generate_with_config, GenerationConfig, GenerationError};
pub use crate::graph::board::{Board, GraphError};
pub use crate::graph::edge::{Edge, EdgeKey};

/// Name given to the starting node.
pub const EARTH_NAME: &str = "Earth";

/// Name given to the rescue target once it has been chosen.
pub const CRASHED_PLANET_NAME: &str = "Planet X";

/// Index of a node inside its board's arena. Equal to the node's id.
pub type NodeId = usize;

/// A planet on the board.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    pub name: String,
    /// Position in board space (pixels of the reference layout).
    pub x: i32,
    pub y: i32,
    pub(crate) hostile: bool,
    pub(crate) speed_upgrade: bool,
    /// Ids of the nodes this one shares an edge with.
    pub(crate) exits: BTreeSet<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: impl Into<String>) -> Self {
        Node {
            id,
            name: name.into(),
            x: 0,
            y: 0,
            hostile: false,
            speed_upgrade: false,
            exits: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_hostile(&self) -> bool {
        self.hostile
    }

    pub fn has_speed_upgrade(&self) -> bool {
        self.speed_upgrade
    }

    /// Ids of adjacent nodes, in ascending order.
    pub fn exits(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.exits.iter().copied()
    }

    pub fn degree(&self) -> usize {
        self.exits.len()
    }

    /// False for `other == self`, otherwise true iff a single edge joins them.
    pub fn is_connected_to(&self, other: NodeId) -> bool {
        other != self.id && self.exits.contains(&other)
    }

    pub fn distance(&self, other: &Node) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }

    pub fn distance_to_point(&self, p: [f64; 2]) -> f64 {
        let dx = f64::from(self.x) - p[0];
        let dy = f64::from(self.y) - p[1];
        (dx * dx + dy * dy).sqrt()
    }

    pub fn position(&self) -> [f64; 2] {
        [f64::from(self.x), f64::from(self.y)]
    }

    pub fn vector_to(&self, other: &Node) -> Vector {
        Vector::new(
            f64::from(other.x) - f64::from(self.x),
            f64::from(other.y) - f64::from(self.y),
        )
    }

    /// Map of neighbouring node id to the length of the connecting edge.
    pub fn neighbors(&self, board: &Board) -> BTreeMap<NodeId, u32> {
        self.exits
            .iter()
            .filter_map(|&other| {
                board
                    .edge_between(self.id, other)
                    .map(|edge| (other, edge.length))
            })
            .collect()
    }
}

/// Names are unique within one board, so they double as identity.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({}, {})", self.name, self.x, self.y)
    }
}
