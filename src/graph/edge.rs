use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::geometry::vector::{segments_intersect, Vector};
use crate::graph::board::{Board, GraphError};
use crate::NodeId;

/// Reserved length for probe edges that only exist for crossing tests.
pub const UNASSIGNED_LENGTH: u32 = 0;

/// Order-independent identity of an edge: its endpoints, smaller id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }

    pub fn low(&self) -> NodeId {
        self.0
    }

    pub fn high(&self) -> NodeId {
        self.1
    }
}

/// Undirected, weighted connection between two distinct nodes.
///
/// Edges are never mutated after construction; rewiring replaces them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    exits: [NodeId; 2],
    pub length: u32,
}

impl Edge {
    /// Build an edge of strictly positive `length` between two distinct nodes.
    pub fn new(first: NodeId, second: NodeId, length: u32) -> Result<Self, GraphError> {
        if length == UNASSIGNED_LENGTH {
            return Err(GraphError::InvalidLength { length });
        }
        Self::build(first, second, length)
    }

    /// A probe edge with no length, used to test a prospective connection.
    pub fn unassigned(first: NodeId, second: NodeId) -> Result<Self, GraphError> {
        Self::build(first, second, UNASSIGNED_LENGTH)
    }

    fn build(first: NodeId, second: NodeId, length: u32) -> Result<Self, GraphError> {
        if first == second {
            return Err(GraphError::SelfLoop { node: first });
        }
        Ok(Edge {
            exits: [first, second],
            length,
        })
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.exits[0], self.exits[1])
    }

    pub fn first_exit(&self) -> NodeId {
        self.exits[0]
    }

    pub fn second_exit(&self) -> NodeId {
        self.exits[1]
    }

    pub fn exits(&self) -> [NodeId; 2] {
        self.exits
    }

    pub fn has_length(&self) -> bool {
        self.length != UNASSIGNED_LENGTH
    }

    pub fn is_exit(&self, node: NodeId) -> bool {
        self.exits[0] == node || self.exits[1] == node
    }

    /// The endpoint that is not `node`.
    pub fn other(&self, node: NodeId) -> Result<NodeId, GraphError> {
        if self.exits[0] == node {
            Ok(self.exits[1])
        } else if self.exits[1] == node {
            Ok(self.exits[0])
        } else {
            Err(GraphError::NotAnExit {
                node,
                edge: self.key(),
            })
        }
    }

    pub fn shared_exit(&self, other: &Edge) -> Option<NodeId> {
        self.exits.iter().copied().find(|&n| other.is_exit(n))
    }

    pub fn shares_exit(&self, other: &Edge) -> bool {
        self.shared_exit(other).is_some()
    }

    /// True iff the two edges cross on the board. Edges sharing an endpoint
    /// never cross.
    pub fn intersects(&self, other: &Edge, board: &Board) -> bool {
        if self.shares_exit(other) {
            return false;
        }
        let [a, b] = self.positions(board);
        let [c, d] = other.positions(board);
        segments_intersect(a, b, c, d)
    }

    /// Angle in radians at the common endpoint, between the directions to
    /// each edge's other endpoint.
    pub fn angle_with(&self, other: &Edge, board: &Board) -> Result<f64, GraphError> {
        let common = self
            .shared_exit(other)
            .ok_or(GraphError::NoSharedEndpoint {
                first: self.key(),
                second: other.key(),
            })?;
        let origin = board.position(common)?;
        let v1 = Vector::between(origin, board.position(self.other(common)?)?);
        let v2 = Vector::between(origin, board.position(other.other(common)?)?);
        Ok(Vector::angle(v1, v2))
    }

    /// Label position halfway between the endpoints.
    pub fn midpoint(&self, board: &Board) -> [f64; 2] {
        let [a, b] = self.positions(board);
        [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0]
    }

    fn positions(&self, board: &Board) -> [[f64; 2]; 2] {
        [
            board.nodes[self.exits[0]].position(),
            board.nodes[self.exits[1]].position(),
        ]
    }
}

/// Two edges are equal when they join the same pair of nodes, whatever their
/// lengths or endpoint order.
impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.exits[0], self.exits[1])
    }
}
