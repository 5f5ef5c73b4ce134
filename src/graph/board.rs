use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::edge::{Edge, EdgeKey};
use crate::{Node, NodeId};

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("an edge cannot join node {node} to itself")]
    SelfLoop { node: NodeId },
    #[error("edge length {length} is not a positive length")]
    InvalidLength { length: u32 },
    #[error("node {node} is not on this board")]
    UnknownNode { node: NodeId },
    #[error("node {node} is not an exit of edge {edge:?}")]
    NotAnExit { node: NodeId, edge: EdgeKey },
    #[error("edges {first:?} and {second:?} share no endpoint")]
    NoSharedEndpoint { first: EdgeKey, second: EdgeKey },
    #[error("duplicate node name {name}")]
    DuplicateName { name: String },
    #[error("board has no nodes")]
    EmptyBoard,
    #[error("board is missing its {role} node")]
    MissingRole { role: &'static str },
    #[error("earth and target must be distinct nodes")]
    EarthIsTarget,
}

/// The generated galaxy: an arena of nodes plus a de-duplicated edge set.
///
/// Node ids index `nodes`; each node keeps the ids of its neighbours and
/// edges are keyed by their unordered endpoint pair, so there is at most one
/// edge between any two nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    seed: u64,
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: BTreeMap<EdgeKey, Edge>,
    pub(crate) earth: NodeId,
    pub(crate) target: NodeId,
    width: i32,
    height: i32,
    min_length: u32,
    max_length: u32,
    furthest_node_distance: f64,
    #[serde(skip)]
    name_index: HashMap<String, NodeId>,
}

impl Board {
    pub(crate) fn new(seed: u64, width: i32, height: i32) -> Self {
        Board {
            seed,
            nodes: Vec::new(),
            edges: BTreeMap::new(),
            earth: 0,
            target: 0,
            width,
            height,
            min_length: 0,
            max_length: 0,
            furthest_node_distance: 0.0,
            name_index: HashMap::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.name_index.get(name).map(|&id| &self.nodes[id])
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The edge joining `a` and `b`, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    pub fn earth(&self) -> &Node {
        &self.nodes[self.earth]
    }

    pub fn target(&self) -> &Node {
        &self.nodes[self.target]
    }

    pub fn earth_id(&self) -> NodeId {
        self.earth
    }

    pub fn target_id(&self) -> NodeId {
        self.target
    }

    pub fn min_length(&self) -> u32 {
        self.min_length
    }

    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    pub fn furthest_node_distance(&self) -> f64 {
        self.furthest_node_distance
    }

    pub fn position(&self, id: NodeId) -> Result<[f64; 2], GraphError> {
        self.checked(id).map(Node::position)
    }

    /// Euclidean distance between two nodes.
    pub fn distance_between(&self, a: NodeId, b: NodeId) -> Result<f64, GraphError> {
        Ok(self.checked(a)?.distance(self.checked(b)?))
    }

    pub fn distance_to_target(&self, id: NodeId) -> Result<f64, GraphError> {
        self.distance_between(id, self.target)
    }

    /// Strength of the target's distress beacon at `id`: 1 at the target,
    /// 0 at the node furthest from it.
    pub fn ping(&self, id: NodeId) -> Result<f64, GraphError> {
        let distance = self.distance_to_target(id)?;
        if self.furthest_node_distance <= 0.0 {
            return Ok(1.0);
        }
        Ok((1.0 - distance / self.furthest_node_distance).clamp(0.0, 1.0))
    }

    pub fn clear_hostile(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.checked_mut(id)?.hostile = false;
        Ok(())
    }

    pub fn clear_speed_upgrade(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.checked_mut(id)?.speed_upgrade = false;
        Ok(())
    }

    pub fn rebuild_indices(&mut self) {
        self.name_index = self
            .nodes
            .iter()
            .map(|node| (node.name.clone(), node.id()))
            .collect();
    }

    fn checked(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id).ok_or(GraphError::UnknownNode { node: id })
    }

    fn checked_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(id)
            .ok_or(GraphError::UnknownNode { node: id })
    }

    // Generator-facing mutation.

    pub(crate) fn add_node(&mut self, name: impl Into<String>) -> Result<NodeId, GraphError> {
        let name = name.into();
        if self.name_index.contains_key(&name) {
            return Err(GraphError::DuplicateName { name });
        }
        let id = self.nodes.len();
        self.name_index.insert(name.clone(), id);
        self.nodes.push(Node::new(id, name));
        Ok(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.checked_mut(id)
    }

    pub(crate) fn rename(&mut self, id: NodeId, name: &str) -> Result<(), GraphError> {
        if self.name_index.get(name).is_some_and(|&other| other != id) {
            return Err(GraphError::DuplicateName {
                name: name.to_string(),
            });
        }
        let node = self.checked_mut(id)?;
        let old = std::mem::replace(&mut node.name, name.to_string());
        self.name_index.remove(&old);
        self.name_index.insert(name.to_string(), id);
        Ok(())
    }

    /// Join `a` and `b` with an edge whose length is their truncated distance.
    /// Returns the new edge, or `None` if they were already connected.
    pub(crate) fn connect(&mut self, a: NodeId, b: NodeId) -> Result<Option<Edge>, GraphError> {
        let length = (self.distance_between(a, b)? as u32).max(1);
        let edge = Edge::new(a, b, length)?;
        Ok(self.insert_edge(edge.clone()).then_some(edge))
    }

    /// Insert `edge`, returning false if its endpoints were already joined.
    pub(crate) fn insert_edge(&mut self, edge: Edge) -> bool {
        let key = edge.key();
        if self.edges.contains_key(&key) {
            return false;
        }
        let [a, b] = edge.exits();
        self.nodes[a].exits.insert(b);
        self.nodes[b].exits.insert(a);
        self.edges.insert(key, edge);
        true
    }

    pub(crate) fn remove_edge(&mut self, key: EdgeKey) -> Option<Edge> {
        let edge = self.edges.remove(&key)?;
        self.nodes[key.low()].exits.remove(&key.high());
        self.nodes[key.high()].exits.remove(&key.low());
        Some(edge)
    }

    /// True iff a straight connection from `a` to `b` would cross an edge
    /// already on the board.
    pub(crate) fn line_crosses(&self, a: NodeId, b: NodeId) -> bool {
        let Ok(probe) = Edge::unassigned(a, b) else {
            return true;
        };
        self.edges.values().any(|edge| edge.intersects(&probe, self))
    }

    pub(crate) fn set_earth(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.checked(id)?;
        self.earth = id;
        Ok(())
    }

    pub(crate) fn set_target(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.checked(id)?;
        self.target = id;
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.name_index.clear();
        self.earth = 0;
        self.target = 0;
        self.min_length = 0;
        self.max_length = 0;
        self.furthest_node_distance = 0.0;
    }

    /// Fill in edge length bounds and the furthest distance to the target.
    pub(crate) fn compute_derived(&mut self) {
        self.min_length = self.edges.values().map(|e| e.length).min().unwrap_or(0);
        self.max_length = self.edges.values().map(|e| e.length).max().unwrap_or(0);
        let target = &self.nodes[self.target];
        self.furthest_node_distance = self
            .nodes
            .iter()
            .map(|n| n.distance(target))
            .fold(0.0, f64::max);
    }

    /// Check the structural invariants every finished board upholds.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.nodes.is_empty() {
            return Err(GraphError::EmptyBoard);
        }
        self.checked(self.earth)
            .map_err(|_| GraphError::MissingRole { role: "earth" })?;
        self.checked(self.target)
            .map_err(|_| GraphError::MissingRole { role: "target" })?;
        if self.earth == self.target {
            return Err(GraphError::EarthIsTarget);
        }
        for edge in self.edges.values() {
            for node in edge.exits() {
                self.checked(node)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{node}")?;
            for (other, length) in node.neighbors(self) {
                write!(f, "\t{}-{}", self.nodes[other].name, length)?;
            }
        }
        Ok(())
    }
}

/// Assembles a board by hand, for fixtures and for consumers that load a
/// layout from elsewhere.
#[derive(Debug, Default)]
pub struct BoardBuilder {
    board: Option<Board>,
    earth: Option<NodeId>,
    target: Option<NodeId>,
}

impl BoardBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        BoardBuilder {
            board: Some(Board::new(0, width, height)),
            earth: None,
            target: None,
        }
    }

    fn board(&mut self) -> &mut Board {
        self.board.get_or_insert_with(|| Board::new(0, 0, 0))
    }

    pub fn node(&mut self, name: &str, x: i32, y: i32) -> Result<NodeId, GraphError> {
        let board = self.board();
        let id = board.add_node(name)?;
        let node = board.node_mut(id)?;
        node.x = x;
        node.y = y;
        Ok(id)
    }

    pub fn hostile(&mut self, id: NodeId) -> Result<&mut Self, GraphError> {
        self.board().node_mut(id)?.hostile = true;
        Ok(self)
    }

    pub fn speed_upgrade(&mut self, id: NodeId) -> Result<&mut Self, GraphError> {
        self.board().node_mut(id)?.speed_upgrade = true;
        Ok(self)
    }

    /// Add an edge with an explicit length; duplicates are ignored.
    pub fn edge(&mut self, a: NodeId, b: NodeId, length: u32) -> Result<&mut Self, GraphError> {
        let board = self.board();
        board.checked(a)?;
        board.checked(b)?;
        board.insert_edge(Edge::new(a, b, length)?);
        Ok(self)
    }

    pub fn earth(&mut self, id: NodeId) -> &mut Self {
        self.earth = Some(id);
        self
    }

    pub fn target(&mut self, id: NodeId) -> &mut Self {
        self.target = Some(id);
        self
    }

    pub fn build(&mut self) -> Result<Board, GraphError> {
        let mut board = self.board.take().unwrap_or_else(|| Board::new(0, 0, 0));
        let earth = self.earth.ok_or(GraphError::MissingRole { role: "earth" })?;
        let target = self.target.ok_or(GraphError::MissingRole { role: "target" })?;
        board.set_earth(earth)?;
        board.set_target(target)?;
        board.validate()?;
        board.compute_derived();
        Ok(board)
    }
}
