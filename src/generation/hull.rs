//! Concentric hull skeleton: peel convex hulls off the node set, stitch the
//! layers together, then top up node degrees.

use std::collections::BTreeSet;

use log::{debug, warn};
use rand::Rng;

use crate::generation::observer::GenerationObserver;
use crate::generation::{add_edge, GenerationConfig};
use crate::geometry::vector::Vector;
use crate::graph::board::{Board, GraphError};
use crate::spatial::kd_tree::KDTree;
use crate::NodeId;

/// Hull layers from the outside in, plus each node's layer index.
#[derive(Clone, Debug, Default)]
pub(crate) struct HullLayers {
    pub layers: Vec<Vec<NodeId>>,
    pub hull_of: Vec<usize>,
}

impl HullLayers {
    pub fn innermost(&self) -> Option<&[NodeId]> {
        self.layers.last().map(Vec::as_slice)
    }
}

/// Repeatedly gift-wrap the unassigned nodes, adding each hull's boundary
/// edges, until every node belongs to a layer.
pub(crate) fn build_hulls<O: GenerationObserver>(
    board: &mut Board,
    observer: &mut O,
) -> Result<HullLayers, GraphError> {
    let mut remaining: BTreeSet<NodeId> = (0..board.node_count()).collect();
    let mut hulls = HullLayers {
        layers: Vec::new(),
        hull_of: vec![0; board.node_count()],
    };

    while !remaining.is_empty() {
        let layer = gift_wrap(board, &remaining);
        let boundary: Vec<(NodeId, NodeId)> = match layer.len() {
            1 => Vec::new(),
            2 => vec![(layer[0], layer[1])],
            len => (0..len).map(|i| (layer[i], layer[(i + 1) % len])).collect(),
        };
        for (a, b) in boundary {
            // Only a node sitting exactly on an outer boundary can trip this.
            if !board.line_crosses(a, b) {
                add_edge(board, observer, a, b)?;
            }
        }

        let index = hulls.layers.len();
        for &node in &layer {
            remaining.remove(&node);
            hulls.hull_of[node] = index;
        }
        hulls.layers.push(layer);
    }

    debug!(
        "built {} hull layers with {} edges",
        hulls.layers.len(),
        board.edge_count()
    );
    Ok(hulls)
}

/// Jarvis march over `nodes`, returning hull vertices in boundary order.
/// Collinear boundary points other than the extremes are left for an inner
/// layer.
fn gift_wrap(board: &Board, nodes: &BTreeSet<NodeId>) -> Vec<NodeId> {
    if nodes.len() <= 2 {
        return nodes.iter().copied().collect();
    }

    let position = |id: NodeId| board.nodes()[id].position();
    let Some(start) = nodes
        .iter()
        .copied()
        .min_by_key(|&id| (board.nodes()[id].x, board.nodes()[id].y))
    else {
        return Vec::new();
    };

    let mut hull = Vec::new();
    let mut current = start;
    loop {
        hull.push(current);
        let origin = position(current);
        let mut candidate: Option<NodeId> = None;
        for &node in nodes {
            if node == current {
                continue;
            }
            let Some(best) = candidate else {
                candidate = Some(node);
                continue;
            };
            let to_best = Vector::between(origin, position(best));
            let to_node = Vector::between(origin, position(node));
            let turn = Vector::cross(to_best, to_node);
            if turn < 0.0 || (turn == 0.0 && to_node.length() > to_best.length()) {
                candidate = Some(node);
            }
        }

        match candidate {
            Some(next) if next != start && hull.len() < nodes.len() => current = next,
            _ => break,
        }
    }
    hull
}

/// Join every node of each inner layer to its nearest neighbour on the layer
/// just outside it, unless that connection would cross an existing edge.
pub(crate) fn connect_layers<O: GenerationObserver>(
    board: &mut Board,
    hulls: &HullLayers,
    observer: &mut O,
) -> Result<(), GraphError> {
    for pair in hulls.layers.windows(2) {
        let (outer, inner) = (&pair[0], &pair[1]);
        let points: Vec<[f64; 2]> = outer.iter().map(|&id| board.nodes()[id].position()).collect();
        let tree = KDTree::build(&points);
        for &node in inner {
            let Some((idx, _)) = tree.nearest(board.nodes()[node].position()) else {
                continue;
            };
            let closest = outer[idx];
            if !board.line_crosses(node, closest) {
                add_edge(board, observer, node, closest)?;
            }
        }
    }
    Ok(())
}

/// An innermost layer of one or two nodes has at most one boundary edge, so
/// give each of its under-connected nodes extra edges into the next layer out.
pub(crate) fn repair_innermost<R: Rng, O: GenerationObserver>(
    board: &mut Board,
    hulls: &HullLayers,
    rng: &mut R,
    config: &GenerationConfig,
    observer: &mut O,
) -> Result<(), GraphError> {
    let layer_count = hulls.layers.len();
    let Some(innermost) = hulls.innermost() else {
        return Ok(());
    };
    if layer_count < 2 || innermost.len() >= 3 {
        return Ok(());
    }

    let penultimate = &hulls.layers[layer_count - 2];
    let wanted = if innermost.len() == 1 { 2 } else { 1 };
    for &node in innermost {
        if board.nodes()[node].degree() >= 2 {
            continue;
        }
        let mut added = 0;
        let mut attempts = 0;
        while added < wanted && attempts < config.max_repair_attempts {
            attempts += 1;
            let other = penultimate[rng.gen_range(0..penultimate.len())];
            if !board.line_crosses(node, other) && !board.nodes()[node].is_connected_to(other) {
                add_edge(board, observer, node, other)?;
                added += 1;
            }
        }
        if added < wanted {
            warn!(
                "innermost node {} only gained {added} of {wanted} edges",
                board.nodes()[node].name
            );
        }
    }
    Ok(())
}

/// Add edges between adjacent layers until the edge-to-node ratio reaches
/// the configured average degree or the iteration budget runs out.
pub(crate) fn augment_degree<R: Rng, O: GenerationObserver>(
    board: &mut Board,
    hulls: &HullLayers,
    rng: &mut R,
    config: &GenerationConfig,
    observer: &mut O,
) -> Result<(), GraphError> {
    let node_count = board.node_count();
    if node_count == 0 || hulls.layers.is_empty() {
        return Ok(());
    }
    let target = node_count as f64 * config.average_degree;
    let max_hull = hulls.layers.len() - 1;
    let mut iterations = 0;

    while (board.edge_count() as f64) < target && iterations < config.max_edge_iterations {
        let node = rng.gen_range(0..node_count);
        let hull = hulls.hull_of[node];
        if hull < max_hull {
            try_link(board, observer, node, &hulls.layers[hull + 1])?;
        }
        if hull > 0 {
            try_link(board, observer, node, &hulls.layers[hull - 1])?;
        }
        iterations += 1;
    }

    if (board.edge_count() as f64) < target {
        debug!(
            "degree augmentation stalled at {} edges (target {target:.0})",
            board.edge_count()
        );
    }
    Ok(())
}

/// Connect `node` to the first node of `layer` it can reach without a
/// crossing or a duplicate edge.
fn try_link<O: GenerationObserver>(
    board: &mut Board,
    observer: &mut O,
    node: NodeId,
    layer: &[NodeId],
) -> Result<bool, GraphError> {
    for &other in layer {
        if !board.line_crosses(node, other) && !board.nodes()[node].is_connected_to(other) {
            return add_edge(board, observer, node, other);
        }
    }
    Ok(false)
}
