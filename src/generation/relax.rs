use std::collections::BTreeMap;
use std::f64::consts::PI;

use log::debug;

use crate::generation::add_edge;
use crate::generation::observer::GenerationObserver;
use crate::graph::board::{Board, GraphError};
use crate::graph::edge::EdgeKey;
use crate::NodeId;

/// Angle sum, opposite a shared edge, above which the edge is flipped.
const FLIP_CONDITION: f64 = PI;

/// One pass of Delaunay-style edge flips.
///
/// For each pair of triangles `(n1, n2, n4)` and `(n1, n3, n4)` sharing the
/// edge `n1-n4`, the edge is marked for replacement by `n2-n3` when the angles
/// at `n2` and `n3` sum to more than pi. Marked flips are then applied in edge
/// order; a replacement that would cross a remaining edge (or duplicate one)
/// is abandoned and the original edge restored. Returns the number of flips
/// that took effect.
pub(crate) fn relax<O: GenerationObserver>(
    board: &mut Board,
    observer: &mut O,
) -> Result<usize, GraphError> {
    let flips = find_flips(board)?;
    let mut applied = 0;

    for (key, (a, b)) in flips {
        let Some(old) = board.remove_edge(key) else {
            continue;
        };
        observer.edge_removed(&old);

        if !board.line_crosses(a, b) && !board.nodes()[a].is_connected_to(b) {
            add_edge(board, observer, a, b)?;
            applied += 1;
        } else if board.insert_edge(old.clone()) {
            observer.edge_added(&old);
        }
    }

    debug!("relaxation flipped {applied} edges");
    Ok(applied)
}

fn find_flips(board: &Board) -> Result<BTreeMap<EdgeKey, (NodeId, NodeId)>, GraphError> {
    let mut flips = BTreeMap::new();
    let edge = |a: NodeId, b: NodeId| {
        board
            .edge_between(a, b)
            .ok_or(GraphError::UnknownNode { node: b })
    };

    for n1 in 0..board.node_count() {
        let exits: Vec<NodeId> = board.nodes()[n1].exits().collect();
        for &n2 in &exits {
            for &n3 in &exits {
                if n3 == n2 {
                    continue;
                }
                for &n4 in &exits {
                    if n4 == n2 || n4 == n3 {
                        continue;
                    }
                    let nodes = board.nodes();
                    if !(nodes[n2].is_connected_to(n4) && nodes[n3].is_connected_to(n4)) {
                        continue;
                    }
                    let at_n2 = edge(n1, n2)?.angle_with(edge(n2, n4)?, board)?;
                    let at_n3 = edge(n1, n3)?.angle_with(edge(n3, n4)?, board)?;
                    if at_n2 + at_n3 > FLIP_CONDITION {
                        flips.insert(EdgeKey::new(n1, n4), (n2, n3));
                    }
                }
            }
        }
    }
    Ok(flips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::observer::NoopObserver;
    use crate::graph::board::BoardBuilder;

    /// Two thin triangles sharing the long edge A-C of a rhombus; the short
    /// diagonal B-D is the better choice.
    fn skinny_quad() -> Board {
        let mut b = BoardBuilder::new(100, 100);
        let a = b.node("A", 0, 50).unwrap();
        let nb = b.node("B", 50, 40).unwrap();
        let c = b.node("C", 100, 50).unwrap();
        let d = b.node("D", 50, 60).unwrap();
        b.edge(a, nb, 51).unwrap();
        b.edge(nb, c, 51).unwrap();
        b.edge(c, d, 51).unwrap();
        b.edge(d, a, 51).unwrap();
        b.edge(a, c, 100).unwrap();
        b.earth(a).target(c);
        b.build().unwrap()
    }

    #[test]
    fn flips_long_diagonal() {
        let mut board = skinny_quad();
        let flipped = relax(&mut board, &mut NoopObserver).unwrap();
        assert_eq!(flipped, 1);
        assert!(board.edge_between(0, 2).is_none());
        assert!(board.edge_between(1, 3).is_some());
        assert_eq!(board.edge_count(), 5);
    }

    #[test]
    fn well_shaped_quad_is_left_alone() {
        let mut b = BoardBuilder::new(100, 100);
        let a = b.node("A", 0, 50).unwrap();
        let nb = b.node("B", 50, 30).unwrap();
        let c = b.node("C", 100, 50).unwrap();
        let d = b.node("D", 50, 70).unwrap();
        b.edge(a, nb, 54).unwrap();
        b.edge(nb, c, 54).unwrap();
        b.edge(c, d, 54).unwrap();
        b.edge(d, a, 54).unwrap();
        b.edge(nb, d, 40).unwrap();
        b.earth(a).target(c);
        let mut board = b.build().unwrap();
        // The angles at A and C opposite B-D sum to less than pi.
        assert_eq!(relax(&mut board, &mut NoopObserver).unwrap(), 0);
        assert!(board.edge_between(1, 3).is_some());
    }
}
