use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::graph::board::Board;
use crate::graph::heap::IndexedHeap;
use crate::{Node, NodeId};

/// Extra cost charged for stepping onto a hostile node when avoiding them.
/// Larger than any simple path on a board, so a hostile-free route always
/// wins when one exists.
pub const HOSTILE_PENALTY: u64 = u32::MAX as u64;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub node: NodeId,
    /// Total edge length travelled to reach `node`.
    pub cost: u64,
}

/// Dijkstra over edge lengths. Returns the nodes from `start` to `end`
/// inclusive, or an empty path when `end` cannot be reached.
pub fn shortest_path(board: &Board, start: NodeId, end: NodeId) -> Vec<NodeId> {
    dijkstra(board, start, end, |_, length| u64::from(length))
}

/// Like [`shortest_path`], but every edge into a hostile node costs
/// [`HOSTILE_PENALTY`] on top of its length. If every route crosses a hostile
/// node the cheapest of them is still returned; use [`count_hostiles`] to
/// check.
pub fn shortest_path_avoiding_hostiles(board: &Board, start: NodeId, end: NodeId) -> Vec<NodeId> {
    dijkstra(board, start, end, |to, length| {
        if to.is_hostile() {
            u64::from(length) + HOSTILE_PENALTY
        } else {
            u64::from(length)
        }
    })
}

#[derive(Clone, Copy)]
struct Visit {
    distance: u64,
    back: Option<NodeId>,
}

fn dijkstra<F>(board: &Board, start: NodeId, end: NodeId, edge_cost: F) -> Vec<NodeId>
where
    F: Fn(&Node, u32) -> u64,
{
    if board.node(start).is_none() || board.node(end).is_none() {
        return Vec::new();
    }

    let mut frontier: IndexedHeap<NodeId, u64> = IndexedHeap::new();
    let mut visits: Vec<Option<Visit>> = vec![None; board.node_count()];

    frontier.insert(start, 0);
    visits[start] = Some(Visit {
        distance: 0,
        back: None,
    });

    while let Some(current) = frontier.extract_min() {
        if current == end {
            return reconstruct_path(&visits, end);
        }
        let Some(Visit { distance, .. }) = visits[current] else {
            continue;
        };

        for (neighbor, length) in board.nodes()[current].neighbors(board) {
            let candidate = distance.saturating_add(edge_cost(&board.nodes()[neighbor], length));
            let discovered = match visits[neighbor] {
                None => false,
                Some(visit) if candidate < visit.distance => true,
                Some(_) => continue,
            };
            visits[neighbor] = Some(Visit {
                distance: candidate,
                back: Some(current),
            });
            if !discovered {
                frontier.insert(neighbor, candidate);
            } else if frontier.contains(&neighbor) {
                frontier.decrease_priority(&neighbor, candidate);
            }
        }
    }

    Vec::new()
}

fn reconstruct_path(visits: &[Option<Visit>], end: NodeId) -> Vec<NodeId> {
    let mut path = vec![end];
    let mut current = end;
    while let Some(prev) = visits[current].and_then(|v| v.back) {
        current = prev;
        path.push(current);
    }
    path.reverse();
    path
}

/// Sum of edge lengths along `path`. Every consecutive pair must be joined by
/// an edge.
pub fn path_distance(board: &Board, path: &[NodeId]) -> u64 {
    path.windows(2)
        .map(|pair| {
            let edge = board.edge_between(pair[0], pair[1]);
            debug_assert!(edge.is_some(), "{} and {} are not adjacent", pair[0], pair[1]);
            edge.map_or(0, |e| u64::from(e.length))
        })
        .sum()
}

/// Annotate each node of `path` with the distance travelled to reach it.
pub fn path_steps(board: &Board, path: &[NodeId]) -> Vec<PathStep> {
    let mut cost = 0;
    path.iter()
        .enumerate()
        .map(|(i, &node)| {
            if i > 0 {
                cost += path_distance(board, &path[i - 1..=i]);
            }
            PathStep { node, cost }
        })
        .collect()
}

pub fn count_hostiles(board: &Board, path: &[NodeId]) -> usize {
    path.iter()
        .filter(|&&id| board.node(id).is_some_and(Node::is_hostile))
        .count()
}

/// A route is safe when it holds fewer than `limit` hostile nodes.
pub fn is_safe_path(board: &Board, path: &[NodeId], limit: usize) -> bool {
    !path.is_empty() && count_hostiles(board, path) < limit
}

/// Every node reachable from `start`, breadth first.
pub fn reachable_from(board: &Board, start: NodeId) -> BTreeSet<NodeId> {
    let mut seen = BTreeSet::new();
    if board.node(start).is_none() {
        return seen;
    }
    let mut queue = VecDeque::from([start]);
    seen.insert(start);
    while let Some(current) = queue.pop_front() {
        for next in board.nodes()[current].exits() {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

pub fn is_connected(board: &Board) -> bool {
    board.node_count() == 0 || reachable_from(board, 0).len() == board.node_count()
}

struct Frame {
    candidates: Vec<NodeId>,
    next: usize,
}

impl Frame {
    /// Unvisited neighbours of `node` in exploration order: hostile ones by
    /// descending edge length, then the rest by ascending edge length.
    fn new(board: &Board, node: NodeId, visited: &BTreeSet<NodeId>) -> Self {
        let mut order: IndexedHeap<NodeId, i64> = IndexedHeap::new();
        for (neighbor, length) in board.nodes()[node].neighbors(board) {
            if visited.contains(&neighbor) {
                continue;
            }
            let length = i64::from(length);
            let priority = if board.nodes()[neighbor].is_hostile() {
                -length
            } else {
                length
            };
            order.insert(neighbor, priority);
        }
        Frame {
            candidates: std::iter::from_fn(|| order.extract_min()).collect(),
            next: 0,
        }
    }
}

/// Depth-first search for a long simple path from `start` to `end` that
/// routes through hostile nodes whenever it has the choice.
///
/// Visited nodes are never revisited, even from a sibling branch after
/// backtracking, which bounds the search to one pass over the graph. The
/// result is therefore a heuristic: it is some path biased toward hostiles,
/// not the longest one. Returns `None` when `end` is not reached.
pub fn longest_path_heuristic(board: &Board, start: NodeId, end: NodeId) -> Option<Vec<NodeId>> {
    board.node(start)?;
    board.node(end)?;

    let mut path = vec![start];
    if start == end {
        return Some(path);
    }

    let mut visited = BTreeSet::from([start]);
    let mut stack = vec![Frame::new(board, start, &visited)];

    while let Some(frame) = stack.last_mut() {
        let mut chosen = None;
        while frame.next < frame.candidates.len() {
            let candidate = frame.candidates[frame.next];
            frame.next += 1;
            if !visited.contains(&candidate) {
                chosen = Some(candidate);
                break;
            }
        }

        match chosen {
            Some(next) => {
                visited.insert(next);
                path.push(next);
                if next == end {
                    return Some(path);
                }
                stack.push(Frame::new(board, next, &visited));
            }
            None => {
                stack.pop();
                path.pop();
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::board::BoardBuilder;

    /// A - B - C - E with a detour A - D - E.
    ///
    /// ```text
    ///  A --2-- B --2-- C --2-- E
    ///   \                     /
    ///    ---5---- D ----4----
    /// ```
    fn five_node_board(hostile_b: bool) -> Board {
        let mut b = BoardBuilder::new(100, 100);
        let a = b.node("A", 0, 0).unwrap();
        let nb = b.node("B", 10, 0).unwrap();
        let c = b.node("C", 20, 0).unwrap();
        let d = b.node("D", 15, 20).unwrap();
        let e = b.node("E", 30, 0).unwrap();
        b.edge(a, nb, 2).unwrap();
        b.edge(nb, c, 2).unwrap();
        b.edge(c, e, 2).unwrap();
        b.edge(a, d, 5).unwrap();
        b.edge(d, e, 4).unwrap();
        if hostile_b {
            b.hostile(nb).unwrap();
        }
        b.earth(a).target(e);
        b.build().unwrap()
    }

    #[test]
    fn shortest_path_on_five_nodes() {
        let board = five_node_board(false);
        let path = shortest_path(&board, 0, 4);
        assert_eq!(path, vec![0, 1, 2, 4]);
        assert_eq!(path_distance(&board, &path), 6);
        let steps = path_steps(&board, &path);
        assert_eq!(steps.last().map(|s| s.cost), Some(6));
        assert_eq!(steps[1], PathStep { node: 1, cost: 2 });
    }

    #[test]
    fn trivial_and_unreachable_paths() {
        let mut b = BoardBuilder::new(10, 10);
        let a = b.node("A", 0, 0).unwrap();
        let c = b.node("C", 5, 5).unwrap();
        b.earth(a).target(c);
        let board = b.build().unwrap();
        assert_eq!(shortest_path(&board, a, a), vec![a]);
        assert!(shortest_path(&board, a, c).is_empty());
        assert!(shortest_path(&board, a, 99).is_empty());
        assert_eq!(path_distance(&board, &[]), 0);
        assert_eq!(path_distance(&board, &[a]), 0);
        assert_eq!(longest_path_heuristic(&board, a, c), None);
    }

    #[test]
    fn avoiding_hostiles_takes_the_detour() {
        let board = five_node_board(true);
        assert_eq!(shortest_path(&board, 0, 4), vec![0, 1, 2, 4]);
        let safe = shortest_path_avoiding_hostiles(&board, 0, 4);
        assert_eq!(safe, vec![0, 3, 4]);
        assert_eq!(count_hostiles(&board, &safe), 0);
        assert_eq!(path_distance(&board, &safe), 9);
    }

    #[test]
    fn avoiding_hostiles_without_detour_still_returns_a_route() {
        let mut b = BoardBuilder::new(10, 10);
        let a = b.node("A", 0, 0).unwrap();
        let h = b.node("H", 5, 0).unwrap();
        let c = b.node("C", 10, 0).unwrap();
        b.edge(a, h, 1).unwrap().edge(h, c, 1).unwrap();
        b.hostile(h).unwrap();
        b.earth(a).target(c);
        let board = b.build().unwrap();
        let path = shortest_path_avoiding_hostiles(&board, a, c);
        assert_eq!(path, vec![a, h, c]);
        assert!(!is_safe_path(&board, &path, 1));
        assert!(is_safe_path(&board, &path, 2));
    }

    #[test]
    fn longest_path_prefers_hostiles() {
        let board = five_node_board(true);
        // Hostile B is taken first even though D is the longer edge.
        let path = longest_path_heuristic(&board, 0, 4).unwrap();
        assert_eq!(path, vec![0, 1, 2, 4]);

        let board = five_node_board(false);
        // Without hostiles the shorter edge is explored first.
        let path = longest_path_heuristic(&board, 0, 4).unwrap();
        assert_eq!(path, vec![0, 1, 2, 4]);
        let path = longest_path_heuristic(&board, 4, 0).unwrap();
        assert_eq!(path, vec![4, 2, 1, 0]);
    }

    #[test]
    fn longest_path_backtracks_out_of_dead_ends() {
        // A - S (dead end, short edge) and A - E.
        let mut b = BoardBuilder::new(10, 10);
        let a = b.node("A", 0, 0).unwrap();
        let s = b.node("S", 1, 0).unwrap();
        let t = b.node("T", 2, 0).unwrap();
        let e = b.node("E", 0, 9).unwrap();
        b.edge(a, s, 1).unwrap().edge(s, t, 1).unwrap().edge(a, e, 9).unwrap();
        b.earth(a).target(e);
        let board = b.build().unwrap();
        assert_eq!(longest_path_heuristic(&board, a, e), Some(vec![a, e]));
        assert_eq!(longest_path_heuristic(&board, a, a), Some(vec![a]));
    }

    #[test]
    fn connectivity() {
        let board = five_node_board(false);
        assert!(is_connected(&board));
        assert_eq!(reachable_from(&board, 2).len(), 5);
    }
}
