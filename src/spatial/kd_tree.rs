use serde::{Deserialize, Serialize};

/// Node in a 2D k-d tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KDNode {
    pub point: [f64; 2],
    pub index: usize,
    pub axis: usize,
    pub left: Option<Box<KDNode>>,
    pub right: Option<Box<KDNode>>,
}

/// Simple 2D k-d tree over board positions supporting nearest-point queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KDTree {
    pub root: Option<Box<KDNode>>,
}

impl KDTree {
    pub fn build(points: &[[f64; 2]]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let root = Self::build_recursive(points, &mut indices, 0);
        KDTree { root }
    }

    fn build_recursive(
        points: &[[f64; 2]],
        idx: &mut [usize],
        depth: usize,
    ) -> Option<Box<KDNode>> {
        use core::cmp::Ordering;

        if idx.is_empty() {
            return None;
        }

        let axis = depth % 2;
        idx.sort_by(|&a, &b| {
            points[a][axis]
                .partial_cmp(&points[b][axis])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });
        let mid = idx.len() / 2;
        let median = idx[mid];

        Some(Box::new(KDNode {
            point: points[median],
            index: median,
            axis,
            left: Self::build_recursive(points, &mut idx[..mid], depth + 1),
            right: Self::build_recursive(points, &mut idx[mid + 1..], depth + 1),
        }))
    }

    /// Index of the point closest to `target` and its distance. Equidistant
    /// points resolve to the lowest index.
    pub fn nearest(&self, target: [f64; 2]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        Self::search_recursive(&self.root, target, &mut best);
        best.map(|(idx, d2)| (idx, d2.sqrt()))
    }

    fn search_recursive(
        node: &Option<Box<KDNode>>,
        target: [f64; 2],
        best: &mut Option<(usize, f64)>,
    ) {
        let Some(noderef) = node else {
            return;
        };

        let dx = noderef.point[0] - target[0];
        let dy = noderef.point[1] - target[1];
        let dist2 = dx * dx + dy * dy;
        let better = match *best {
            None => true,
            Some((idx, d2)) => dist2 < d2 || (dist2 == d2 && noderef.index < idx),
        };
        if better {
            *best = Some((noderef.index, dist2));
        }

        let axis = noderef.axis;
        let delta = target[axis] - noderef.point[axis];
        let (first, second) = if delta < 0.0 {
            (&noderef.left, &noderef.right)
        } else {
            (&noderef.right, &noderef.left)
        };

        Self::search_recursive(first, target, best);
        if best.map_or(true, |(_, d2)| delta * delta <= d2) {
            Self::search_recursive(second, target, best);
        }
    }
}
