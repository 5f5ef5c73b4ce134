use crate::graph::edge::Edge;
use crate::Node;

/// Phases of a single generation attempt, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Placement,
    Hulls,
    HullConnection,
    DegreeRepair,
    DegreeAugmentation,
    Relaxation,
    TargetPlacement,
    SafePath,
    UpgradeCleanup,
    Finalize,
}

/// Receives progress notifications while a board is being generated, e.g.
/// to animate the build. Every method defaults to doing nothing.
pub trait GenerationObserver {
    fn stage_begin(&mut self, _stage: Stage) {}

    fn node_placed(&mut self, _node: &Node) {}

    fn edge_added(&mut self, _edge: &Edge) {}

    fn edge_removed(&mut self, _edge: &Edge) {}

    /// An attempt was thrown away and generation starts over.
    fn attempt_failed(&mut self, _attempt: u32, _reason: &str) {}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}
