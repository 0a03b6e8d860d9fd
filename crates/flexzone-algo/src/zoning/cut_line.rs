//! Edge elimination along the shortest path between two anchors.
//!
//! CutLine removes the edge at the midpoint of the shortest start→end path
//! until the zone graph falls apart, then hands the pieces to
//! [`find_partitions`]. When the bisection leaves one anchor's side too
//! small, the decision point that produced it is revisited once: the same
//! graph snapshot is cut instead at the path edge adjacent to that anchor.
//!
//! The search runs on an explicit stack of [`Frame`]s. A frame owns the
//! graph snapshot it was entered with, so backtracking never has to undo
//! removals. Every descent removes one edge, which bounds the stack depth
//! by the zone's edge count.

use flexzone_core::NodeId;
use tracing::{debug, trace};

use super::find_partitions::{find_partitions, Anchor, Bisection, PartitionOutcome};
use super::graph::ZoneGraph;

#[derive(Debug, Clone, PartialEq)]
pub enum CutOutcome {
    Feasible(Bisection),
    /// Every attempt left the side of `side` with only `size` nodes.
    Undersized { side: Anchor, size: usize },
    /// Anchors are identical or not connected.
    NoPath,
}

impl CutOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, CutOutcome::Feasible(_))
    }

    pub fn into_bisection(self) -> Option<Bisection> {
        match self {
            CutOutcome::Feasible(bisection) => Some(bisection),
            _ => None,
        }
    }
}

impl From<PartitionOutcome> for CutOutcome {
    fn from(outcome: PartitionOutcome) -> Self {
        match outcome {
            PartitionOutcome::Feasible(bisection) => CutOutcome::Feasible(bisection),
            PartitionOutcome::Undersized { side, size } => CutOutcome::Undersized { side, size },
        }
    }
}

/// A committed decision point of the search.
#[derive(Debug)]
struct Frame {
    /// Graph before this frame removed anything
    graph: ZoneGraph,
    path: Vec<NodeId>,
    midpoint: (NodeId, NodeId),
    retried: bool,
}

impl Frame {
    /// Path edge touching the anchor on `side`.
    fn anchor_edge(&self, side: Anchor) -> (NodeId, NodeId) {
        let n = self.path.len();
        match side {
            Anchor::Start => (self.path[0], self.path[1]),
            Anchor::End => (self.path[n - 2], self.path[n - 1]),
        }
    }
}

enum Step {
    Descend(ZoneGraph),
    Resolve(CutOutcome),
}

/// Edge `(path[n/2 - 1], path[n/2])` of a path with `n >= 2` nodes.
fn midpoint_edge(path: &[NodeId]) -> (NodeId, NodeId) {
    let half = path.len() / 2;
    (path[half - 1], path[half])
}

fn same_edge(a: (NodeId, NodeId), b: (NodeId, NodeId)) -> bool {
    a == b || (a.0 == b.1 && a.1 == b.0)
}

/// Remove `edge` from a copy of `graph` and decide what to do next.
fn remove_and_probe(
    graph: &ZoneGraph,
    edge: (NodeId, NodeId),
    start: NodeId,
    end: NodeId,
    min_nodes: usize,
) -> Step {
    let mut reduced = graph.clone();
    if reduced.remove_edge_between(edge.0, edge.1).is_none() {
        return Step::Resolve(CutOutcome::NoPath);
    }
    if reduced.is_connected() {
        Step::Descend(reduced)
    } else {
        Step::Resolve(find_partitions(&reduced, start, end, min_nodes).into())
    }
}

/// Split `graph` so that `start` and `end` land in different parts, each
/// with at least `min_nodes` nodes.
///
/// Infeasibility is a value: [`CutOutcome::Undersized`] names the anchor
/// whose side stayed too small after all retries.
pub fn cut_line(graph: &ZoneGraph, start: NodeId, end: NodeId, min_nodes: usize) -> CutOutcome {
    let mut stack: Vec<Frame> = Vec::new();
    let mut step = Step::Descend(graph.clone());

    loop {
        step = match step {
            Step::Descend(current) => match current.shortest_path(start, end) {
                Some(path) if path.len() >= 2 => {
                    let midpoint = midpoint_edge(&path);
                    trace!(
                        depth = stack.len(),
                        edges = current.edge_count(),
                        from = midpoint.0.value(),
                        to = midpoint.1.value(),
                        "removing midpoint edge"
                    );
                    let next = remove_and_probe(&current, midpoint, start, end, min_nodes);
                    stack.push(Frame {
                        graph: current,
                        path,
                        midpoint,
                        retried: false,
                    });
                    next
                }
                _ => Step::Resolve(CutOutcome::NoPath),
            },
            Step::Resolve(outcome) => {
                let depth = stack.len().saturating_sub(1);
                let Some(frame) = stack.last_mut() else {
                    return outcome;
                };
                match outcome {
                    CutOutcome::Undersized { side, size } if !frame.retried => {
                        let alternate = frame.anchor_edge(side);
                        if same_edge(alternate, frame.midpoint) {
                            stack.pop();
                            Step::Resolve(CutOutcome::Undersized { side, size })
                        } else {
                            debug!(
                                depth,
                                %side,
                                size,
                                from = alternate.0.value(),
                                to = alternate.1.value(),
                                "side too small, retrying with anchor edge"
                            );
                            frame.retried = true;
                            remove_and_probe(&frame.graph, alternate, start, end, min_nodes)
                        }
                    }
                    outcome => {
                        stack.pop();
                        Step::Resolve(outcome)
                    }
                }
            }
        };
    }
}
