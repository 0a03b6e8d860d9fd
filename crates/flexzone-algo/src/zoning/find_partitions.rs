//! Bisection of an already disconnected zone graph.

use std::collections::BTreeSet;
use std::fmt;

use flexzone_core::NodeId;
use serde::{Deserialize, Serialize};

use super::graph::ZoneGraph;

/// One endpoint of the congested line a cut is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    Start,
    End,
}

impl Anchor {
    pub fn other(self) -> Self {
        match self {
            Anchor::Start => Anchor::End,
            Anchor::End => Anchor::Start,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Start => write!(f, "start"),
            Anchor::End => write!(f, "end"),
        }
    }
}

/// Two-way split of a zone's node set.
#[derive(Debug, Clone, PartialEq)]
pub struct Bisection {
    /// Component grown from `grown_from`
    pub first: BTreeSet<NodeId>,
    /// Every other node of the zone
    pub second: BTreeSet<NodeId>,
    pub grown_from: Anchor,
}

impl Bisection {
    pub fn smaller_side(&self) -> usize {
        self.first.len().min(self.second.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionOutcome {
    Feasible(Bisection),
    /// The component on `side` has fewer than the minimum number of nodes.
    Undersized { side: Anchor, size: usize },
}

/// Split `graph` into the component of one anchor and everything else.
///
/// Grows from `start` when its distinct-neighbor count is at most that of
/// `end`, otherwise from `end`. Both sides must hold at least `min_nodes`
/// nodes; if not, the undersized side is reported by its anchor: the grown
/// anchor when the grown side is too small, else the other anchor.
pub fn find_partitions(
    graph: &ZoneGraph,
    start: NodeId,
    end: NodeId,
    min_nodes: usize,
) -> PartitionOutcome {
    let grown_from = if graph.degree(start) <= graph.degree(end) {
        Anchor::Start
    } else {
        Anchor::End
    };
    let seed = match grown_from {
        Anchor::Start => start,
        Anchor::End => end,
    };

    let first = graph.reachable_from(seed);
    let second: BTreeSet<NodeId> = graph
        .node_ids()
        .filter(|id| !first.contains(id))
        .collect();

    if first.len() < min_nodes {
        PartitionOutcome::Undersized {
            side: grown_from,
            size: first.len(),
        }
    } else if second.len() < min_nodes {
        PartitionOutcome::Undersized {
            side: grown_from.other(),
            size: second.len(),
        }
    } else {
        PartitionOutcome::Feasible(Bisection {
            first,
            second,
            grown_from,
        })
    }
}
