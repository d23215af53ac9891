//! Minimal persistable projection of progression.
//!
//! A snapshot stores just enough per node to restore progression without
//! re-deriving it: position, level, and state. Everything else (stat
//! values, point totals) is recomputed on apply. Serialization of the
//! snapshot itself is the caller's business; these are plain serde types.

use super::graph::{Graph, GraphId};
use super::node::NodeState;
use super::{PlayerState, ProgressionState};

/// Persistable state of a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NodeSnapshot {
    pub position_index: u32,
    pub current_level: u32,
    pub state: NodeState,
}

/// Persistable state of a whole graph, matched by graph id on restore.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GraphSnapshot {
    pub graph: GraphId,
    pub nodes: Vec<NodeSnapshot>,
}

/// Persistable projection of the whole progression: the point economy
/// plus every graph's levels and states.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgressionSnapshot {
    pub player: PlayerState,
    pub graphs: Vec<GraphSnapshot>,
}

/// What a snapshot application actually did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Nodes restored.
    pub applied: usize,
    /// Position indices present in the snapshot but absent from the graph.
    /// Stale entries are skipped, not fatal.
    pub skipped: Vec<u32>,
    /// Graph ids present in the snapshot but no longer enabled.
    pub skipped_graphs: Vec<GraphId>,
}

impl GraphSnapshot {
    /// Captures the restorable projection of a graph.
    pub fn capture(graph: &Graph) -> Self {
        Self {
            graph: graph.id(),
            nodes: graph
                .nodes()
                .iter()
                .map(|n| NodeSnapshot {
                    position_index: n.position_index(),
                    current_level: n.current_level(),
                    state: n.state(),
                })
                .collect(),
        }
    }

    /// Restores levels and states onto a graph.
    ///
    /// Levels are clamped to each node's `max_level` and re-propagated to
    /// stats. For nonzero levels the state is re-derived from the level so
    /// the Maxed invariant cannot be violated by a stale snapshot; at level
    /// zero the recorded state distinguishes Locked from Unlocked (an
    /// obtained state recorded at level zero falls back to Unlocked).
    pub(crate) fn apply_to(&self, graph: &mut Graph) -> SnapshotReport {
        let mut report = SnapshotReport::default();

        for entry in &self.nodes {
            let Some(node) = graph.node_mut(entry.position_index) else {
                report.skipped.push(entry.position_index);
                continue;
            };

            node.set_level(entry.current_level);
            let restored = if node.current_level() > 0 {
                node.state_for_level(node.current_level())
            } else {
                match entry.state {
                    NodeState::Locked => NodeState::Locked,
                    _ => NodeState::Unlocked,
                }
            };
            node.set_state(restored);
            report.applied += 1;
        }

        report
    }
}

impl ProgressionSnapshot {
    pub fn capture(state: &ProgressionState) -> Self {
        Self {
            player: state.player,
            graphs: state.graphs().iter().map(GraphSnapshot::capture).collect(),
        }
    }

    /// Restores the player economy and every matching graph. Snapshots of
    /// graphs that are no longer enabled are skipped and reported.
    pub(crate) fn apply_to(&self, state: &mut ProgressionState) -> SnapshotReport {
        let mut report = SnapshotReport::default();
        state.player = self.player;

        for snapshot in &self.graphs {
            let Some(graph) = state.graph_mut(snapshot.graph) else {
                report.skipped_graphs.push(snapshot.graph);
                continue;
            };
            let partial = snapshot.apply_to(graph);
            report.applied += partial.applied;
            report.skipped.extend(partial.skipped);
        }

        report
    }
}
