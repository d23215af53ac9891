//! Canonical engine state.
//!
//! [`ProgressionState`] is the single source of truth the engine reduces
//! over: the enabled graphs, the player's level and point pool, and the
//! in-flight skill activations. All mutation flows through the action
//! transitions; this module only provides the data and its lookups.

mod connection;
mod graph;
mod node;
mod snapshot;

pub use connection::Connection;
pub use graph::{Graph, GraphError, GraphId, GridDimensions};
pub use node::{Node, NodeState};
pub use snapshot::{GraphSnapshot, NodeSnapshot, ProgressionSnapshot, SnapshotReport};

/// The player-side point economy: current level and unspent points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PlayerState {
    pub level: u32,
    pub point_pool: u32,
}

/// Identifier of one skill activation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct UseId(pub u64);

/// Identifier of the unit using a skill. Opaque to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct UserId(pub u64);

/// Address of a node across graphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeRef {
    pub graph: GraphId,
    pub position: u32,
}

/// An in-flight skill activation.
///
/// A use stays in the active list until it is completed *and* its cooldown
/// (if any) has elapsed, so a still-cooling-down skill keeps blocking
/// re-use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UsedSkill {
    pub id: UseId,
    pub node: NodeRef,
    pub user: UserId,
    pub winding_up: bool,
    pub on_cooldown: bool,
    pub completed: bool,
}

/// Everything the engine mutates: graphs, point economy, activations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProgressionState {
    graphs: Vec<Graph>,
    pub player: PlayerState,
    uses: Vec<UsedSkill>,
    /// Monotonic mutation counter, bumped once per executed action.
    pub nonce: u64,
    next_use_id: u64,
}

impl ProgressionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables a graph. Graph ids must be unique.
    pub fn add_graph(&mut self, graph: Graph) -> Result<(), GraphError> {
        if self.graphs.iter().any(|g| g.id() == graph.id()) {
            return Err(GraphError::DuplicateGraph(graph.id()));
        }
        self.graphs.push(graph);
        self.graphs.sort_by_key(Graph::id);
        Ok(())
    }

    /// Disables a graph, dropping its nodes and connections with it.
    pub fn remove_graph(&mut self, id: GraphId) -> Option<Graph> {
        let index = self.graphs.iter().position(|g| g.id() == id)?;
        Some(self.graphs.remove(index))
    }

    /// Enabled graphs in ascending id order.
    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn graph(&self, id: GraphId) -> Option<&Graph> {
        self.graphs.iter().find(|g| g.id() == id)
    }

    pub(crate) fn graph_mut(&mut self, id: GraphId) -> Option<&mut Graph> {
        self.graphs.iter_mut().find(|g| g.id() == id)
    }

    /// First node matching the key across enabled graphs.
    pub fn find_node_by_key(&self, key: &str) -> Option<(GraphId, &Node)> {
        self.graphs
            .iter()
            .find_map(|g| g.node_by_key(key).map(|n| (g.id(), n)))
    }

    /// First node matching the display name across enabled graphs.
    pub fn find_node_by_name(&self, name: &str) -> Option<(GraphId, &Node)> {
        self.graphs
            .iter()
            .find_map(|g| g.node_by_name(name).map(|n| (g.id(), n)))
    }

    pub fn node(&self, reference: NodeRef) -> Option<&Node> {
        self.graph(reference.graph)?.node(reference.position)
    }

    /// In-flight skill activations.
    pub fn uses(&self) -> &[UsedSkill] {
        &self.uses
    }

    pub fn use_by_id(&self, id: UseId) -> Option<&UsedSkill> {
        self.uses.iter().find(|u| u.id == id)
    }

    pub(crate) fn use_mut(&mut self, id: UseId) -> Option<&mut UsedSkill> {
        self.uses.iter_mut().find(|u| u.id == id)
    }

    pub(crate) fn allocate_use_id(&mut self) -> UseId {
        let id = UseId(self.next_use_id);
        self.next_use_id += 1;
        id
    }

    pub(crate) fn push_use(&mut self, used: UsedSkill) {
        self.uses.push(used);
    }

    pub(crate) fn retire_use(&mut self, id: UseId) {
        self.uses.retain(|u| u.id != id);
    }

    pub(crate) fn clear_uses(&mut self) {
        self.uses.clear();
    }

    /// Explicit reset: drops graphs, activations, and the point economy.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
