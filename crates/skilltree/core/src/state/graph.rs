//! The connection/unlock graph.
//!
//! A [`Graph`] owns a collection of nodes and connections; node and
//! connection lifetime is bound to the graph. It computes aggregate point
//! totals and supplies the read-only halves of the cascading passes: the
//! mutating halves live in the action transitions, which also own the
//! point-pool side effects.

use super::connection::Connection;
use super::node::{Node, NodeState};

/// Identifier of a graph, unique across the engine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct GraphId(pub u32);

impl core::fmt::Display for GraphId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "graph#{}", self.0)
    }
}

/// Editor grid the graph was authored on. Layout geometry is presentation
/// business; the engine only carries the dimensions through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridDimensions {
    pub columns: u32,
    pub rows: u32,
}

/// Structural errors detected while assembling a graph.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("duplicate node position index {0}")]
    DuplicatePosition(u32),

    #[error("duplicate node key {0:?}")]
    DuplicateKey(String),

    #[error("connection references missing node {position} in {graph}")]
    MissingEndpoint { graph: GraphId, position: u32 },

    #[error("connection belongs to {actual}, expected {expected}")]
    ForeignConnection { expected: GraphId, actual: GraphId },

    #[error("connection joins node {0} to itself")]
    SelfLoop(u32),

    #[error("{0} is already registered")]
    DuplicateGraph(GraphId),
}

/// A collection of nodes and the connections that gate their unlocks.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    id: GraphId,
    pub display_name: String,
    grid: GridDimensions,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl Graph {
    /// Assembles a graph, validating structural invariants: unique node
    /// positions and keys, and connections whose endpoints exist here.
    ///
    /// Nodes are kept sorted by position index so every pass over them is
    /// deterministic.
    pub fn new(
        id: GraphId,
        display_name: impl Into<String>,
        grid: GridDimensions,
        mut nodes: Vec<Node>,
        connections: Vec<Connection>,
    ) -> Result<Self, GraphError> {
        nodes.sort_by_key(Node::position_index);
        for pair in nodes.windows(2) {
            if pair[0].position_index() == pair[1].position_index() {
                return Err(GraphError::DuplicatePosition(pair[0].position_index()));
            }
        }
        for (i, node) in nodes.iter().enumerate() {
            if nodes[..i].iter().any(|n| n.key() == node.key()) {
                return Err(GraphError::DuplicateKey(node.key().to_owned()));
            }
        }

        for connection in &connections {
            if connection.graph != id {
                return Err(GraphError::ForeignConnection {
                    expected: id,
                    actual: connection.graph,
                });
            }
            if connection.node_a == connection.node_b {
                return Err(GraphError::SelfLoop(connection.node_a));
            }
            for position in [connection.node_a, connection.node_b] {
                if !nodes.iter().any(|n| n.position_index() == position) {
                    return Err(GraphError::MissingEndpoint {
                        graph: id,
                        position,
                    });
                }
            }
        }

        Ok(Self {
            id,
            display_name: display_name.into(),
            grid,
            nodes,
            connections,
        })
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn grid(&self) -> GridDimensions {
        self.grid
    }

    /// Nodes in ascending position order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn node(&self, position: u32) -> Option<&Node> {
        self.nodes.iter().find(|n| n.position_index() == position)
    }

    pub(crate) fn node_mut(&mut self, position: u32) -> Option<&mut Node> {
        self.nodes
            .iter_mut()
            .find(|n| n.position_index() == position)
    }

    pub fn node_by_key(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.key() == key)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.display_name == name)
    }

    /// Sum of `max_level` over valid nodes.
    pub fn total_points(&self) -> u32 {
        self.nodes
            .iter()
            .filter(|n| n.is_valid())
            .map(Node::max_level)
            .sum()
    }

    /// Sum of `current_level` over valid nodes.
    pub fn points_spent(&self) -> u32 {
        self.nodes
            .iter()
            .filter(|n| n.is_valid())
            .map(Node::current_level)
            .sum()
    }

    /// Connections that have this position as an endpoint.
    pub fn connections_of(&self, position: u32) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.touches(position))
    }

    /// Positions directly connected to this one, in connection order.
    pub fn neighbors(&self, position: u32) -> Vec<u32> {
        self.connections_of(position)
            .filter_map(|c| c.partner_of(position))
            .collect()
    }

    /// The requires-connections rule: a node requires a prior connection
    /// iff some one-way connection has it as the destination.
    pub fn requires_prior_connection(&self, position: u32) -> bool {
        self.connections
            .iter()
            .any(|c| c.is_requirement_for(position))
    }

    /// Connection reachability for the `Locked → Unlocked` transition.
    ///
    /// A node with no inbound one-way requirement unlocks unconditionally;
    /// otherwise at least one granting partner must be obtained. Level and
    /// points gates are enforced by the deplete pass, not here.
    pub fn can_unlock(&self, position: u32) -> bool {
        if !self.requires_prior_connection(position) {
            return true;
        }
        self.connections_of(position)
            .filter_map(|c| c.granting_partner_for(position))
            .filter_map(|partner| self.node(partner))
            .any(|partner| partner.state().is_obtained())
    }

    /// Read phase of the unlock pass: locked nodes whose connection
    /// reachability is now satisfied, in ascending position order.
    pub fn collect_unlockable(&self) -> Vec<u32> {
        self.nodes
            .iter()
            .filter(|n| n.state() == NodeState::Locked && self.can_unlock(n.position_index()))
            .map(Node::position_index)
            .collect()
    }

    /// Read phase of the deplete pass: obtained nodes whose gates fail
    /// once their own investment is excluded from the spent total.
    pub fn collect_gate_failures(&self, player_level: u32) -> Vec<u32> {
        let spent = self.points_spent();
        self.nodes
            .iter()
            .filter(|n| n.state().is_obtained())
            .filter(|n| {
                let spent_elsewhere = spent - n.current_level();
                n.player_level_requirement > player_level
                    || n.tree_points_requirement > spent_elsewhere
            })
            .map(Node::position_index)
            .collect()
    }

    /// Obtained dependents of `position` whose unlock is no longer
    /// justified by any other obtained partner. Read phase of the
    /// connection cascade that follows a full downgrade.
    pub fn collect_unjustified_dependents(&self, position: u32) -> Vec<u32> {
        self.connections_of(position)
            .filter_map(|c| c.partner_of(position))
            .filter(|&partner| {
                self.node(partner).is_some_and(|n| n.state().is_obtained())
                    && self.requires_prior_connection(partner)
                    && !self.can_unlock(partner)
            })
            .collect()
    }
}
