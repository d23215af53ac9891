//! Unlock dependencies between nodes.

use super::graph::GraphId;

/// A directed or bidirectional edge between two nodes of one graph.
///
/// Endpoints are position indices within the owning graph. A one-way
/// connection makes `node_b` require `node_a`; a two-way connection lets
/// either side unlock the other once obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Connection {
    pub graph: GraphId,
    pub node_a: u32,
    pub node_b: u32,
    pub two_way: bool,
}

impl Connection {
    pub fn new(graph: GraphId, node_a: u32, node_b: u32, two_way: bool) -> Self {
        Self {
            graph,
            node_a,
            node_b,
            two_way,
        }
    }

    /// Symmetric equality: a two-way A↔B equals a two-way B↔A.
    pub fn is_equal_to(&self, other: &Connection) -> bool {
        if self.graph != other.graph || self.two_way != other.two_way {
            return false;
        }
        let straight = self.node_a == other.node_a && self.node_b == other.node_b;
        let reversed = self.node_a == other.node_b && self.node_b == other.node_a;
        straight || (self.two_way && reversed)
    }

    /// True when the connection has this position as an endpoint.
    pub fn touches(&self, position: u32) -> bool {
        self.node_a == position || self.node_b == position
    }

    /// The opposite endpoint, if this position is an endpoint at all.
    pub fn partner_of(&self, position: u32) -> Option<u32> {
        if self.node_a == position {
            Some(self.node_b)
        } else if self.node_b == position {
            Some(self.node_a)
        } else {
            None
        }
    }

    /// Whether this connection makes `position` require a prior node:
    /// a one-way edge with `position` as its destination.
    pub fn is_requirement_for(&self, position: u32) -> bool {
        !self.two_way && self.node_b == position
    }

    /// The endpoint whose obtained state can justify unlocking `position`
    /// through this connection. One-way edges only grant forward.
    pub fn granting_partner_for(&self, position: u32) -> Option<u32> {
        if self.two_way {
            self.partner_of(position)
        } else if self.node_b == position {
            Some(self.node_a)
        } else {
            None
        }
    }
}
