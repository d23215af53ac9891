//! On-disk formats for authored content.
//!
//! Specs mirror the engine types but stay flat and fully serializable:
//! stats reference descriptors by id, and the loaders resolve those
//! references against a [`skilltree_core::DescriptorRegistry`] while
//! validating the result. Engine types are never deserialized directly.

use skilltree_core::{CombineKind, CombineOperator, GraphId, NumericKind, Scalar, ValueKind};

/// A value descriptor as authored in `descriptors.ron`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DescriptorSpec {
    pub id: u32,
    pub display_name: String,
    pub abbreviation: String,
    pub numeric_kind: NumericKind,
    pub value_kind: ValueKind,
    #[serde(default)]
    pub min: Option<Scalar>,
    #[serde(default)]
    pub max: Option<Scalar>,
}

/// A stat owned by a node, referencing its descriptor by id.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatSpec {
    pub descriptor: u32,
    pub initial_value: Scalar,
    pub scaling: Scalar,
    #[serde(default = "default_combine_kind")]
    pub combine_kind: CombineKind,
    #[serde(default = "default_combine_operator")]
    pub combine_operator: CombineOperator,
}

fn default_combine_kind() -> CombineKind {
    CombineKind::Value
}

fn default_combine_operator() -> CombineOperator {
    CombineOperator::Add
}

/// A node as authored inside a graph file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeSpec {
    pub position_index: u32,
    pub key: String,
    pub display_name: String,
    pub description: String,
    #[serde(default)]
    pub node_type: String,
    pub max_level: u32,
    #[serde(default)]
    pub player_level_requirement: u32,
    #[serde(default)]
    pub tree_points_requirement: u32,
    /// Skill windup in ticks; zero means instant.
    #[serde(default)]
    pub windup: u64,
    /// Skill cooldown in ticks; zero means none.
    #[serde(default)]
    pub cooldown: u64,
    pub stats: Vec<StatSpec>,
}

/// A connection between two node positions of the same graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConnectionSpec {
    pub node_a: u32,
    pub node_b: u32,
    #[serde(default)]
    pub two_way: bool,
}

/// A whole graph file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphSpec {
    pub id: u32,
    pub display_name: String,
    #[serde(default)]
    pub grid_columns: u32,
    #[serde(default)]
    pub grid_rows: u32,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub connections: Vec<ConnectionSpec>,
}

impl GraphSpec {
    pub fn graph_id(&self) -> GraphId {
        GraphId(self.id)
    }
}
