//! Graph loader.
//!
//! Resolves each stat's descriptor reference against the registry and
//! hands structural validation (duplicate positions, dangling
//! connections) to [`skilltree_core::Graph::new`].

use std::path::Path;
use std::sync::Arc;

use skilltree_core::{
    Connection, DescriptorId, DescriptorRegistry, Graph, GraphId, GridDimensions, Node, Stat, Tick,
};

use crate::loaders::{LoadResult, read_file};
use crate::specs::{GraphSpec, NodeSpec};

/// Loader for progression graphs from RON files.
pub struct GraphLoader;

impl GraphLoader {
    /// Load a graph from a RON file.
    ///
    /// RON format: `GraphSpec`.
    pub fn load(path: &Path, registry: &DescriptorRegistry) -> LoadResult<Graph> {
        let content = read_file(path)?;
        let spec: GraphSpec = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse graph RON: {}", e))?;
        Self::build(spec, registry)
    }

    /// Builds a graph from an already-parsed spec.
    pub fn build(spec: GraphSpec, registry: &DescriptorRegistry) -> LoadResult<Graph> {
        let id = spec.graph_id();
        let grid = GridDimensions {
            columns: spec.grid_columns,
            rows: spec.grid_rows,
        };

        let mut nodes = Vec::with_capacity(spec.nodes.len());
        for node_spec in &spec.nodes {
            nodes.push(build_node(node_spec, registry).map_err(|e| {
                anyhow::anyhow!("Graph '{}', node '{}': {}", spec.display_name, node_spec.key, e)
            })?);
        }

        let connections = spec
            .connections
            .iter()
            .map(|c| Connection::new(id, c.node_a, c.node_b, c.two_way))
            .collect();

        let graph = Graph::new(id, spec.display_name.clone(), grid, nodes, connections)
            .map_err(|e| anyhow::anyhow!("Graph '{}' is malformed: {}", spec.display_name, e))?;

        let invalid: Vec<&str> = graph
            .nodes()
            .iter()
            .filter(|n| !n.is_valid())
            .map(|n| n.key())
            .collect();
        if !invalid.is_empty() {
            anyhow::bail!(
                "Graph '{}' contains incomplete nodes: {}",
                spec.display_name,
                invalid.join(", ")
            );
        }

        tracing::debug!(
            graph = %graph.id(),
            nodes = graph.nodes().len(),
            connections = graph.connections().len(),
            "graph loaded"
        );
        Ok(graph)
    }
}

fn build_node(spec: &NodeSpec, registry: &DescriptorRegistry) -> LoadResult<Node> {
    let mut stats = Vec::with_capacity(spec.stats.len());
    for stat_spec in &spec.stats {
        let descriptor = registry
            .get(DescriptorId(stat_spec.descriptor))
            .ok_or_else(|| {
                anyhow::anyhow!("unknown descriptor id {}", stat_spec.descriptor)
            })?;
        stats.push(Stat::new(
            Arc::clone(descriptor),
            stat_spec.initial_value,
            stat_spec.scaling,
            spec.max_level,
            stat_spec.combine_kind,
            stat_spec.combine_operator,
        ));
    }

    let mut node = Node::new(
        spec.position_index,
        &spec.key,
        &spec.display_name,
        &spec.description,
        spec.max_level,
        stats,
    )
    .with_requirements(spec.player_level_requirement, spec.tree_points_requirement)
    .with_timings(Tick(spec.windup), Tick(spec.cooldown));
    if !spec.node_type.is_empty() {
        node = node.with_node_type(&spec.node_type);
    }
    Ok(node)
}
