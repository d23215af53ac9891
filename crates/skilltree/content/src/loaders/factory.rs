//! Content factory for assembling an engine from a data directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use skilltree_core::{DescriptorRegistry, Engine, EngineConfig, Graph};

use crate::loaders::{DescriptorLoader, GraphLoader, LoadResult, SettingsLoader};

/// Content factory that loads all progression content from a data
/// directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── settings.toml
/// ├── descriptors.ron
/// └── graphs/
///     ├── combat.ron
///     └── mastery.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine settings from `settings.toml`.
    pub fn load_settings(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("settings.toml");
        SettingsLoader::load(&path)
    }

    /// Load the descriptor registry from `descriptors.ron`.
    pub fn load_descriptors(&self) -> LoadResult<DescriptorRegistry> {
        let path = self.data_dir.join("descriptors.ron");
        DescriptorLoader::load(&path)
    }

    /// Load a single graph from `graphs/{graph_name}.ron`.
    pub fn load_graph(&self, graph_name: &str, registry: &DescriptorRegistry) -> LoadResult<Graph> {
        let path = self
            .data_dir
            .join("graphs")
            .join(format!("{}.ron", graph_name));
        GraphLoader::load(&path, registry)
    }

    /// Load every graph under `graphs/`, sorted by file name so the load
    /// order is deterministic.
    pub fn load_graphs(&self, registry: &DescriptorRegistry) -> LoadResult<Vec<Graph>> {
        let dir = self.data_dir.join("graphs");
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read graph directory {}: {}", dir.display(), e))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
            .collect();
        paths.sort();

        let mut graphs = Vec::with_capacity(paths.len());
        for path in paths {
            graphs.push(GraphLoader::load(&path, registry)?);
        }
        Ok(graphs)
    }

    /// Assembles a ready-to-use engine: settings, descriptors, and every
    /// graph, with node type labels validated against the settings.
    pub fn build_engine(&self) -> LoadResult<Engine> {
        let config = self.load_settings()?;
        let registry = self.load_descriptors()?;
        let graphs = self.load_graphs(&registry)?;

        validate_node_types(&config, &graphs)?;

        let mut engine = Engine::new(config, Arc::new(registry));
        for graph in graphs {
            let id = graph.id();
            engine
                .add_graph(graph)
                .map_err(|e| anyhow::anyhow!("Failed to enable {}: {}", id, e))?;
        }
        tracing::info!(
            graphs = engine.state().graphs().len(),
            descriptors = engine.registry().len(),
            "engine assembled from content"
        );
        Ok(engine)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Rejects node type labels outside the configured list. An empty list
/// disables the check.
fn validate_node_types(config: &EngineConfig, graphs: &[Graph]) -> LoadResult<()> {
    if config.node_type_labels.is_empty() {
        return Ok(());
    }
    for graph in graphs {
        for node in graph.nodes() {
            if !node.node_type.is_empty() && !config.node_type_labels.contains(&node.node_type) {
                anyhow::bail!(
                    "Node '{}' in {} has unrecognized type '{}'",
                    node.key(),
                    graph.id(),
                    node.node_type
                );
            }
        }
    }
    Ok(())
}
