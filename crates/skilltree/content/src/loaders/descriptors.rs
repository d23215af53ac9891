//! Descriptor registry loader.

use std::path::Path;

use skilltree_core::{DescriptorId, DescriptorRegistry, ValueDescriptor};

use crate::loaders::{LoadResult, read_file};
use crate::specs::DescriptorSpec;

/// Loader for the descriptor registry from RON files.
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// Load a descriptor registry from a RON file.
    ///
    /// RON format: `Vec<DescriptorSpec>`. Duplicate ids and inverted
    /// bounds are rejected.
    pub fn load(path: &Path) -> LoadResult<DescriptorRegistry> {
        let content = read_file(path)?;
        let specs: Vec<DescriptorSpec> = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse descriptor RON: {}", e))?;
        Self::build(specs)
    }

    /// Builds a registry from already-parsed specs.
    pub fn build(specs: Vec<DescriptorSpec>) -> LoadResult<DescriptorRegistry> {
        let mut registry = DescriptorRegistry::new();
        for spec in specs {
            let descriptor = ValueDescriptor::new(
                DescriptorId(spec.id),
                &spec.display_name,
                &spec.abbreviation,
                spec.numeric_kind,
                spec.value_kind,
                spec.min,
                spec.max,
            )
            .map_err(|e| {
                anyhow::anyhow!("Invalid descriptor '{}': {}", spec.display_name, e)
            })?;
            registry.register(descriptor).map_err(|e| {
                anyhow::anyhow!("Failed to register descriptor '{}': {}", spec.display_name, e)
            })?;
        }
        tracing::debug!(descriptors = registry.len(), "descriptor registry built");
        Ok(registry)
    }
}
