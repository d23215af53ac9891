//! Content loaders for reading progression data from files.
//!
//! Loaders convert RON/TOML files into engine types, resolving descriptor
//! references and validating structure along the way. All formats are
//! defined in [`crate::specs`].

pub mod descriptors;
pub mod factory;
pub mod graphs;
pub mod settings;

pub use descriptors::DescriptorLoader;
pub use factory::ContentFactory;
pub use graphs::GraphLoader;
pub use settings::SettingsLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
