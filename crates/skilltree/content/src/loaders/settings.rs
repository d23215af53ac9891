//! Engine settings loader.

use std::path::Path;

use skilltree_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine settings from TOML files.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load engine settings from a TOML file. Missing keys fall back to
    /// their defaults.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse settings TOML: {}", e))?;
        Ok(config)
    }
}
