//! Engine settings, loaded once and passed in.
//!
//! There is no ambient settings singleton: the configuration is
//! constructed by the caller (normally from a TOML file via the content
//! crate) and handed to the engine at construction time.

use crate::value::CoercionPolicy;

/// Tunable engine policy.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recognized node type labels; empty means unvalidated.
    pub node_type_labels: Vec<String>,

    /// Whether players may downgrade obtained nodes at all. Forced
    /// downgrades (cascade depletes) ignore this.
    pub allow_downgrade: bool,

    /// When set, destructive actions (downgrade, deplete) are staged as
    /// pending until the caller confirms or discards them.
    pub changes_require_confirmation: bool,

    /// Strict mode for stat value arithmetic: mixing float and integer
    /// kinds fails instead of coercing.
    pub strict_stat_value_types: bool,

    /// Ceiling for the player level.
    pub max_unit_level: u32,
}

impl EngineConfig {
    pub const DEFAULT_MAX_UNIT_LEVEL: u32 = 100;

    pub fn new() -> Self {
        Self {
            node_type_labels: Vec::new(),
            allow_downgrade: true,
            changes_require_confirmation: false,
            strict_stat_value_types: false,
            max_unit_level: Self::DEFAULT_MAX_UNIT_LEVEL,
        }
    }

    /// The arithmetic policy implied by `strict_stat_value_types`.
    pub fn coercion_policy(&self) -> CoercionPolicy {
        if self.strict_stat_value_types {
            CoercionPolicy::Strict
        } else {
            CoercionPolicy::Lenient
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
