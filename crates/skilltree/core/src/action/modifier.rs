//! Buffing and debuffing node stats.
//!
//! External effects land on a stat's modifier channel: a typed value plus
//! a combine rule, applied on top of whatever the level curve provides.
//! The arithmetic policy comes from the engine settings, so strict
//! configurations reject float/integer mixing before anything mutates.

use crate::config::EngineConfig;
use crate::events::EventLog;
use crate::stat::{CombineKind, CombineOperator, StatChange};
use crate::state::{NodeRef, ProgressionState};
use crate::value::{CoercionPolicy, DescriptorId, NumericValue, ValueError};

use super::{ActionTransition, push_stat_events};

/// Applies a modifier onto one stat of an obtained node.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplyStatModifierAction {
    pub node: NodeRef,
    /// Which of the node's stats receives the modifier.
    pub descriptor: DescriptorId,
    pub value: NumericValue,
    pub combine_kind: CombineKind,
    pub combine_op: CombineOperator,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApplyStatModifierOutcome {
    pub change: StatChange,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ModifierError {
    #[error("{} is not enabled", .0.graph)]
    GraphNotFound(NodeRef),

    #[error("{} has no node {}", .0.graph, .0.position)]
    NodeNotFound(NodeRef),

    #[error("node {0} holds no invested points")]
    NodeNotObtained(u32),

    #[error("node {position} has no stat bound to {descriptor}")]
    StatNotFound {
        position: u32,
        descriptor: DescriptorId,
    },

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("node {0} violated its state invariant after a modifier")]
    InvariantBroken(u32),
}

impl crate::error::EngineError for ModifierError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        match self {
            ModifierError::InvariantBroken(_) => crate::error::ErrorSeverity::Internal,
            _ => crate::error::ErrorSeverity::Validation,
        }
    }
}

impl ActionTransition for ApplyStatModifierAction {
    type Error = ModifierError;
    type Outcome = ApplyStatModifierOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        let graph = state
            .graph(self.node.graph)
            .ok_or(ModifierError::GraphNotFound(self.node))?;
        let node = graph
            .node(self.node.position)
            .ok_or(ModifierError::NodeNotFound(self.node))?;
        if !node.state().is_obtained() {
            return Err(ModifierError::NodeNotObtained(self.node.position));
        }
        let stat = node
            .stat(self.descriptor)
            .ok_or(ModifierError::StatNotFound {
                position: self.node.position,
                descriptor: self.descriptor,
            })?;

        let left = stat.descriptor().numeric_kind();
        let right = self.value.descriptor().numeric_kind();
        if config.coercion_policy() == CoercionPolicy::Strict && left != right {
            return Err(ValueError::TypeMismatch { left, right }.into());
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let graph = state
            .graph_mut(self.node.graph)
            .ok_or(ModifierError::GraphNotFound(self.node))?;
        let node = graph
            .node_mut(self.node.position)
            .ok_or(ModifierError::NodeNotFound(self.node))?;
        let stat = node
            .stat_mut(self.descriptor)
            .ok_or(ModifierError::StatNotFound {
                position: self.node.position,
                descriptor: self.descriptor,
            })?;

        let change = stat.apply_modifier_value(
            &self.value,
            self.combine_kind,
            self.combine_op,
            config.coercion_policy(),
        )?;
        push_stat_events(events, self.node.graph, self.node.position, &[change]);

        tracing::debug!(
            graph = %self.node.graph,
            node = self.node.position,
            descriptor = %self.descriptor,
            ?change,
            "stat modifier applied"
        );

        Ok(ApplyStatModifierOutcome { change })
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        let node = state
            .graph(self.node.graph)
            .and_then(|g| g.node(self.node.position))
            .ok_or(ModifierError::NodeNotFound(self.node))?;
        if !node.invariants_hold() {
            return Err(ModifierError::InvariantBroken(self.node.position));
        }
        Ok(())
    }
}
