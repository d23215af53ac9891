//! Refunding points out of a node.
//!
//! Downgrades are the destructive half of the point economy: levels come
//! back out of a node, the points return to the pool, and any dependent
//! node whose unlock or gate is no longer justified gets depleted along
//! the way. Deplete is a downgrade by the node's whole level.

use crate::config::EngineConfig;
use crate::events::{EventLog, GraphChangeFlags, SkillTreeEvent};
use crate::state::{GraphId, NodeState, ProgressionState};

use super::cascade::{apply_gate_pass, cascade_dependents, set_node_state};
use super::{ActionTransition, push_stat_events};

/// Lowers a node's level, refunding the removed levels to the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DowngradeAction {
    pub graph: GraphId,
    pub node: u32,
    pub amount: u32,
    /// Forced downgrades ignore the `allow_downgrade` setting. System
    /// revocations use this; player requests leave it off.
    pub forced: bool,
}

/// Returns a node to level zero in one step. Always forced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepleteAction {
    pub graph: GraphId,
    pub node: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DowngradeOutcome {
    pub new_level: u32,
    /// Points refunded for the levels removed from the target itself.
    pub points_refunded: u32,
    pub state: NodeState,
    /// Nodes force-depleted by the connection cascade and the gate pass.
    pub depleted: Vec<u32>,
    /// Points refunded by those forced depletes.
    pub cascade_refunded: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DowngradeError {
    #[error("downgrade amount must be positive")]
    NonPositiveAmount,

    #[error("{0} is not enabled")]
    GraphNotFound(GraphId),

    #[error("node {position} does not exist in {graph}")]
    NodeNotFound { graph: GraphId, position: u32 },

    #[error("node {0} holds no invested points")]
    NodeNotObtained(u32),

    #[error("downgrades are disabled")]
    DowngradeDisabled,

    #[error("node {0} violated its state invariant after downgrade")]
    InvariantBroken(u32),
}

impl crate::error::EngineError for DowngradeError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        match self {
            DowngradeError::InvariantBroken(_) => crate::error::ErrorSeverity::Internal,
            _ => crate::error::ErrorSeverity::Validation,
        }
    }
}

fn pre_validate_downgrade(
    graph_id: GraphId,
    position: u32,
    forced: bool,
    state: &ProgressionState,
    config: &EngineConfig,
) -> Result<(), DowngradeError> {
    if !forced && !config.allow_downgrade {
        return Err(DowngradeError::DowngradeDisabled);
    }
    let graph = state
        .graph(graph_id)
        .ok_or(DowngradeError::GraphNotFound(graph_id))?;
    let node = graph.node(position).ok_or(DowngradeError::NodeNotFound {
        graph: graph_id,
        position,
    })?;
    if !node.state().is_obtained() {
        return Err(DowngradeError::NodeNotObtained(position));
    }
    Ok(())
}

/// Shared mutation for downgrade and deplete. `amount` is clamped to the
/// node's current level; reaching zero triggers the connection cascade
/// and a graph-wide gate re-evaluation.
fn apply_downgrade(
    graph_id: GraphId,
    position: u32,
    amount: u32,
    state: &mut ProgressionState,
    events: &mut EventLog,
) -> Result<DowngradeOutcome, DowngradeError> {
    let mut player = state.player;
    let graph = state
        .graph_mut(graph_id)
        .ok_or(DowngradeError::GraphNotFound(graph_id))?;
    let node = graph.node_mut(position).ok_or(DowngradeError::NodeNotFound {
        graph: graph_id,
        position,
    })?;

    let removed = amount.min(node.current_level());
    let new_level = node.current_level() - removed;

    let changes = node.set_level(new_level);
    let new_state = node.state_for_level(new_level);
    push_stat_events(events, graph_id, position, &changes);
    set_node_state(graph, position, new_state, events);

    player.point_pool += removed;
    events.push(SkillTreeEvent::NodeDowngraded {
        graph: graph_id,
        position,
        new_level,
        points_refunded: removed,
    });
    events.push(SkillTreeEvent::PointPoolChanged {
        pool: player.point_pool,
    });

    // Dropping to zero can orphan dependents that this node was the only
    // obtained partner for.
    let mut depleted = Vec::new();
    let mut cascade_refunded = 0;
    if new_level == 0 {
        let (orphans, refund) = cascade_dependents(graph, position, &mut player, events);
        depleted.extend(orphans);
        cascade_refunded += refund;
    }

    // The spent total dropped, so tree-points gates elsewhere can fail.
    let (gated, refund) = apply_gate_pass(graph, &mut player, events);
    depleted.extend(gated);
    cascade_refunded += refund;

    events.push(SkillTreeEvent::GraphChanged {
        graph: graph_id,
        flags: GraphChangeFlags::LEVELS | GraphChangeFlags::STATES | GraphChangeFlags::POINTS,
    });
    state.player = player;

    tracing::debug!(
        graph = %graph_id,
        node = position,
        new_level,
        removed,
        cascaded = depleted.len(),
        "node downgraded"
    );

    Ok(DowngradeOutcome {
        new_level,
        points_refunded: removed,
        state: new_state,
        depleted,
        cascade_refunded,
    })
}

fn post_validate_downgrade(
    graph_id: GraphId,
    position: u32,
    state: &ProgressionState,
) -> Result<(), DowngradeError> {
    let node = state
        .graph(graph_id)
        .and_then(|g| g.node(position))
        .ok_or(DowngradeError::NodeNotFound {
            graph: graph_id,
            position,
        })?;
    if !node.invariants_hold() {
        return Err(DowngradeError::InvariantBroken(position));
    }
    Ok(())
}

impl ActionTransition for DowngradeAction {
    type Error = DowngradeError;
    type Outcome = DowngradeOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        if self.amount == 0 {
            return Err(DowngradeError::NonPositiveAmount);
        }
        pre_validate_downgrade(self.graph, self.node, self.forced, state, config)
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        apply_downgrade(self.graph, self.node, self.amount, state, events)
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        post_validate_downgrade(self.graph, self.node, state)
    }
}

impl ActionTransition for DepleteAction {
    type Error = DowngradeError;
    type Outcome = DowngradeOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        pre_validate_downgrade(self.graph, self.node, true, state, config)
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let level = state
            .graph(self.graph)
            .and_then(|g| g.node(self.node))
            .map(|n| n.current_level())
            .ok_or(DowngradeError::NodeNotFound {
                graph: self.graph,
                position: self.node,
            })?;
        apply_downgrade(self.graph, self.node, level, state, events)
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        post_validate_downgrade(self.graph, self.node, state)
    }
}
