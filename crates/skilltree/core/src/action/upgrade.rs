//! Spending points on a node.

use crate::config::EngineConfig;
use crate::events::{EventLog, GraphChangeFlags, SkillTreeEvent};
use crate::state::{GraphId, NodeState, ProgressionState};

use super::cascade::set_node_state;
use super::{ActionTransition, push_stat_events};

/// Raises a node's level by spending points from the pool.
///
/// Known asymmetry, preserved from observed behavior: a request that
/// overshoots `max_level` still consumes the full pool-limited amount —
/// the overflow is discarded, not refunded — while downgrades refund
/// exactly the levels they remove.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeAction {
    pub graph: GraphId,
    pub node: u32,
    pub amount: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpgradeOutcome {
    pub new_level: u32,
    pub points_consumed: u32,
    pub state: NodeState,
    /// Neighbors that unlocked because this node became obtained.
    pub unlocked: Vec<u32>,
}

/// Reasons an upgrade is rejected. None of these mutate anything.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    #[error("upgrade amount must be positive")]
    NonPositiveAmount,

    #[error("{0} is not enabled")]
    GraphNotFound(GraphId),

    #[error("node {position} does not exist in {graph}")]
    NodeNotFound { graph: GraphId, position: u32 },

    #[error("node {0} has an incomplete definition")]
    NodeInvalid(u32),

    #[error("node {0} is locked")]
    NodeLocked(u32),

    #[error("node {0} is already maxed")]
    NodeMaxed(u32),

    #[error("point pool is empty")]
    EmptyPool,

    #[error("player level {actual} is below requirement {required}")]
    PlayerLevelTooLow { required: u32, actual: u32 },

    #[error("tree points spent {spent} is below requirement {required}")]
    TreePointsTooLow { required: u32, spent: u32 },

    #[error("node {0} violated its state invariant after upgrade")]
    InvariantBroken(u32),
}

impl crate::error::EngineError for UpgradeError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        match self {
            UpgradeError::InvariantBroken(_) => crate::error::ErrorSeverity::Internal,
            _ => crate::error::ErrorSeverity::Validation,
        }
    }
}

impl ActionTransition for UpgradeAction {
    type Error = UpgradeError;
    type Outcome = UpgradeOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        if self.amount == 0 {
            return Err(UpgradeError::NonPositiveAmount);
        }

        let graph = state
            .graph(self.graph)
            .ok_or(UpgradeError::GraphNotFound(self.graph))?;
        let node = graph.node(self.node).ok_or(UpgradeError::NodeNotFound {
            graph: self.graph,
            position: self.node,
        })?;

        // Invalid nodes hold no levels; letting one consume pool points
        // would lose them with nothing gained.
        if !node.is_valid() {
            return Err(UpgradeError::NodeInvalid(self.node));
        }

        match node.state() {
            NodeState::Locked => return Err(UpgradeError::NodeLocked(self.node)),
            NodeState::Maxed => return Err(UpgradeError::NodeMaxed(self.node)),
            NodeState::Unlocked | NodeState::Obtained => {}
        }

        if state.player.point_pool == 0 {
            return Err(UpgradeError::EmptyPool);
        }
        if state.player.level < node.player_level_requirement {
            return Err(UpgradeError::PlayerLevelTooLow {
                required: node.player_level_requirement,
                actual: state.player.level,
            });
        }
        let spent = graph.points_spent();
        if node.tree_points_requirement > spent {
            return Err(UpgradeError::TreePointsTooLow {
                required: node.tree_points_requirement,
                spent,
            });
        }

        Ok(())
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let pool = state.player.point_pool;
        let graph = state
            .graph_mut(self.graph)
            .ok_or(UpgradeError::GraphNotFound(self.graph))?;
        let node = graph.node_mut(self.node).ok_or(UpgradeError::NodeNotFound {
            graph: self.graph,
            position: self.node,
        })?;

        // Consumption is pool-limited; gain is additionally capped by
        // max_level, and the difference is discarded.
        let consumed = self.amount.min(pool);
        let headroom = node.max_level() - node.current_level();
        let gained = consumed.min(headroom);
        let new_level = node.current_level() + gained;

        let changes = node.set_level(new_level);
        let new_state = node.state_for_level(new_level);
        push_stat_events(events, self.graph, self.node, &changes);
        set_node_state(graph, self.node, new_state, events);

        state.player.point_pool -= consumed;
        events.push(SkillTreeEvent::NodeUpgraded {
            graph: self.graph,
            position: self.node,
            new_level,
            points_consumed: consumed,
        });
        events.push(SkillTreeEvent::PointPoolChanged {
            pool: state.player.point_pool,
        });

        // Becoming obtained can satisfy neighbors' connection requirements.
        let mut unlocked = Vec::new();
        if new_state.is_obtained() {
            let graph = state
                .graph_mut(self.graph)
                .ok_or(UpgradeError::GraphNotFound(self.graph))?;
            let mut candidates = graph.neighbors(self.node);
            candidates.sort_unstable();
            candidates.dedup();
            // Two-phase: pick the unlockable neighbors first, then apply.
            let ready: Vec<u32> = candidates
                .into_iter()
                .filter(|&p| {
                    graph.node(p).is_some_and(|n| n.state() == NodeState::Locked)
                        && graph.can_unlock(p)
                })
                .collect();
            for position in ready {
                set_node_state(graph, position, NodeState::Unlocked, events);
                unlocked.push(position);
            }
        }

        events.push(SkillTreeEvent::GraphChanged {
            graph: self.graph,
            flags: GraphChangeFlags::LEVELS | GraphChangeFlags::STATES | GraphChangeFlags::POINTS,
        });

        tracing::debug!(
            graph = %self.graph,
            node = self.node,
            new_level,
            consumed,
            "node upgraded"
        );

        Ok(UpgradeOutcome {
            new_level,
            points_consumed: consumed,
            state: new_state,
            unlocked,
        })
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        let node = state
            .graph(self.graph)
            .and_then(|g| g.node(self.node))
            .ok_or(UpgradeError::NodeNotFound {
                graph: self.graph,
                position: self.node,
            })?;
        if !node.invariants_hold() {
            return Err(UpgradeError::InvariantBroken(self.node));
        }
        Ok(())
    }
}
