//! Player-side economy actions.

use crate::config::EngineConfig;
use crate::events::{EventLog, SkillTreeEvent};
use crate::state::{GraphId, ProgressionState};

use super::cascade::{apply_gate_pass, apply_unlock_pass};
use super::ActionTransition;

/// Moves the player to a new level, clamped to the configured ceiling.
///
/// Level changes re-run the unlock and gate passes over every enabled
/// graph: a drop can invalidate player-level gates, and either direction
/// can change what the passes would decide next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetPlayerLevelAction {
    pub level: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerLevelOutcome {
    /// The level actually applied, after clamping.
    pub level: u32,
    pub unlocked: Vec<(GraphId, u32)>,
    pub depleted: Vec<(GraphId, u32)>,
    pub points_refunded: u32,
}

/// Adds points to the unspent pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrantPointsAction {
    pub amount: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrantPointsOutcome {
    pub pool: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlayerActionError {
    #[error("grant amount must be positive")]
    NonPositiveAmount,
}

impl crate::error::EngineError for PlayerActionError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }
}

impl ActionTransition for SetPlayerLevelAction {
    type Error = PlayerActionError;
    type Outcome = PlayerLevelOutcome;

    fn pre_validate(
        &self,
        _state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let level = self.level.min(config.max_unit_level);
        if state.player.level != level {
            state.player.level = level;
            events.push(SkillTreeEvent::PlayerLevelChanged { level });
        }

        let mut player = state.player;
        let mut unlocked = Vec::new();
        let mut depleted = Vec::new();
        let mut points_refunded = 0;

        let ids: Vec<GraphId> = state.graphs().iter().map(|g| g.id()).collect();
        for id in ids {
            let Some(graph) = state.graph_mut(id) else {
                continue;
            };
            unlocked.extend(apply_unlock_pass(graph, events).into_iter().map(|p| (id, p)));
            let (gated, refund) = apply_gate_pass(graph, &mut player, events);
            depleted.extend(gated.into_iter().map(|p| (id, p)));
            points_refunded += refund;
        }
        state.player = player;

        tracing::debug!(level, refunded = points_refunded, "player level changed");

        Ok(PlayerLevelOutcome {
            level,
            unlocked,
            depleted,
            points_refunded,
        })
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        debug_assert!(state.player.level <= config.max_unit_level);
        Ok(())
    }
}

impl ActionTransition for GrantPointsAction {
    type Error = PlayerActionError;
    type Outcome = GrantPointsOutcome;

    fn pre_validate(
        &self,
        _state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        if self.amount == 0 {
            return Err(PlayerActionError::NonPositiveAmount);
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        state.player.point_pool = state.player.point_pool.saturating_add(self.amount);
        events.push(SkillTreeEvent::PointPoolChanged {
            pool: state.player.point_pool,
        });
        Ok(GrantPointsOutcome {
            pool: state.player.point_pool,
        })
    }

    fn post_validate(
        &self,
        _state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}
