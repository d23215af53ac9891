//! Mutation pipeline.
//!
//! Every state change in the engine is an action executed through the
//! three-phase transition pipeline: `pre_validate` → `apply` →
//! `post_validate`. Player-facing changes (upgrade, downgrade, skill use)
//! and system passes (unlock, gate re-evaluation) use the same path, so
//! every mutation is auditable and every failure leaves the state
//! untouched.

mod cascade;
mod downgrade;
mod modifier;
mod player;
mod skill;
mod upgrade;

pub use cascade::{
    CascadeError, DepletePassAction, DepletePassOutcome, UnlockPassAction, UnlockPassOutcome,
};
pub(crate) use cascade::apply_unlock_pass;
pub use downgrade::{DepleteAction, DowngradeAction, DowngradeError, DowngradeOutcome};
pub use modifier::{ApplyStatModifierAction, ApplyStatModifierOutcome, ModifierError};
pub use player::{
    GrantPointsAction, GrantPointsOutcome, PlayerActionError, PlayerLevelOutcome,
    SetPlayerLevelAction,
};
pub use skill::{
    CompleteSkillUseAction, CompleteSkillUseOutcome, SkillUseError, UseSkillAction,
    UseSkillOutcome,
};
pub use upgrade::{UpgradeAction, UpgradeError, UpgradeOutcome};

use crate::config::EngineConfig;
use crate::events::{EventLog, SkillTreeEvent};
use crate::stat::StatChange;
use crate::state::{GraphId, ProgressionState};

/// A state transition with three-phase validation.
///
/// Phases:
/// 1. `pre_validate` - check preconditions before mutation;
/// 2. `apply` - mutate the state, record events, return the outcome;
/// 3. `post_validate` - verify postconditions after mutation.
pub trait ActionTransition {
    type Error;
    type Outcome;

    fn pre_validate(&self, state: &ProgressionState, config: &EngineConfig)
    -> Result<(), Self::Error>;

    fn apply(
        &self,
        state: &mut ProgressionState,
        config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error>;

    fn post_validate(
        &self,
        state: &ProgressionState,
        config: &EngineConfig,
    ) -> Result<(), Self::Error>;
}

/// Every mutation the engine accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Upgrade(UpgradeAction),
    Downgrade(DowngradeAction),
    Deplete(DepleteAction),
    UnlockPass(UnlockPassAction),
    DepletePass(DepletePassAction),
    SetPlayerLevel(SetPlayerLevelAction),
    GrantPoints(GrantPointsAction),
    ApplyStatModifier(ApplyStatModifierAction),
    UseSkill(UseSkillAction),
    CompleteSkillUse(CompleteSkillUseAction),
}

impl Action {
    /// Destructive actions are the ones the confirmation gate stages:
    /// they take progression away from the player.
    pub fn is_destructive(&self) -> bool {
        matches!(self, Action::Downgrade(_) | Action::Deplete(_))
    }
}

/// Action-specific results, mirroring the [`Action`] variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    Upgrade(UpgradeOutcome),
    Downgrade(DowngradeOutcome),
    Deplete(DowngradeOutcome),
    UnlockPass(UnlockPassOutcome),
    DepletePass(DepletePassOutcome),
    SetPlayerLevel(PlayerLevelOutcome),
    GrantPoints(GrantPointsOutcome),
    ApplyStatModifier(ApplyStatModifierOutcome),
    UseSkill(UseSkillOutcome),
    CompleteSkillUse(CompleteSkillUseOutcome),
    /// The action was staged by the confirmation gate instead of running.
    PendingConfirmation,
}

/// Translates stat changes from a node-level mutation into events.
pub(crate) fn push_stat_events(
    events: &mut EventLog,
    graph: GraphId,
    position: u32,
    changes: &[StatChange],
) {
    for change in changes {
        if let Some(level) = change.level {
            events.push(SkillTreeEvent::StatLevelChanged {
                graph,
                position,
                descriptor: change.descriptor,
                level,
            });
        }
        events.push(SkillTreeEvent::StatChanged {
            graph,
            position,
            descriptor: change.descriptor,
            value: change.value,
        });
        if let Some(bound) = change.bound {
            events.push(SkillTreeEvent::StatReachedBound {
                graph,
                position,
                descriptor: change.descriptor,
                bound,
            });
        }
    }
}
