use crate::action::{
    ActionTransition, ApplyStatModifierAction, CompleteSkillUseAction, DepleteAction,
    DepletePassAction, DowngradeAction, GrantPointsAction, SetPlayerLevelAction, UnlockPassAction,
    UpgradeAction, UseSkillAction,
};
use crate::error::{EngineError, ErrorSeverity};

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreValidate => "pre-validate",
            Self::Apply => "apply",
            Self::PostValidate => "post-validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: core::fmt::Display> core::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TransitionPhaseError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Errors surfaced while executing an action through the engine.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExecuteError {
    #[error("upgrade: {0}")]
    Upgrade(TransitionPhaseError<<UpgradeAction as ActionTransition>::Error>),
    #[error("downgrade: {0}")]
    Downgrade(TransitionPhaseError<<DowngradeAction as ActionTransition>::Error>),
    #[error("deplete: {0}")]
    Deplete(TransitionPhaseError<<DepleteAction as ActionTransition>::Error>),
    #[error("unlock pass: {0}")]
    UnlockPass(TransitionPhaseError<<UnlockPassAction as ActionTransition>::Error>),
    #[error("deplete pass: {0}")]
    DepletePass(TransitionPhaseError<<DepletePassAction as ActionTransition>::Error>),
    #[error("set player level: {0}")]
    SetPlayerLevel(TransitionPhaseError<<SetPlayerLevelAction as ActionTransition>::Error>),
    #[error("grant points: {0}")]
    GrantPoints(TransitionPhaseError<<GrantPointsAction as ActionTransition>::Error>),
    #[error("apply stat modifier: {0}")]
    ApplyStatModifier(TransitionPhaseError<<ApplyStatModifierAction as ActionTransition>::Error>),
    #[error("use skill: {0}")]
    UseSkill(TransitionPhaseError<<UseSkillAction as ActionTransition>::Error>),
    #[error("complete skill use: {0}")]
    CompleteSkillUse(TransitionPhaseError<<CompleteSkillUseAction as ActionTransition>::Error>),
}

impl ExecuteError {
    pub fn phase(&self) -> TransitionPhase {
        match self {
            Self::Upgrade(e) => e.phase,
            Self::Downgrade(e) | Self::Deplete(e) => e.phase,
            Self::UnlockPass(e) | Self::DepletePass(e) => e.phase,
            Self::SetPlayerLevel(e) | Self::GrantPoints(e) => e.phase,
            Self::ApplyStatModifier(e) => e.phase,
            Self::UseSkill(e) | Self::CompleteSkillUse(e) => e.phase,
        }
    }
}

impl EngineError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Upgrade(e) => e.error.severity(),
            Self::Downgrade(e) | Self::Deplete(e) => e.error.severity(),
            Self::UnlockPass(e) | Self::DepletePass(e) => e.error.severity(),
            Self::SetPlayerLevel(e) | Self::GrantPoints(e) => e.error.severity(),
            Self::ApplyStatModifier(e) => e.error.severity(),
            Self::UseSkill(e) | Self::CompleteSkillUse(e) => e.error.severity(),
        }
    }
}
