//! Deterministic rules engine for progression graphs (skill trees).
//!
//! The crate models a point economy over graphs of upgradeable nodes:
//! nodes unlock along connections, levels are bought from a shared point
//! pool, stats scale with levels, and obtained nodes can be activated as
//! skills with windup and cooldown phases. All mutation flows through the
//! [`engine::Engine`] and its three-phase action pipeline; everything
//! else in the crate is plain data with read-only queries.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod stat;
pub mod state;
pub mod value;

pub use action::{
    Action, ActionOutcome, ActionTransition, ApplyStatModifierAction, ApplyStatModifierOutcome,
    CascadeError, CompleteSkillUseAction, CompleteSkillUseOutcome, DepleteAction,
    DepletePassAction, DepletePassOutcome, DowngradeAction, DowngradeError, DowngradeOutcome,
    GrantPointsAction, GrantPointsOutcome, ModifierError, PlayerActionError, PlayerLevelOutcome,
    SetPlayerLevelAction, SkillUseError, UnlockPassAction, UnlockPassOutcome, UpgradeAction,
    UpgradeError, UpgradeOutcome, UseSkillAction, UseSkillOutcome,
};
pub use config::EngineConfig;
pub use engine::{Engine, ExecuteError, TransitionPhase, TransitionPhaseError};
pub use error::{EngineError, ErrorSeverity};
pub use events::{EventDispatcher, EventLog, EventSink, GraphChangeFlags, SkillTreeEvent};
pub use scheduler::{Scheduler, Tick, TimerId, TimerKind};
pub use stat::{CombineKind, CombineOperator, Stat, StatChange};
pub use state::{
    Connection, Graph, GraphError, GraphId, GraphSnapshot, GridDimensions, Node, NodeRef,
    NodeSnapshot, NodeState, PlayerState, ProgressionSnapshot, ProgressionState, SnapshotReport,
    UseId, UsedSkill, UserId,
};
pub use value::{
    BoundKind, Clamped, CoercionPolicy, DescriptorId, DescriptorRegistry, NumericKind,
    NumericValue, Scalar, ValueDescriptor, ValueError, ValueKind,
};
