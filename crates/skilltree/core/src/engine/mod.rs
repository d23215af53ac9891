//! The engine facade.
//!
//! [`Engine`] owns the canonical [`ProgressionState`] and is the only way
//! to mutate it: every change goes through [`Engine::execute`], which
//! routes the action through its three-phase transition pipeline, bumps
//! the mutation nonce, schedules any timers the outcome asks for, and
//! publishes the recorded events. Time is external; the driver calls
//! [`Engine::tick`] to advance windups and cooldowns.

mod errors;

pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

use std::sync::Arc;

use crate::action::{Action, ActionOutcome, ActionTransition};
use crate::config::EngineConfig;
use crate::events::{EventDispatcher, EventLog, EventSink};
use crate::scheduler::{Scheduler, Tick, TimerKind};
use crate::state::{
    Graph, GraphError, GraphId, ProgressionSnapshot, ProgressionState, SnapshotReport, UseId,
};
use crate::value::DescriptorRegistry;

type TransitionResult<O, E> = Result<O, TransitionPhaseError<E>>;

macro_rules! dispatch_transition {
    ($action:expr, $state:expr, $config:expr, $events:expr, { $($variant:ident),+ $(,)? }) => {{
        match $action {
            $(
                Action::$variant(transition) => {
                    drive_transition(transition, $state, $config, $events)
                        .map(ActionOutcome::$variant)
                        .map_err(ExecuteError::$variant)
                }
            )+
        }
    }};
}

/// Rules engine for progression graphs: point economy, node lifecycle,
/// skill activations.
pub struct Engine {
    state: ProgressionState,
    config: EngineConfig,
    registry: Arc<DescriptorRegistry>,
    scheduler: Scheduler,
    dispatcher: EventDispatcher,
    /// Destructive action staged by the confirmation gate, if any.
    pending: Option<Action>,
}

impl Engine {
    pub fn new(config: EngineConfig, registry: Arc<DescriptorRegistry>) -> Self {
        Self {
            state: ProgressionState::new(),
            config,
            registry,
            scheduler: Scheduler::new(),
            dispatcher: EventDispatcher::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<DescriptorRegistry> {
        &self.registry
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.dispatcher.subscribe(sink);
    }

    /// Enables a graph and immediately runs the unlock pass over it, so
    /// nodes without inbound requirements start out unlocked.
    pub fn add_graph(&mut self, graph: Graph) -> Result<(), GraphError> {
        let id = graph.id();
        self.state.add_graph(graph)?;

        let mut events = EventLog::new();
        if let Some(graph) = self.state.graph_mut(id) {
            crate::action::apply_unlock_pass(graph, &mut events);
        }
        for event in events.drain() {
            self.dispatcher.publish(&event);
        }
        tracing::info!(graph = %id, "graph enabled");
        Ok(())
    }

    /// Disables a graph; activations on its nodes are dropped along with
    /// their timers.
    pub fn remove_graph(&mut self, id: GraphId) -> Option<Graph> {
        let removed = self.state.remove_graph(id)?;
        let stale: Vec<UseId> = self
            .state
            .uses()
            .iter()
            .filter(|u| u.node.graph == id)
            .map(|u| u.id)
            .collect();
        for use_id in stale {
            self.scheduler.cancel_for_use(use_id);
            self.state.retire_use(use_id);
        }
        tracing::info!(graph = %id, "graph disabled");
        Some(removed)
    }

    /// Executes an action, or stages it when the confirmation gate is on
    /// and the action is destructive. A newly staged action replaces any
    /// previously staged one.
    pub fn execute(&mut self, action: Action) -> Result<ActionOutcome, ExecuteError> {
        if self.config.changes_require_confirmation && action.is_destructive() {
            tracing::debug!(?action, "destructive action staged for confirmation");
            self.pending = Some(action);
            return Ok(ActionOutcome::PendingConfirmation);
        }
        self.run(action)
    }

    /// The staged destructive action, if any.
    pub fn pending(&self) -> Option<&Action> {
        self.pending.as_ref()
    }

    /// Runs the staged action. `None` when nothing is staged.
    pub fn confirm_pending(&mut self) -> Option<Result<ActionOutcome, ExecuteError>> {
        let action = self.pending.take()?;
        Some(self.run(action))
    }

    /// Drops the staged action without running it.
    pub fn discard_pending(&mut self) -> Option<Action> {
        self.pending.take()
    }

    fn run(&mut self, action: Action) -> Result<ActionOutcome, ExecuteError> {
        let mut events = EventLog::new();
        let outcome = dispatch_transition!(&action, &mut self.state, &self.config, &mut events, {
            Upgrade,
            Downgrade,
            Deplete,
            UnlockPass,
            DepletePass,
            SetPlayerLevel,
            GrantPoints,
            ApplyStatModifier,
            UseSkill,
            CompleteSkillUse,
        })?;

        self.state.nonce += 1;

        if let ActionOutcome::UseSkill(started) = &outcome {
            if !started.windup.is_zero() {
                self.scheduler.schedule(
                    TimerKind::Windup {
                        use_id: started.use_id,
                    },
                    started.windup,
                );
            }
            if !started.cooldown.is_zero() {
                self.scheduler.schedule(
                    TimerKind::Cooldown {
                        use_id: started.use_id,
                    },
                    started.cooldown,
                );
            }
        }

        for event in events.drain() {
            self.dispatcher.publish(&event);
        }
        Ok(outcome)
    }

    /// Advances engine time. Windup completions release the user; cooldown
    /// completions release the node, retiring the activation record if it
    /// was already completed.
    pub fn tick(&mut self, elapsed: Tick) -> Vec<TimerKind> {
        let completed = self.scheduler.tick(elapsed);
        for kind in &completed {
            match *kind {
                TimerKind::Windup { use_id } => {
                    if let Some(used) = self.state.use_mut(use_id) {
                        used.winding_up = false;
                    }
                }
                TimerKind::Cooldown { use_id } => {
                    let retire = if let Some(used) = self.state.use_mut(use_id) {
                        used.on_cooldown = false;
                        used.completed
                    } else {
                        false
                    };
                    if retire {
                        self.state.retire_use(use_id);
                    }
                }
            }
        }
        completed
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn export_snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot::capture(&self.state)
    }

    /// Restores a snapshot over the enabled graphs. In-flight activations
    /// and timers do not survive a restore.
    pub fn apply_snapshot(&mut self, snapshot: &ProgressionSnapshot) -> SnapshotReport {
        self.scheduler.clear();
        self.state.clear_uses();
        self.pending = None;

        let report = snapshot.apply_to(&mut self.state);
        self.state.nonce += 1;
        if !report.skipped.is_empty() || !report.skipped_graphs.is_empty() {
            tracing::warn!(
                skipped = report.skipped.len(),
                skipped_graphs = report.skipped_graphs.len(),
                "snapshot contained stale entries"
            );
        }
        report
    }

    /// Explicit full reset: graphs, economy, activations, timers.
    pub fn clear(&mut self) {
        self.state.clear();
        self.scheduler.clear();
        self.pending = None;
    }
}

#[inline]
fn drive_transition<T>(
    transition: &T,
    state: &mut ProgressionState,
    config: &EngineConfig,
    events: &mut EventLog,
) -> TransitionResult<T::Outcome, T::Error>
where
    T: ActionTransition,
{
    transition
        .pre_validate(&*state, config)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let outcome = transition
        .apply(state, config, events)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(&*state, config)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(outcome)
}
