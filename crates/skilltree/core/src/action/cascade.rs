//! Graph-wide cascading passes and the shared deplete machinery.
//!
//! All passes are two-phase: a read-only collect step on the graph picks
//! the nodes to transition, then a mutation step applies them. Both passes
//! are idempotent and total; re-running them when nothing changed is a
//! no-op.

use crate::config::EngineConfig;
use crate::events::{EventLog, GraphChangeFlags, SkillTreeEvent};
use crate::state::{Graph, GraphId, NodeState, PlayerState, ProgressionState};

use super::{ActionTransition, push_stat_events};

/// Errors shared by the cascading pass actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CascadeError {
    #[error("{0} is not enabled")]
    GraphNotFound(GraphId),
}

impl crate::error::EngineError for CascadeError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }
}

/// Moves a node to a new state, recording the transition event.
pub(crate) fn set_node_state(
    graph: &mut Graph,
    position: u32,
    to: NodeState,
    events: &mut EventLog,
) {
    let graph_id = graph.id();
    if let Some(node) = graph.node_mut(position) {
        let from = node.state();
        if from != to {
            node.set_state(to);
            events.push(SkillTreeEvent::NodeStateChanged {
                graph: graph_id,
                position,
                from,
                to,
            });
        }
    }
}

/// Forcibly returns an obtained node to level zero and locks it,
/// refunding its invested points to the pool.
pub(crate) fn force_deplete(
    graph: &mut Graph,
    position: u32,
    player: &mut PlayerState,
    events: &mut EventLog,
) -> u32 {
    let graph_id = graph.id();
    let Some(node) = graph.node_mut(position) else {
        return 0;
    };
    if !node.state().is_obtained() {
        return 0;
    }

    let refund = node.current_level();
    let changes = node.set_level(0);
    push_stat_events(events, graph_id, position, &changes);
    set_node_state(graph, position, NodeState::Locked, events);

    player.point_pool += refund;
    events.push(SkillTreeEvent::NodeDepleted {
        graph: graph_id,
        position,
        points_refunded: refund,
    });
    events.push(SkillTreeEvent::PointPoolChanged {
        pool: player.point_pool,
    });

    tracing::debug!(%graph_id, position, refund, "node depleted");
    refund
}

/// Depletes every dependent of `start` whose unlock is no longer
/// justified, recursively. The cascaded nodes' invested points return to
/// the pool.
pub(crate) fn cascade_dependents(
    graph: &mut Graph,
    start: u32,
    player: &mut PlayerState,
    events: &mut EventLog,
) -> (Vec<u32>, u32) {
    let mut depleted = Vec::new();
    let mut refunded = 0;
    let mut frontier = vec![start];

    while let Some(position) = frontier.pop() {
        // Read phase: who loses their justification now.
        let victims = graph.collect_unjustified_dependents(position);
        // Apply phase: deplete them, then re-examine their dependents.
        // Victims are obtained, so their refund is at least one point.
        for victim in victims {
            let refund = force_deplete(graph, victim, player, events);
            if refund > 0 {
                depleted.push(victim);
                refunded += refund;
                frontier.push(victim);
            }
        }
    }

    (depleted, refunded)
}

/// Unlock pass over one graph: attempts `Locked → Unlocked` for every
/// locked node, in ascending position order.
pub(crate) fn apply_unlock_pass(graph: &mut Graph, events: &mut EventLog) -> Vec<u32> {
    let unlockable = graph.collect_unlockable();
    for &position in &unlockable {
        set_node_state(graph, position, NodeState::Unlocked, events);
    }
    if !unlockable.is_empty() {
        events.push(SkillTreeEvent::GraphChanged {
            graph: graph.id(),
            flags: GraphChangeFlags::STATES,
        });
    }
    unlockable
}

/// Gate re-evaluation pass over one graph: depletes every obtained node
/// whose player-level or tree-points gate no longer holds, iterating to a
/// fixpoint since each deplete lowers the spent total.
pub(crate) fn apply_gate_pass(
    graph: &mut Graph,
    player: &mut PlayerState,
    events: &mut EventLog,
) -> (Vec<u32>, u32) {
    let mut depleted = Vec::new();
    let mut refunded = 0;

    loop {
        let victims = graph.collect_gate_failures(player.level);
        if victims.is_empty() {
            break;
        }
        for victim in victims {
            let refund = force_deplete(graph, victim, player, events);
            if refund == 0 {
                continue;
            }
            depleted.push(victim);
            refunded += refund;
            let (mut chained, chained_refund) =
                cascade_dependents(graph, victim, player, events);
            depleted.append(&mut chained);
            refunded += chained_refund;
        }
    }

    if !depleted.is_empty() {
        events.push(SkillTreeEvent::GraphChanged {
            graph: graph.id(),
            flags: GraphChangeFlags::LEVELS | GraphChangeFlags::STATES | GraphChangeFlags::POINTS,
        });
    }

    (depleted, refunded)
}

/// Graph-wide unlock pass: attempts `Locked → Unlocked` everywhere the
/// connection rule justifies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnlockPassAction {
    pub graph: GraphId,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnlockPassOutcome {
    /// Positions that moved `Locked → Unlocked`, in ascending order.
    pub unlocked: Vec<u32>,
}

impl ActionTransition for UnlockPassAction {
    type Error = CascadeError;
    type Outcome = UnlockPassOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        state
            .graph(self.graph)
            .map(|_| ())
            .ok_or(CascadeError::GraphNotFound(self.graph))
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let graph = state
            .graph_mut(self.graph)
            .ok_or(CascadeError::GraphNotFound(self.graph))?;
        let unlocked = apply_unlock_pass(graph, events);
        Ok(UnlockPassOutcome { unlocked })
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        // The pass never touches levels, so invariants reduce to existence.
        state
            .graph(self.graph)
            .map(|_| ())
            .ok_or(CascadeError::GraphNotFound(self.graph))
    }
}

/// Graph-wide gate re-evaluation. Must run after any player-level change
/// or downgrade; both can invalidate previously satisfied gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepletePassAction {
    pub graph: GraphId,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepletePassOutcome {
    pub depleted: Vec<u32>,
    pub points_refunded: u32,
}

impl ActionTransition for DepletePassAction {
    type Error = CascadeError;
    type Outcome = DepletePassOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        state
            .graph(self.graph)
            .map(|_| ())
            .ok_or(CascadeError::GraphNotFound(self.graph))
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let mut player = state.player;
        let graph = state
            .graph_mut(self.graph)
            .ok_or(CascadeError::GraphNotFound(self.graph))?;
        let (depleted, points_refunded) = apply_gate_pass(graph, &mut player, events);
        state.player = player;
        Ok(DepletePassOutcome {
            depleted,
            points_refunded,
        })
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        let graph = state
            .graph(self.graph)
            .ok_or(CascadeError::GraphNotFound(self.graph))?;
        debug_assert!(
            graph.collect_gate_failures(state.player.level).is_empty(),
            "gate pass must reach a fixpoint"
        );
        Ok(())
    }
}
