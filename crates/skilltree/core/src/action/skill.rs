//! Skill activation lifecycle.
//!
//! Using an obtained node starts an activation: an optional windup phase
//! during which the same user cannot start another skill, then the live
//! phase, and an optional cooldown during which the node itself blocks
//! re-use. Completion is explicit; the activation record survives until
//! both completion and cooldown are done.

use crate::config::EngineConfig;
use crate::events::{EventLog, SkillTreeEvent};
use crate::scheduler::Tick;
use crate::state::{NodeRef, ProgressionState, UseId, UsedSkill, UserId};

use super::ActionTransition;

/// Starts a skill activation on an obtained node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UseSkillAction {
    pub node: NodeRef,
    pub user: UserId,
}

/// The timings are returned so the caller can schedule the matching
/// windup and cooldown timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UseSkillOutcome {
    pub use_id: UseId,
    pub windup: Tick,
    pub cooldown: Tick,
}

/// Marks an activation as finished for gameplay purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompleteSkillUseAction {
    pub use_id: UseId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompleteSkillUseOutcome {
    /// True when the record stayed behind to keep blocking re-use until
    /// its cooldown elapses.
    pub retained: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkillUseError {
    #[error("{} has no node {}", .0.graph, .0.position)]
    NodeNotFound(NodeRef),

    #[error("node {} in {} holds no invested points", .0.position, .0.graph)]
    NodeNotObtained(NodeRef),

    #[error("user {} is still winding up another skill", .0.0)]
    UserWindingUp(UserId),

    #[error("node {} in {} is busy or cooling down", .0.position, .0.graph)]
    NodeBusy(NodeRef),

    #[error("skill use {} does not exist", .0.0)]
    UseNotFound(UseId),

    #[error("skill use {} was already completed", .0.0)]
    AlreadyCompleted(UseId),
}

impl crate::error::EngineError for SkillUseError {
    fn severity(&self) -> crate::error::ErrorSeverity {
        crate::error::ErrorSeverity::Validation
    }
}

impl ActionTransition for UseSkillAction {
    type Error = SkillUseError;
    type Outcome = UseSkillOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        let node = state
            .node(self.node)
            .ok_or(SkillUseError::NodeNotFound(self.node))?;
        if !node.state().is_obtained() {
            return Err(SkillUseError::NodeNotObtained(self.node));
        }
        if state
            .uses()
            .iter()
            .any(|u| u.user == self.user && u.winding_up)
        {
            return Err(SkillUseError::UserWindingUp(self.user));
        }
        // Any surviving activation for this node blocks re-use, whether it
        // is still live or just cooling down.
        if state.uses().iter().any(|u| u.node == self.node) {
            return Err(SkillUseError::NodeBusy(self.node));
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let node = state
            .node(self.node)
            .ok_or(SkillUseError::NodeNotFound(self.node))?;
        let windup = node.windup();
        let cooldown = node.cooldown();

        let use_id = state.allocate_use_id();
        state.push_use(UsedSkill {
            id: use_id,
            node: self.node,
            user: self.user,
            winding_up: !windup.is_zero(),
            on_cooldown: !cooldown.is_zero(),
            completed: false,
        });

        events.push(SkillTreeEvent::SkillUsed {
            use_id,
            node: self.node,
            user: self.user,
        });

        tracing::debug!(
            use_id = use_id.0,
            graph = %self.node.graph,
            node = self.node.position,
            %windup,
            %cooldown,
            "skill use started"
        );

        Ok(UseSkillOutcome {
            use_id,
            windup,
            cooldown,
        })
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        debug_assert!(state.uses().iter().filter(|u| u.node == self.node).count() == 1);
        Ok(())
    }
}

impl ActionTransition for CompleteSkillUseAction {
    type Error = SkillUseError;
    type Outcome = CompleteSkillUseOutcome;

    fn pre_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        let used = state
            .use_by_id(self.use_id)
            .ok_or(SkillUseError::UseNotFound(self.use_id))?;
        if used.completed {
            return Err(SkillUseError::AlreadyCompleted(self.use_id));
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut ProgressionState,
        _config: &EngineConfig,
        events: &mut EventLog,
    ) -> Result<Self::Outcome, Self::Error> {
        let used = state
            .use_mut(self.use_id)
            .ok_or(SkillUseError::UseNotFound(self.use_id))?;
        used.completed = true;
        used.winding_up = false;
        let retained = used.on_cooldown;
        if !retained {
            state.retire_use(self.use_id);
        }

        events.push(SkillTreeEvent::SkillUseCompleted {
            use_id: self.use_id,
        });
        tracing::debug!(use_id = self.use_id.0, retained, "skill use completed");

        Ok(CompleteSkillUseOutcome { retained })
    }

    fn post_validate(
        &self,
        state: &ProgressionState,
        _config: &EngineConfig,
    ) -> Result<(), Self::Error> {
        if let Some(used) = state.use_by_id(self.use_id) {
            debug_assert!(used.completed && used.on_cooldown);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Graph, GraphId, GridDimensions, Node, NodeState};
    use crate::stat::{CombineKind, CombineOperator, Stat};
    use crate::value::{DescriptorId, NumericKind, Scalar, ValueDescriptor, ValueKind};
    use std::sync::Arc;

    fn stat() -> Stat {
        let descriptor = Arc::new(
            ValueDescriptor::new(
                DescriptorId(1),
                "Damage",
                "DMG",
                NumericKind::Integer,
                ValueKind::Absolute,
                None,
                None,
            )
            .unwrap(),
        );
        Stat::new(
            descriptor,
            Scalar::Int(10),
            Scalar::Int(5),
            3,
            CombineKind::Value,
            CombineOperator::Add,
        )
    }

    fn state_with_skill(windup: Tick, cooldown: Tick) -> (ProgressionState, NodeRef) {
        let id = GraphId(1);
        let graph = Graph::new(
            id,
            "Test",
            GridDimensions::default(),
            vec![
                Node::new(0, "a", "A", "Node A.", 3, vec![stat()])
                    .with_timings(windup, cooldown),
                Node::new(1, "b", "B", "Node B.", 3, vec![stat()]),
            ],
            vec![],
        )
        .unwrap();
        let mut state = ProgressionState::new();
        state.add_graph(graph).unwrap();
        for position in [0, 1] {
            let node = state.graph_mut(id).unwrap().node_mut(position).unwrap();
            node.set_level(1);
            node.set_state(NodeState::Obtained);
        }
        (
            state,
            NodeRef {
                graph: id,
                position: 0,
            },
        )
    }

    fn run<A: ActionTransition>(
        state: &mut ProgressionState,
        action: A,
    ) -> Result<A::Outcome, A::Error> {
        let config = EngineConfig::default();
        let mut events = EventLog::new();
        action.pre_validate(state, &config)?;
        let outcome = action.apply(state, &config, &mut events)?;
        action.post_validate(state, &config)?;
        Ok(outcome)
    }

    #[test]
    fn using_a_skill_records_an_activation_with_its_timings() {
        let (mut state, node) = state_with_skill(Tick(2), Tick(5));
        let outcome = run(
            &mut state,
            UseSkillAction {
                node,
                user: UserId(1),
            },
        )
        .unwrap();

        assert_eq!(outcome.windup, Tick(2));
        assert_eq!(outcome.cooldown, Tick(5));
        let used = state.use_by_id(outcome.use_id).unwrap();
        assert!(used.winding_up);
        assert!(used.on_cooldown);
        assert!(!used.completed);
    }

    #[test]
    fn locked_nodes_cannot_be_used() {
        let (mut state, node) = state_with_skill(Tick::ZERO, Tick::ZERO);
        {
            let n = state.graph_mut(node.graph).unwrap().node_mut(0).unwrap();
            n.set_level(0);
            n.set_state(NodeState::Locked);
        }
        let result = run(
            &mut state,
            UseSkillAction {
                node,
                user: UserId(1),
            },
        );
        assert_eq!(result.unwrap_err(), SkillUseError::NodeNotObtained(node));
    }

    #[test]
    fn a_winding_up_user_cannot_start_another_skill() {
        let (mut state, node) = state_with_skill(Tick(2), Tick::ZERO);
        run(
            &mut state,
            UseSkillAction {
                node,
                user: UserId(1),
            },
        )
        .unwrap();

        // Same user, different node: blocked by the windup.
        let other = NodeRef {
            graph: node.graph,
            position: 1,
        };
        let same_user = UseSkillAction {
            node: other,
            user: UserId(1),
        };
        assert_eq!(
            same_user.pre_validate(&state, &EngineConfig::default()),
            Err(SkillUseError::UserWindingUp(UserId(1)))
        );

        // Different user, same node: blocked by the pending activation.
        let same_node = UseSkillAction {
            node,
            user: UserId(2),
        };
        assert_eq!(
            same_node.pre_validate(&state, &EngineConfig::default()),
            Err(SkillUseError::NodeBusy(node))
        );
    }

    #[test]
    fn completion_without_cooldown_retires_the_record() {
        let (mut state, node) = state_with_skill(Tick::ZERO, Tick::ZERO);
        let started = run(
            &mut state,
            UseSkillAction {
                node,
                user: UserId(1),
            },
        )
        .unwrap();

        let done = run(
            &mut state,
            CompleteSkillUseAction {
                use_id: started.use_id,
            },
        )
        .unwrap();

        assert!(!done.retained);
        assert!(state.use_by_id(started.use_id).is_none());
        assert!(state.uses().is_empty());
    }

    #[test]
    fn completion_with_cooldown_keeps_blocking_reuse() {
        let (mut state, node) = state_with_skill(Tick::ZERO, Tick(4));
        let started = run(
            &mut state,
            UseSkillAction {
                node,
                user: UserId(1),
            },
        )
        .unwrap();

        let done = run(
            &mut state,
            CompleteSkillUseAction {
                use_id: started.use_id,
            },
        )
        .unwrap();
        assert!(done.retained);

        let again = UseSkillAction {
            node,
            user: UserId(1),
        };
        assert_eq!(
            again.pre_validate(&state, &EngineConfig::default()),
            Err(SkillUseError::NodeBusy(node))
        );
    }

    #[test]
    fn completing_twice_is_rejected() {
        let (mut state, node) = state_with_skill(Tick::ZERO, Tick(4));
        let started = run(
            &mut state,
            UseSkillAction {
                node,
                user: UserId(1),
            },
        )
        .unwrap();
        run(
            &mut state,
            CompleteSkillUseAction {
                use_id: started.use_id,
            },
        )
        .unwrap();

        let result = run(
            &mut state,
            CompleteSkillUseAction {
                use_id: started.use_id,
            },
        );
        assert_eq!(
            result.unwrap_err(),
            SkillUseError::AlreadyCompleted(started.use_id)
        );
    }
}
