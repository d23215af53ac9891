//! Progression nodes and their state machine.

use std::sync::Arc;

use crate::scheduler::Tick;
use crate::stat::{Stat, StatChange};
use crate::value::DescriptorId;

/// Lifecycle state of a node.
///
/// Transitions:
/// - `Locked → Unlocked` when connection reachability is satisfied;
/// - `Unlocked → Obtained` when the level leaves zero via an upgrade;
/// - `Obtained → Maxed` when the level reaches `max_level`;
/// - `Maxed/Obtained → Unlocked` when a downgrade returns the level to zero;
/// - `Obtained/Maxed → Locked` when the node is forcibly depleted.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    #[default]
    Locked,
    Unlocked,
    Obtained,
    Maxed,
}

impl NodeState {
    /// True for states in which the node holds invested points.
    pub fn is_obtained(&self) -> bool {
        matches!(self, NodeState::Obtained | NodeState::Maxed)
    }
}

/// An upgradeable progression unit.
///
/// Invariants:
/// - `0 ≤ current_level ≤ max_level`;
/// - `state == Maxed ⟺ current_level == max_level > 0`;
/// - `state ∈ {Locked, Unlocked} ⟺ current_level == 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    position_index: u32,
    key: String,
    pub display_name: String,
    pub description: String,
    /// Free-form type label, validated against the configured label list by
    /// the content layer.
    pub node_type: String,
    state: NodeState,
    current_level: u32,
    max_level: u32,
    pub player_level_requirement: u32,
    pub tree_points_requirement: u32,
    windup: Tick,
    cooldown: Tick,
    stats: Vec<Stat>,
}

impl Node {
    /// Creates a locked node at level zero.
    pub fn new(
        position_index: u32,
        key: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        max_level: u32,
        stats: Vec<Stat>,
    ) -> Self {
        Self {
            position_index,
            key: key.into(),
            display_name: display_name.into(),
            description: description.into(),
            node_type: String::new(),
            state: NodeState::Locked,
            current_level: 0,
            max_level,
            player_level_requirement: 0,
            tree_points_requirement: 0,
            windup: Tick::ZERO,
            cooldown: Tick::ZERO,
            stats,
        }
    }

    /// Sets the unlock gates (builder pattern).
    #[must_use]
    pub fn with_requirements(mut self, player_level: u32, tree_points: u32) -> Self {
        self.player_level_requirement = player_level;
        self.tree_points_requirement = tree_points;
        self
    }

    /// Sets the type label (builder pattern).
    #[must_use]
    pub fn with_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    /// Sets activation timings for skill use (builder pattern).
    #[must_use]
    pub fn with_timings(mut self, windup: Tick, cooldown: Tick) -> Self {
        self.windup = windup;
        self.cooldown = cooldown;
        self
    }

    pub fn position_index(&self) -> u32 {
        self.position_index
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn windup(&self) -> Tick {
        self.windup
    }

    pub fn cooldown(&self) -> Tick {
        self.cooldown
    }

    pub fn stats(&self) -> &[Stat] {
        &self.stats
    }

    /// Looks up an owned stat by descriptor id.
    pub fn stat(&self, descriptor: DescriptorId) -> Option<&Stat> {
        self.stats.iter().find(|s| s.descriptor().id() == descriptor)
    }

    pub(crate) fn stat_mut(&mut self, descriptor: DescriptorId) -> Option<&mut Stat> {
        self.stats
            .iter_mut()
            .find(|s| s.descriptor().id() == descriptor)
    }

    pub(crate) fn stats_mut(&mut self) -> &mut [Stat] {
        &mut self.stats
    }

    /// Whether the node definition is complete enough to play.
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty()
            && !self.display_name.is_empty()
            && !self.description.is_empty()
            && self.max_level > 0
            && !self.stats.is_empty()
            && self
                .stats
                .iter()
                .all(|s| !s.initial_value().is_negative() && !s.scaling().is_negative())
    }

    /// True when every node invariant holds. Used by post-validation.
    pub fn invariants_hold(&self) -> bool {
        if self.current_level > self.max_level {
            return false;
        }
        match self.state {
            NodeState::Locked | NodeState::Unlocked => self.current_level == 0,
            NodeState::Obtained => {
                self.current_level >= 1
                    && (self.current_level < self.max_level || self.max_level == 0)
            }
            NodeState::Maxed => self.current_level == self.max_level && self.max_level > 0,
        }
    }

    /// The obtained-side state implied by a nonzero level.
    pub(crate) fn state_for_level(&self, level: u32) -> NodeState {
        if level == self.max_level && self.max_level > 0 {
            NodeState::Maxed
        } else if level > 0 {
            NodeState::Obtained
        } else {
            NodeState::Unlocked
        }
    }

    pub(crate) fn set_state(&mut self, state: NodeState) {
        self.state = state;
    }

    /// Moves the node to a new level and propagates it to every owned
    /// stat. Does not touch `state`; the transition decides that.
    pub(crate) fn set_level(&mut self, level: u32) -> Vec<StatChange> {
        self.current_level = level.min(self.max_level);
        let level = self.current_level;
        self.stats.iter_mut().map(|s| s.set_level(level)).collect()
    }

    /// The descriptors this node's stats are bound to, for diagnostics.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<crate::value::ValueDescriptor>> {
        self.stats.iter().map(|s| s.descriptor())
    }
}
