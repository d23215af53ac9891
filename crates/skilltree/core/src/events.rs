//! Change notifications for the presentation layer.
//!
//! Events are synchronous multicast notifications fired in-line during the
//! mutation that caused them, always after the state they describe has
//! already changed. Subscribers must not assume ordering across
//! independent event kinds. The dispatcher is an explicit observer list
//! owned by the engine; there are no ambient static event objects.

use bitflags::bitflags;

use crate::state::{GraphId, NodeRef, NodeState, UseId, UserId};
use crate::value::{BoundKind, DescriptorId, Scalar};

bitflags! {
    /// Which aspects of a graph changed during a mutation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct GraphChangeFlags: u8 {
        const NODES       = 1 << 0;
        const CONNECTIONS = 1 << 1;
        const LEVELS      = 1 << 2;
        const STATES      = 1 << 3;
        const POINTS      = 1 << 4;
    }
}

/// Everything the engine announces to the outside.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SkillTreeEvent {
    /// A graph was mutated; flags summarize what kind of change.
    GraphChanged {
        graph: GraphId,
        flags: GraphChangeFlags,
    },

    /// A node moved through its state machine.
    NodeStateChanged {
        graph: GraphId,
        position: u32,
        from: NodeState,
        to: NodeState,
    },

    /// A node was upgraded.
    NodeUpgraded {
        graph: GraphId,
        position: u32,
        new_level: u32,
        points_consumed: u32,
    },

    /// A node was downgraded.
    NodeDowngraded {
        graph: GraphId,
        position: u32,
        new_level: u32,
        points_refunded: u32,
    },

    /// A node was forcibly returned to level zero and locked.
    NodeDepleted {
        graph: GraphId,
        position: u32,
        points_refunded: u32,
    },

    /// A stat's current value changed.
    StatChanged {
        graph: GraphId,
        position: u32,
        descriptor: DescriptorId,
        value: Scalar,
    },

    /// A stat's level changed with its node.
    StatLevelChanged {
        graph: GraphId,
        position: u32,
        descriptor: DescriptorId,
        level: u32,
    },

    /// A stat clamped against one of its bounds.
    StatReachedBound {
        graph: GraphId,
        position: u32,
        descriptor: DescriptorId,
        bound: BoundKind,
    },

    /// A skill activation started.
    SkillUsed {
        use_id: UseId,
        node: NodeRef,
        user: UserId,
    },

    /// A skill activation finished for gameplay purposes.
    SkillUseCompleted { use_id: UseId },

    /// The player level changed.
    PlayerLevelChanged { level: u32 },

    /// The unspent point pool changed.
    PointPoolChanged { pool: u32 },
}

/// A synchronous event subscriber.
pub trait EventSink {
    fn on_event(&mut self, event: &SkillTreeEvent);
}

/// Observer list owned by the engine.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn EventSink>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }

    /// Delivers one event to every sink, in subscription order.
    pub fn publish(&mut self, event: &SkillTreeEvent) {
        if self.sinks.is_empty() {
            // No subscribers - this is normal, not an error.
            tracing::trace!(?event, "no subscribers for event");
            return;
        }
        for sink in &mut self.sinks {
            sink.on_event(event);
        }
    }
}

/// Buffer the transitions write events into; the engine drains it to the
/// dispatcher after the mutation committed.
#[derive(Default)]
pub struct EventLog {
    events: Vec<SkillTreeEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SkillTreeEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SkillTreeEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<SkillTreeEvent> {
        core::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
