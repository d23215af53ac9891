//! Tick-driven timers for windup and cooldown.
//!
//! The engine never blocks or suspends: an external driver (frame loop,
//! event loop) advances the scheduler once per tick, and timers that reach
//! zero complete synchronously on that tick. Cancelling a timer simply
//! drops it; no completion fires.

use crate::state::UseId;

/// Engine time in scheduler ticks.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn saturating_sub(self, rhs: Tick) -> Tick {
        Tick(self.0.saturating_sub(rhs.0))
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl core::fmt::Display for Tick {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}t", self.0)
    }
}

/// Identifier of a pending timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer completion means to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Windup elapsed: the activation stops winding up.
    Windup { use_id: UseId },
    /// Cooldown elapsed: the activation stops blocking re-use.
    Cooldown { use_id: UseId },
}

#[derive(Clone, Copy, Debug)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    remaining: Tick,
}

/// Table of pending timers, advanced once per external tick.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a timer. A zero duration completes on the next tick.
    pub fn schedule(&mut self, kind: TimerKind, duration: Tick) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            kind,
            remaining: duration,
        });
        id
    }

    /// Drops a pending timer without firing its completion.
    pub fn cancel(&mut self, id: TimerId) {
        self.timers.retain(|t| t.id != id);
    }

    /// Drops every timer tied to the given activation.
    pub fn cancel_for_use(&mut self, use_id: UseId) {
        self.timers.retain(|t| match t.kind {
            TimerKind::Windup { use_id: u } | TimerKind::Cooldown { use_id: u } => u != use_id,
        });
    }

    /// Advances all timers by `elapsed` and returns the completions, in
    /// scheduling order. Completions fire exactly once.
    pub fn tick(&mut self, elapsed: Tick) -> Vec<TimerKind> {
        let mut completed = Vec::new();
        for timer in &mut self.timers {
            timer.remaining = timer.remaining.saturating_sub(elapsed);
            if timer.remaining.is_zero() {
                completed.push(timer.kind);
            }
        }
        self.timers.retain(|t| !t.remaining.is_zero());
        completed
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Drops everything. Part of the engine's explicit clear.
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
