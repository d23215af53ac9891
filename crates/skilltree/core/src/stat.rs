//! Leveled stats.
//!
//! A [`Stat`] is an instance of a [`ValueDescriptor`] owned by a node: a
//! base value that scales with the node's level, plus an external modifier
//! channel through which buffs and debuffs of differing semantics compose
//! onto it. Derived values (`base_value`, `max_value`, `next_base_value`)
//! are never stored, always recomputed.
//!
//! Levels only change through the owning node; callers outside the crate
//! cannot move a stat's level independently.

use std::sync::Arc;

use crate::value::{
    BoundKind, CoercionPolicy, DescriptorId, NumericValue, Scalar, ValueDescriptor, ValueError,
};

/// How a stat interprets *itself* when combined onto another stat.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineKind {
    /// Apply this stat's current value directly.
    Value,
    /// Apply `target.base_value × (current / 100)`.
    PercentOfMax,
    /// Apply `target.current_value × (current / 100)`.
    PercentOfCurrent,
}

/// Whether a combined stat adds to or subtracts from its target.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineOperator {
    Add,
    Subtract,
}

/// What a stat mutation did, for event reporting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatChange {
    pub descriptor: DescriptorId,
    /// Current value after the change.
    pub value: Scalar,
    /// New level, when the change was a level change.
    pub level: Option<u32>,
    /// Bound hit while clamping, if any.
    pub bound: Option<BoundKind>,
}

/// A leveled numeric attribute attached to a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stat {
    descriptor: Arc<ValueDescriptor>,
    initial_value: Scalar,
    scaling: Scalar,
    current_level: u32,
    max_level: u32,
    external_value: Scalar,
    combine_kind: CombineKind,
    combine_op: CombineOperator,
    current: Scalar,
    excess: Scalar,
}

impl Stat {
    /// Creates a stat at level zero.
    ///
    /// `initial_value` and `scaling` are coerced to the descriptor's
    /// numeric kind so all later arithmetic stays same-kind.
    pub fn new(
        descriptor: Arc<ValueDescriptor>,
        initial_value: Scalar,
        scaling: Scalar,
        max_level: u32,
        combine_kind: CombineKind,
        combine_op: CombineOperator,
    ) -> Self {
        let kind = descriptor.numeric_kind();
        Self {
            initial_value: initial_value.coerce(kind),
            scaling: scaling.coerce(kind),
            current_level: 0,
            max_level,
            external_value: Scalar::zero(kind),
            combine_kind,
            combine_op,
            current: Scalar::zero(kind),
            excess: Scalar::zero(kind),
            descriptor,
        }
    }

    pub fn descriptor(&self) -> &Arc<ValueDescriptor> {
        &self.descriptor
    }

    pub fn initial_value(&self) -> Scalar {
        self.initial_value
    }

    pub fn scaling(&self) -> Scalar {
        self.scaling
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn external_value(&self) -> Scalar {
        self.external_value
    }

    pub fn combine_kind(&self) -> CombineKind {
        self.combine_kind
    }

    pub fn combine_operator(&self) -> CombineOperator {
        self.combine_op
    }

    pub fn current_value(&self) -> Scalar {
        self.current
    }

    /// Value contributed by the level curve alone.
    ///
    /// `initial + scaling × (level − 1)`; zero while the stat is at level
    /// zero (not yet obtained).
    pub fn base_value(&self) -> Scalar {
        if self.current_level == 0 {
            return Scalar::zero(self.descriptor.numeric_kind());
        }
        self.initial_value
            .add(self.scaling.mul_levels(self.current_level - 1))
    }

    /// Base value the stat would have at the next level.
    pub fn next_base_value(&self) -> Scalar {
        self.initial_value
            .add(self.scaling.mul_levels(self.current_level))
    }

    /// Effective cap: base value plus the external modifier channel.
    pub fn max_value(&self) -> Scalar {
        self.base_value().add(self.external_value)
    }

    /// Drains the recorded clamp excess. Single-shot: reads the amount
    /// accumulated since the last drain, then resets it to zero.
    pub fn take_excess(&mut self) -> Scalar {
        let excess = self.excess;
        self.excess = Scalar::zero(self.descriptor.numeric_kind());
        excess
    }

    /// Moves the stat to a new level, refilling the current value to the
    /// new cap. Only the owning node calls this.
    pub(crate) fn set_level(&mut self, level: u32) -> StatChange {
        self.current_level = level.min(self.max_level);
        let bound = self.reclamp(self.max_value());
        StatChange {
            descriptor: self.descriptor.id(),
            value: self.current,
            level: Some(self.current_level),
            bound,
        }
    }

    /// Combines another stat onto this one.
    ///
    /// The modifier is interpreted by *its own* combine kind and operator,
    /// not the target's: the computed delta lands on both `external_value`
    /// and `current_value`, followed by clamp-and-record-excess.
    pub fn apply_modifier(
        &mut self,
        other: &Stat,
        policy: CoercionPolicy,
    ) -> Result<StatChange, ValueError> {
        let value = NumericValue::new(Arc::clone(other.descriptor()), other.current_value());
        self.apply_modifier_value(&value, other.combine_kind, other.combine_op, policy)
    }

    /// Combines a typed value onto this stat under the given combine rule.
    ///
    /// This is the primitive behind [`Stat::apply_modifier`]; buffs that
    /// do not originate from another node's stat come in through here.
    pub fn apply_modifier_value(
        &mut self,
        modifier: &NumericValue,
        kind: CombineKind,
        op: CombineOperator,
        policy: CoercionPolicy,
    ) -> Result<StatChange, ValueError> {
        let left = self.descriptor.numeric_kind();
        let right = modifier.descriptor().numeric_kind();
        if policy == CoercionPolicy::Strict && left != right {
            return Err(ValueError::TypeMismatch { left, right });
        }

        let delta = match kind {
            CombineKind::Value => modifier.value().coerce(left),
            CombineKind::PercentOfMax => self.base_value().mul_percent(modifier.value()),
            CombineKind::PercentOfCurrent => self.current.mul_percent(modifier.value()),
        };

        let (external, current) = match op {
            CombineOperator::Add => (
                self.external_value.add(delta),
                self.current.add(delta),
            ),
            CombineOperator::Subtract => (
                self.external_value.sub(delta),
                self.current.sub(delta),
            ),
        };

        self.external_value = external;
        let bound = self.reclamp(current);

        Ok(StatChange {
            descriptor: self.descriptor.id(),
            value: self.current,
            level: None,
            bound,
        })
    }

    /// Clamps a candidate current value into descriptor bounds and under
    /// `max_value`, accumulating any clipped amount into the excess slot.
    fn reclamp(&mut self, candidate: Scalar) -> Option<BoundKind> {
        let clamped = self
            .descriptor
            .clamp_with_ceiling(candidate, Some(self.max_value()));
        self.current = clamped.value;
        if clamped.bound.is_some() {
            self.excess = self.excess.add(clamped.excess);
        }
        clamped.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{NumericKind, ValueKind};

    fn descriptor(id: u32, kind: NumericKind, max: Option<Scalar>) -> Arc<ValueDescriptor> {
        Arc::new(
            ValueDescriptor::new(
                DescriptorId(id),
                "Damage",
                "DMG",
                kind,
                ValueKind::Absolute,
                Some(Scalar::zero(kind)),
                max,
            )
            .unwrap(),
        )
    }

    fn damage_stat() -> Stat {
        // 10 at level 1, +5 per further level.
        Stat::new(
            descriptor(1, NumericKind::Integer, None),
            Scalar::Int(10),
            Scalar::Int(5),
            5,
            CombineKind::Value,
            CombineOperator::Add,
        )
    }

    #[test]
    fn derived_values_follow_the_level_curve() {
        let mut stat = damage_stat();
        assert_eq!(stat.base_value(), Scalar::Int(0));
        assert_eq!(stat.next_base_value(), Scalar::Int(10));

        stat.set_level(1);
        assert_eq!(stat.base_value(), Scalar::Int(10));
        assert_eq!(stat.next_base_value(), Scalar::Int(15));
        assert_eq!(stat.current_value(), Scalar::Int(10));

        stat.set_level(3);
        assert_eq!(stat.base_value(), Scalar::Int(20));
        assert_eq!(stat.max_value(), Scalar::Int(20));
    }

    #[test]
    fn level_is_capped_at_max_level() {
        let mut stat = damage_stat();
        stat.set_level(99);
        assert_eq!(stat.current_level(), 5);
    }

    #[test]
    fn value_modifier_shifts_external_and_current() {
        let mut stat = damage_stat();
        stat.set_level(1);

        let mut buff = Stat::new(
            descriptor(2, NumericKind::Integer, None),
            Scalar::Int(4),
            Scalar::Int(0),
            1,
            CombineKind::Value,
            CombineOperator::Add,
        );
        buff.set_level(1);

        stat.apply_modifier(&buff, CoercionPolicy::Lenient).unwrap();
        assert_eq!(stat.external_value(), Scalar::Int(4));
        assert_eq!(stat.current_value(), Scalar::Int(14));
        assert_eq!(stat.max_value(), Scalar::Int(14));
    }

    #[test]
    fn percent_of_max_uses_target_base_value() {
        let mut stat = damage_stat();
        stat.set_level(3); // base 20

        let mut buff = Stat::new(
            descriptor(2, NumericKind::Integer, None),
            Scalar::Int(50),
            Scalar::Int(0),
            1,
            CombineKind::PercentOfMax,
            CombineOperator::Add,
        );
        buff.set_level(1);

        stat.apply_modifier(&buff, CoercionPolicy::Lenient).unwrap();
        // 20 × 50% = 10
        assert_eq!(stat.external_value(), Scalar::Int(10));
        assert_eq!(stat.current_value(), Scalar::Int(30));
    }

    #[test]
    fn percent_of_current_uses_target_current_value() {
        let mut stat = damage_stat();
        stat.set_level(3); // current 20

        let mut debuff = Stat::new(
            descriptor(2, NumericKind::Integer, None),
            Scalar::Int(25),
            Scalar::Int(0),
            1,
            CombineKind::PercentOfCurrent,
            CombineOperator::Subtract,
        );
        debuff.set_level(1);

        stat.apply_modifier(&debuff, CoercionPolicy::Lenient).unwrap();
        // 20 × 25% = 5 subtracted
        assert_eq!(stat.external_value(), Scalar::Int(-5));
        assert_eq!(stat.current_value(), Scalar::Int(15));
    }

    #[test]
    fn strict_policy_rejects_mixed_kind_modifiers() {
        let mut stat = damage_stat();
        stat.set_level(1);

        let mut buff = Stat::new(
            descriptor(2, NumericKind::Float, None),
            Scalar::Float(1.5),
            Scalar::Float(0.0),
            1,
            CombineKind::Value,
            CombineOperator::Add,
        );
        buff.set_level(1);

        assert!(matches!(
            stat.apply_modifier(&buff, CoercionPolicy::Strict),
            Err(ValueError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn excess_drains_exactly_once() {
        let mut stat = Stat::new(
            descriptor(1, NumericKind::Integer, Some(Scalar::Int(12))),
            Scalar::Int(10),
            Scalar::Int(5),
            5,
            CombineKind::Value,
            CombineOperator::Add,
        );

        stat.set_level(2); // base 15, descriptor cap 12 → 3 clipped
        assert_eq!(stat.current_value(), Scalar::Int(12));
        assert_eq!(stat.take_excess(), Scalar::Int(3));
        assert_eq!(stat.take_excess(), Scalar::Int(0));
    }
}
