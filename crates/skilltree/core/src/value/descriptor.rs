//! Static stat-kind metadata.
//!
//! A [`ValueDescriptor`] defines one kind of stat: how it is represented
//! (float or integer), what it means (absolute quantity or percentage) and
//! the bounds every value of that kind is clamped into. Descriptors are
//! immutable once constructed and shared behind `Arc` by every value and
//! stat of that kind.

use super::scalar::{NumericKind, Scalar, ValueKind};
use super::ValueError;

/// Identifier of a [`ValueDescriptor`], unique within a registry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct DescriptorId(pub u32);

impl core::fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "descriptor#{}", self.0)
    }
}

/// Which bound a clamp landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BoundKind {
    Min,
    Max,
}

/// Result of clamping a scalar: the in-bounds value, the amount clipped
/// off, and which bound (if any) was hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clamped {
    pub value: Scalar,
    /// Magnitude removed by the clamp, zero when nothing was clipped.
    pub excess: Scalar,
    pub bound: Option<BoundKind>,
}

impl Clamped {
    /// A clamp that changed nothing.
    pub fn untouched(value: Scalar) -> Self {
        Self {
            value,
            excess: Scalar::zero(value.kind()),
            bound: None,
        }
    }
}

/// Immutable definition of a stat kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueDescriptor {
    id: DescriptorId,
    display_name: String,
    abbreviation: String,
    numeric_kind: NumericKind,
    value_kind: ValueKind,
    min: Option<Scalar>,
    max: Option<Scalar>,
}

impl ValueDescriptor {
    /// Creates a descriptor, validating its bounds.
    ///
    /// Bounds are coerced to `numeric_kind`; when both are present,
    /// `min ≤ max` must hold.
    pub fn new(
        id: DescriptorId,
        display_name: impl Into<String>,
        abbreviation: impl Into<String>,
        numeric_kind: NumericKind,
        value_kind: ValueKind,
        min: Option<Scalar>,
        max: Option<Scalar>,
    ) -> Result<Self, ValueError> {
        let min = min.map(|s| s.coerce(numeric_kind));
        let max = max.map(|s| s.coerce(numeric_kind));

        if let (Some(lo), Some(hi)) = (min, max)
            && lo.compare(hi)? == core::cmp::Ordering::Greater
        {
            return Err(ValueError::InvalidBounds { id, min: lo, max: hi });
        }

        Ok(Self {
            id,
            display_name: display_name.into(),
            abbreviation: abbreviation.into(),
            numeric_kind,
            value_kind,
            min,
            max,
        })
    }

    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }

    pub fn numeric_kind(&self) -> NumericKind {
        self.numeric_kind
    }

    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    pub fn min(&self) -> Option<Scalar> {
        self.min
    }

    pub fn max(&self) -> Option<Scalar> {
        self.max
    }

    /// Clamps a scalar into this descriptor's bounds.
    ///
    /// The input is coerced to the descriptor's numeric kind first.
    /// Clamping is idempotent: an in-bounds value passes through untouched.
    pub fn clamp(&self, value: Scalar) -> Clamped {
        let value = value.coerce(self.numeric_kind);
        self.clamp_with_ceiling(value, None)
    }

    /// Clamps into bounds with an optional additional ceiling.
    ///
    /// Stats use the ceiling for their `max_value` cap, which is tighter
    /// than the descriptor bound whenever modifiers shrink headroom.
    pub fn clamp_with_ceiling(&self, value: Scalar, ceiling: Option<Scalar>) -> Clamped {
        let value = value.coerce(self.numeric_kind);

        let upper = match (self.max, ceiling.map(|c| c.coerce(self.numeric_kind))) {
            (Some(a), Some(b)) => Some(if a.compare(b).unwrap_or(core::cmp::Ordering::Less)
                == core::cmp::Ordering::Less
            {
                a
            } else {
                b
            }),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };

        if let Some(lo) = self.min
            && value.compare(lo).unwrap_or(core::cmp::Ordering::Greater)
                == core::cmp::Ordering::Less
        {
            return Clamped {
                value: lo,
                excess: lo.sub(value),
                bound: Some(BoundKind::Min),
            };
        }

        if let Some(hi) = upper
            && value.compare(hi).unwrap_or(core::cmp::Ordering::Less)
                == core::cmp::Ordering::Greater
        {
            return Clamped {
                value: hi,
                excess: value.sub(hi),
                bound: Some(BoundKind::Max),
            };
        }

        Clamped::untouched(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health_descriptor() -> ValueDescriptor {
        ValueDescriptor::new(
            DescriptorId(1),
            "Health",
            "HP",
            NumericKind::Integer,
            ValueKind::Absolute,
            Some(Scalar::Int(0)),
            Some(Scalar::Int(100)),
        )
        .unwrap()
    }

    #[test]
    fn rejects_inverted_bounds() {
        let result = ValueDescriptor::new(
            DescriptorId(2),
            "Broken",
            "BR",
            NumericKind::Integer,
            ValueKind::Absolute,
            Some(Scalar::Int(10)),
            Some(Scalar::Int(-10)),
        );
        assert!(matches!(result, Err(ValueError::InvalidBounds { .. })));
    }

    #[test]
    fn clamp_records_excess_and_bound() {
        let descriptor = health_descriptor();

        let clamped = descriptor.clamp(Scalar::Int(130));
        assert_eq!(clamped.value, Scalar::Int(100));
        assert_eq!(clamped.excess, Scalar::Int(30));
        assert_eq!(clamped.bound, Some(BoundKind::Max));

        let clamped = descriptor.clamp(Scalar::Int(-5));
        assert_eq!(clamped.value, Scalar::Int(0));
        assert_eq!(clamped.excess, Scalar::Int(5));
        assert_eq!(clamped.bound, Some(BoundKind::Min));
    }

    #[test]
    fn clamp_is_idempotent() {
        let descriptor = health_descriptor();

        let once = descriptor.clamp(Scalar::Int(130));
        let twice = descriptor.clamp(once.value);
        assert_eq!(twice.value, once.value);
        assert_eq!(twice.excess, Scalar::Int(0));
        assert_eq!(twice.bound, None);
    }

    #[test]
    fn ceiling_tightens_the_upper_bound() {
        let descriptor = health_descriptor();

        let clamped = descriptor.clamp_with_ceiling(Scalar::Int(90), Some(Scalar::Int(80)));
        assert_eq!(clamped.value, Scalar::Int(80));
        assert_eq!(clamped.excess, Scalar::Int(10));
    }
}
