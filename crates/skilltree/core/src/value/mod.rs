//! Dual-typed numeric value model.
//!
//! Every stat value in the engine is a [`NumericValue`]: a [`Scalar`]
//! tagged by a shared [`ValueDescriptor`]. Arithmetic goes through a small
//! set of explicit functions (`add`, `sub`, `mul`, `div`, `compare`) that
//! pattern-match on the scalar tag, so the coercion policy lives in exactly
//! one place instead of being scattered across operator overloads.
//!
//! Every arithmetic result is clamped to its descriptor's bounds before it
//! is returned.

mod descriptor;
mod registry;
mod scalar;

pub use descriptor::{BoundKind, Clamped, DescriptorId, ValueDescriptor};
pub use registry::DescriptorRegistry;
pub use scalar::{NumericKind, Scalar, ValueKind};

use std::sync::Arc;

/// How mixed-kind operands are treated.
///
/// Derived from the `strict_stat_value_types` setting: strict installs a
/// hard failure on float/integer mixing, lenient silently coerces the right
/// operand to the left operand's kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoercionPolicy {
    Strict,
    #[default]
    Lenient,
}

/// Errors raised by the value model.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("numeric kind mismatch: left is {left}, right is {right}")]
    TypeMismatch {
        left: NumericKind,
        right: NumericKind,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("values admit no ordering (NaN operand)")]
    Incomparable,

    #[error("{id} has min {min:?} greater than max {max:?}")]
    InvalidBounds {
        id: DescriptorId,
        min: Scalar,
        max: Scalar,
    },

    #[error("descriptor {0} is already registered")]
    DuplicateDescriptor(DescriptorId),
}

/// A scalar bound to the descriptor that gives it meaning.
///
/// Invariants:
/// - the scalar's tag always matches the descriptor's numeric kind;
/// - the scalar is always inside the descriptor's bounds.
///
/// Both are re-established by every constructor and mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericValue {
    descriptor: Arc<ValueDescriptor>,
    scalar: Scalar,
}

impl NumericValue {
    /// Creates a value, coercing and clamping the scalar to fit the
    /// descriptor.
    pub fn new(descriptor: Arc<ValueDescriptor>, scalar: Scalar) -> Self {
        let scalar = descriptor.clamp(scalar).value;
        Self { descriptor, scalar }
    }

    /// A zero value of the descriptor's kind (clamped, so a positive
    /// minimum bound raises it).
    pub fn zero(descriptor: Arc<ValueDescriptor>) -> Self {
        let zero = Scalar::zero(descriptor.numeric_kind());
        Self::new(descriptor, zero)
    }

    pub fn descriptor(&self) -> &Arc<ValueDescriptor> {
        &self.descriptor
    }

    pub fn value(&self) -> Scalar {
        self.scalar
    }

    /// Replaces the payload, returning what the clamp did.
    pub fn set(&mut self, scalar: Scalar) -> Clamped {
        let clamped = self.descriptor.clamp(scalar);
        self.scalar = clamped.value;
        clamped
    }

    /// `self + other` under the given policy.
    pub fn add(&self, other: &NumericValue, policy: CoercionPolicy) -> Result<Self, ValueError> {
        self.check_kinds(other, policy)?;
        Ok(Self::new(
            Arc::clone(&self.descriptor),
            self.scalar.add(other.scalar),
        ))
    }

    /// `self − other` under the given policy.
    pub fn sub(&self, other: &NumericValue, policy: CoercionPolicy) -> Result<Self, ValueError> {
        self.check_kinds(other, policy)?;
        Ok(Self::new(
            Arc::clone(&self.descriptor),
            self.scalar.sub(other.scalar),
        ))
    }

    /// `self × other` under the given policy.
    pub fn mul(&self, other: &NumericValue, policy: CoercionPolicy) -> Result<Self, ValueError> {
        self.check_kinds(other, policy)?;
        Ok(Self::new(
            Arc::clone(&self.descriptor),
            self.scalar.mul(other.scalar),
        ))
    }

    /// `self ÷ other` under the given policy.
    pub fn div(&self, other: &NumericValue, policy: CoercionPolicy) -> Result<Self, ValueError> {
        self.check_kinds(other, policy)?;
        Ok(Self::new(
            Arc::clone(&self.descriptor),
            self.scalar.div(other.scalar)?,
        ))
    }

    /// Compares two values under the given policy.
    pub fn compare(
        &self,
        other: &NumericValue,
        policy: CoercionPolicy,
    ) -> Result<core::cmp::Ordering, ValueError> {
        self.check_kinds(other, policy)?;
        self.scalar.compare(other.scalar)
    }

    /// Raw-scalar arithmetic: the scalar is coerced to this value's kind
    /// unconditionally, since an untyped operand has no kind to defend.
    pub fn add_scalar(&self, scalar: Scalar) -> Self {
        Self::new(Arc::clone(&self.descriptor), self.scalar.add(scalar))
    }

    /// See [`NumericValue::add_scalar`].
    pub fn sub_scalar(&self, scalar: Scalar) -> Self {
        Self::new(Arc::clone(&self.descriptor), self.scalar.sub(scalar))
    }

    /// See [`NumericValue::add_scalar`].
    pub fn mul_scalar(&self, scalar: Scalar) -> Self {
        Self::new(Arc::clone(&self.descriptor), self.scalar.mul(scalar))
    }

    /// See [`NumericValue::add_scalar`]. Division by a zero scalar is a
    /// defined failure.
    pub fn div_scalar(&self, scalar: Scalar) -> Result<Self, ValueError> {
        Ok(Self::new(
            Arc::clone(&self.descriptor),
            self.scalar.div(scalar)?,
        ))
    }

    /// Compares against a raw scalar; NaN operands admit no ordering.
    pub fn compare_scalar(&self, scalar: Scalar) -> Result<core::cmp::Ordering, ValueError> {
        self.scalar.compare(scalar)
    }

    fn check_kinds(&self, other: &NumericValue, policy: CoercionPolicy) -> Result<(), ValueError> {
        let left = self.descriptor.numeric_kind();
        let right = other.descriptor.numeric_kind();
        if policy == CoercionPolicy::Strict && left != right {
            return Err(ValueError::TypeMismatch { left, right });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: u32, kind: NumericKind) -> Arc<ValueDescriptor> {
        Arc::new(
            ValueDescriptor::new(
                DescriptorId(id),
                "Test",
                "TST",
                kind,
                ValueKind::Absolute,
                Some(Scalar::zero(kind)),
                Some(Scalar::Int(100).coerce(kind)),
            )
            .unwrap(),
        )
    }

    #[test]
    fn strict_mode_rejects_mixed_kinds() {
        let float = NumericValue::new(descriptor(1, NumericKind::Float), Scalar::Float(1.5));
        let int = NumericValue::new(descriptor(2, NumericKind::Integer), Scalar::Int(2));

        let result = float.add(&int, CoercionPolicy::Strict);
        assert!(matches!(
            result,
            Err(ValueError::TypeMismatch {
                left: NumericKind::Float,
                right: NumericKind::Integer,
            })
        ));
    }

    #[test]
    fn lenient_mode_coerces_to_left_operand() {
        let float = NumericValue::new(descriptor(1, NumericKind::Float), Scalar::Float(1.5));
        let int = NumericValue::new(descriptor(2, NumericKind::Integer), Scalar::Int(2));

        let sum = float.add(&int, CoercionPolicy::Lenient).unwrap();
        assert_eq!(sum.value(), Scalar::Float(3.5));
        assert_eq!(sum.descriptor().id(), DescriptorId(1));

        let sum = int.add(&float, CoercionPolicy::Lenient).unwrap();
        assert_eq!(sum.value(), Scalar::Int(3));
        assert_eq!(sum.descriptor().id(), DescriptorId(2));
    }

    #[test]
    fn arithmetic_results_are_clamped() {
        let d = descriptor(1, NumericKind::Integer);
        let a = NumericValue::new(Arc::clone(&d), Scalar::Int(80));
        let b = NumericValue::new(d, Scalar::Int(50));

        let sum = a.add(&b, CoercionPolicy::Strict).unwrap();
        assert_eq!(sum.value(), Scalar::Int(100));
    }

    #[test]
    fn raw_scalar_operands_coerce_and_clamp() {
        let d = descriptor(1, NumericKind::Integer);
        let value = NumericValue::new(Arc::clone(&d), Scalar::Int(30));

        assert_eq!(value.mul_scalar(Scalar::Int(2)).value(), Scalar::Int(60));
        // The product exceeds the descriptor cap of 100 and clamps.
        assert_eq!(value.mul_scalar(Scalar::Int(5)).value(), Scalar::Int(100));
        assert_eq!(
            value.div_scalar(Scalar::Int(3)).unwrap().value(),
            Scalar::Int(10)
        );
        assert!(matches!(
            value.div_scalar(Scalar::Int(0)),
            Err(ValueError::DivisionByZero)
        ));
        assert_eq!(
            value.compare_scalar(Scalar::Float(29.5)).unwrap(),
            core::cmp::Ordering::Greater
        );
    }

    #[test]
    fn division_by_zero_is_reported() {
        let d = descriptor(1, NumericKind::Integer);
        let a = NumericValue::new(Arc::clone(&d), Scalar::Int(10));
        let zero = NumericValue::new(d, Scalar::Int(0));

        assert!(matches!(
            a.div(&zero, CoercionPolicy::Strict),
            Err(ValueError::DivisionByZero)
        ));
    }
}
