//! Tagged scalar values shared by the whole stat system.
//!
//! `Scalar` is the sum type underneath every stat value: a number that is
//! either floating-point or integer, with the tag carried alongside the
//! payload. Mixed-kind operations coerce the right operand to the left
//! operand's kind; whether a mixed operation is allowed at all is decided
//! by the caller ([`CoercionPolicy`](super::CoercionPolicy)), not here.

use core::cmp::Ordering;

use super::ValueError;

/// Numeric representation of a stat value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Float,
    Integer,
}

/// Semantic kind of a stat value: a plain quantity or a percentage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Absolute,
    Percent,
}

/// A scalar that is either a float or an integer.
///
/// Integer arithmetic saturates instead of wrapping so a malformed
/// definition cannot corrupt point accounting through overflow.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Scalar {
    Float(f64),
    Int(i64),
}

impl Scalar {
    /// The numeric kind carried by this scalar's tag.
    pub fn kind(&self) -> NumericKind {
        match self {
            Scalar::Float(_) => NumericKind::Float,
            Scalar::Int(_) => NumericKind::Integer,
        }
    }

    /// Zero of the given kind.
    pub fn zero(kind: NumericKind) -> Self {
        match kind {
            NumericKind::Float => Scalar::Float(0.0),
            NumericKind::Integer => Scalar::Int(0),
        }
    }

    /// Converts this scalar to the given kind.
    ///
    /// Float→integer truncates toward zero, matching `as i64`.
    pub fn coerce(self, kind: NumericKind) -> Self {
        match (self, kind) {
            (Scalar::Float(v), NumericKind::Integer) => Scalar::Int(v as i64),
            (Scalar::Int(v), NumericKind::Float) => Scalar::Float(v as f64),
            (other, _) => other,
        }
    }

    /// Reads the value as `f64` regardless of tag.
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Float(v) => v,
            Scalar::Int(v) => v as f64,
        }
    }

    /// Reads the value as `i64`, truncating floats toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            Scalar::Float(v) => v as i64,
            Scalar::Int(v) => v,
        }
    }

    /// True when the payload is exactly zero.
    pub fn is_zero(self) -> bool {
        match self {
            Scalar::Float(v) => v == 0.0,
            Scalar::Int(v) => v == 0,
        }
    }

    /// True when the payload is negative.
    pub fn is_negative(self) -> bool {
        match self {
            Scalar::Float(v) => v < 0.0,
            Scalar::Int(v) => v < 0,
        }
    }

    /// `self + rhs`, with `rhs` coerced to `self`'s kind.
    pub fn add(self, rhs: Scalar) -> Scalar {
        match self {
            Scalar::Float(a) => Scalar::Float(a + rhs.as_f64()),
            Scalar::Int(a) => Scalar::Int(a.saturating_add(rhs.coerce(self.kind()).as_i64())),
        }
    }

    /// `self - rhs`, with `rhs` coerced to `self`'s kind.
    pub fn sub(self, rhs: Scalar) -> Scalar {
        match self {
            Scalar::Float(a) => Scalar::Float(a - rhs.as_f64()),
            Scalar::Int(a) => Scalar::Int(a.saturating_sub(rhs.coerce(self.kind()).as_i64())),
        }
    }

    /// `self × rhs`, with `rhs` coerced to `self`'s kind.
    pub fn mul(self, rhs: Scalar) -> Scalar {
        match self {
            Scalar::Float(a) => Scalar::Float(a * rhs.as_f64()),
            Scalar::Int(a) => Scalar::Int(a.saturating_mul(rhs.coerce(self.kind()).as_i64())),
        }
    }

    /// `self ÷ rhs`, with `rhs` coerced to `self`'s kind.
    ///
    /// Division by zero is a defined failure, never a panic or an IEEE
    /// infinity leaking into stat values.
    pub fn div(self, rhs: Scalar) -> Result<Scalar, ValueError> {
        if rhs.is_zero() {
            return Err(ValueError::DivisionByZero);
        }
        Ok(match self {
            Scalar::Float(a) => Scalar::Float(a / rhs.as_f64()),
            Scalar::Int(a) => Scalar::Int(a / rhs.coerce(self.kind()).as_i64()),
        })
    }

    /// `self × percent / 100`, computed in `f64` and coerced back to
    /// `self`'s kind. Used by percent-based stat combination.
    pub fn mul_percent(self, percent: Scalar) -> Scalar {
        let result = self.as_f64() * percent.as_f64() / 100.0;
        Scalar::Float(result).coerce(self.kind())
    }

    /// `self × factor` where `factor` is a whole number of levels.
    pub fn mul_levels(self, levels: u32) -> Scalar {
        self.mul(match self {
            Scalar::Float(_) => Scalar::Float(f64::from(levels)),
            Scalar::Int(_) => Scalar::Int(i64::from(levels)),
        })
    }

    /// Compares two scalars after coercing both to a common representation.
    ///
    /// Returns an error for NaN floats, which admit no ordering.
    pub fn compare(self, rhs: Scalar) -> Result<Ordering, ValueError> {
        match (self, rhs) {
            (Scalar::Int(a), Scalar::Int(b)) => Ok(a.cmp(&b)),
            _ => self
                .as_f64()
                .partial_cmp(&rhs.as_f64())
                .ok_or(ValueError::Incomparable),
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}
