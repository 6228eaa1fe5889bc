//! Animatable property values.
//!
//! Values serialize untagged so section specs stay terse:
//!   `0.5` -> Float, `[10, 20]` -> Vec2, `[1, 1, 1, 0.3]` -> ColorRgba

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property-set keyed by property name ("opacity", "x", "scale", ...).
/// Ordered so sampling and teardown are reproducible.
pub type Props = BTreeMap<String, Value>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Vec2,
    ColorRgba,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// Scalar (opacity, x, y, scale, rotation, blur radius, ...)
    Float(f32),

    /// 2D point (pointer-follow position)
    Vec2([f32; 2]),

    /// RGBA color, components in [0,1]
    ColorRgba([f32; 4]),
}

#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_array<const N: usize>(a: [f32; N], b: [f32; N], t: f32) -> [f32; N] {
    let mut out = a;
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = lerp_f32(*x, *y, t);
    }
    out
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Value a host reports for a property that was never written.
    /// Multiplicative properties rest at 1, everything else at 0.
    pub fn rest_for(property: &str) -> Value {
        match property {
            "opacity" | "scale" | "scaleX" | "scaleY" => Value::Float(1.0),
            _ => Value::Float(0.0),
        }
    }

    /// Component-wise interpolation. `t` is not clamped so overshooting
    /// eases carry through. Mismatched kinds fail soft to `self`.
    pub fn lerp(&self, to: &Value, t: f32) -> Value {
        match (self, to) {
            (Value::Float(a), Value::Float(b)) => Value::Float(lerp_f32(*a, *b, t)),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(lerp_array(*a, *b, t)),
            (Value::ColorRgba(a), Value::ColorRgba(b)) => Value::ColorRgba(lerp_array(*a, *b, t)),
            _ => *self,
        }
    }

    /// Component-wise sum, for relative targets ("spin another turn").
    /// Mismatched kinds fail soft to `self`.
    pub fn offset(&self, by: &Value) -> Value {
        match (self, by) {
            (Value::Float(a), Value::Float(b)) => Value::Float(a + b),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2([a[0] + b[0], a[1] + b[1]]),
            (Value::ColorRgba(a), Value::ColorRgba(b)) => {
                Value::ColorRgba([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]])
            }
            _ => *self,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

/// Build a property-set from `(name, value)` pairs.
pub fn props<I, K, V>(pairs: I) -> Props
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
