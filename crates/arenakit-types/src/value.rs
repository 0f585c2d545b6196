//! Custom variable values.
//!
//! Arenas carry a free-form key/value map for game-specific settings
//! ("rounds", "friendly_fire", "gravity"). Values are limited to a closed
//! set of primitive kinds so they always survive a trip through a store.
//! Reads are strictly typed: asking for an `Int` where a `Double` is stored
//! yields nothing instead of a coerced number.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a stored [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Int,
    Bool,
    Double,
    Float,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Double => "double",
            Self::Float => "float",
        };
        f.write_str(name)
    }
}

/// A custom variable value.
///
/// Serialized adjacently tagged (`{"kind":"int","value":3}`) so that a
/// `Float` and a `Double` holding the same number stay distinguishable after
/// a round trip through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Int(i32),
    Bool(bool),
    Double(f64),
    Float(f32),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::String(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
            Self::Bool(_) => ValueKind::Bool,
            Self::Double(_) => ValueKind::Double,
            Self::Float(_) => ValueKind::Float,
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

/// A Rust type that maps onto exactly one [`ValueKind`].
///
/// Used for typed reads: `data.get::<i32>("rounds")`.
pub trait VariableType: Sized + Into<Value> {
    /// The kind this type is stored as.
    const KIND: ValueKind;

    /// Extracts `Self` from a value of the matching kind.
    fn from_value(value: &Value) -> Option<Self>;
}

impl VariableType for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

macro_rules! copy_variable_type {
    ($ty:ty, $variant:ident) => {
        impl VariableType for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

copy_variable_type!(i32, Int);
copy_variable_type!(bool, Bool);
copy_variable_type!(f64, Double);
copy_variable_type!(f32, Float);
