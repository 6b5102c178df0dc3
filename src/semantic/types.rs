//! The Mica type lattice.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fully resolved Mica type.
///
/// Serialization is part of the compiled package metadata format
/// (`.mpkg.json`), so the wire names are stable lowercase tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Real,
    Bool,
    #[serde(rename = "string")]
    Str,
    /// The type of a value-less `return`.
    Unit,
    #[serde(rename = "fn")]
    Func {
        params: Vec<Type>,
        result: Box<Type>,
    },
}

impl Type {
    /// Resolve a type annotation to a builtin scalar type.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "Int" => Some(Type::Int),
            "Real" => Some(Type::Real),
            "Bool" => Some(Type::Bool),
            "String" => Some(Type::Str),
            "Unit" => Some(Type::Unit),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Real)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => f.write_str("Int"),
            Type::Real => f.write_str("Real"),
            Type::Bool => f.write_str("Bool"),
            Type::Str => f.write_str("String"),
            Type::Unit => f.write_str("Unit"),
            Type::Func { params, result } => {
                f.write_str("fn(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ") -> {result}")
            }
        }
    }
}
