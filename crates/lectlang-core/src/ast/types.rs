//! The closed set of value types.

use std::fmt;

/// A value type. Every expression is either a number or a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// 32-bit signed integer.
    Num,
    /// Boolean.
    Bool,
}

impl Type {
    /// Keyword used for this type in source annotations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Num => "num",
            Type::Bool => "bool",
        }
    }

    /// Parse a type annotation keyword.
    pub fn from_keyword(keyword: &str) -> Option<Type> {
        match keyword {
            "num" => Some(Type::Num),
            "bool" => Some(Type::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
