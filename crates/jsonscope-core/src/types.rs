//! The closed set of value kinds every backend reports.

use std::fmt;

/// Kind of the value currently available on a cursor.
///
/// This tag is the single source of truth for dispatch: there is no other
/// type-detection mechanism. Integers and floats are told apart lexically by
/// text backends (`1` is `Integer`, `1.0` and `1e3` are `Float`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// `true` for `Array` and `Object`.
    pub fn is_container(self) -> bool {
        matches!(self, ValueKind::Array | ValueKind::Object)
    }

    /// `true` for `Integer` and `Float`.
    pub fn is_number(self) -> bool {
        matches!(self, ValueKind::Integer | ValueKind::Float)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}
