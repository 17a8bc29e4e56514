//! Runtime values produced by executing a snippet.

use std::fmt;

/// A value returned by the host evaluator, tagged with its runtime type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The snippet returned nothing or an explicit null.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// Any other host type (arrays, objects, resources, ...).
    Other {
        /// Host-reported type name, such as `array` or `object`.
        type_name: String,
        /// Host-rendered representation of the value.
        repr: String,
    },
}

impl Value {
    /// Returns the runtime type tag of the value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Other { .. } => ValueKind::Other,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            // Debug keeps the fractional part, so `2.0` does not read as an integer.
            Self::Float(value) => write!(f, "{value:?}"),
            Self::String(value) => f.write_str(value),
            Self::Other { repr, .. } => f.write_str(repr),
        }
    }
}

/// Runtime type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Null.
    Null,
    /// Boolean.
    Boolean,
    /// Integer.
    Integer,
    /// Floating point.
    Float,
    /// String.
    String,
    /// Anything else.
    Other,
}

impl ValueKind {
    /// Returns the lower-case name of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Value::Null, ValueKind::Null)]
    #[case(Value::Boolean(true), ValueKind::Boolean)]
    #[case(Value::Integer(2), ValueKind::Integer)]
    #[case(Value::Float(0.5), ValueKind::Float)]
    #[case(Value::String("foobar".into()), ValueKind::String)]
    #[case(
        Value::Other { type_name: "array".into(), repr: "[1,2]".into() },
        ValueKind::Other
    )]
    fn kind_matches_variant(#[case] value: Value, #[case] expected: ValueKind) {
        assert_eq!(value.kind(), expected);
    }

    #[rstest]
    #[case(Value::Float(2.0), "2.0")]
    #[case(Value::Integer(2), "2")]
    #[case(Value::Boolean(false), "false")]
    #[case(Value::String("foobar".into()), "foobar")]
    #[case(Value::Null, "null")]
    fn display_renders_plain_values(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }
}
