use indexmap::IndexMap;
use std::fmt;

/// A DynamoDB number, kept as the representation it was supplied in.
///
/// Integers use [`Number::Int`] whenever they fit an `i64`; only larger
/// unsigned values use [`Number::UInt`], so equal integers always compare equal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// Integral number.
    Int(i64),
    /// Unsigned integral number above `i64::MAX`.
    UInt(u64),
    /// Floating point number.
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::UInt(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! integer_conversions {
    ($($integer:ty),+) => {
        $(
            impl From<$integer> for Number {
                fn from(value: $integer) -> Self {
                    Self::Int(value.into())
                }
            }

            impl From<$integer> for Value {
                fn from(value: $integer) -> Self {
                    Self::Number(value.into())
                }
            }
        )+
    };
}

integer_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => Self::Int(value),
            Err(_) => Self::UInt(value),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        // widen through the shortest decimal form so 0.1f32 stays 0.1
        Self::Float(value.to_string().parse().unwrap_or(f64::from(value)))
    }
}

/// A native value supplied to the planner, the key builders or the codec.
///
/// The variant is decided once, where the caller hands the value over, so that
/// nothing downstream has to inspect payloads to tell a string set from a
/// number set.
///
/// ```rust
/// use dynamodb_gen::common::value::{Number, Value};
///
/// let name = Value::from("tech");
/// let count = Value::from(42);
/// let tags = Value::string_set(["a", "b"]);
/// assert_eq!(count, Value::Number(Number::Int(42)));
/// assert_eq!(name.kind(), "string");
/// assert_eq!(tags.kind(), "string set");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(Number),
    /// UTF-8 string.
    String(String),
    /// Raw bytes.
    Binary(Vec<u8>),
    /// Set of strings.
    StringSet(Vec<String>),
    /// Set of numbers.
    NumberSet(Vec<Number>),
    /// Set of byte strings.
    BinarySet(Vec<Vec<u8>>),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Map of values, in insertion order.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Build a string set.
    pub fn string_set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringSet(values.into_iter().map(Into::into).collect())
    }

    /// Build a number set.
    pub fn number_set<I, N>(values: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Number>,
    {
        Self::NumberSet(values.into_iter().map(Into::into).collect())
    }

    /// Human readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::StringSet(_) => "string set",
            Self::NumberSet(_) => "number set",
            Self::BinarySet(_) => "binary set",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// String form of a scalar value, as written into composite keys.
    ///
    /// Only strings, numbers and booleans have one.
    pub fn as_key_segment(&self) -> Option<String> {
        match self {
            Self::String(value) => Some(value.clone()),
            Self::Number(value) => Some(value.to_string()),
            Self::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Binary(value) => write!(f, "<{} bytes>", value.len()),
            Self::StringSet(values) => write!(f, "{{{}}}", values.join(", ")),
            Self::NumberSet(values) => {
                let values: Vec<_> = values.iter().map(ToString::to_string).collect();
                write!(f, "{{{}}}", values.join(", "))
            }
            Self::BinarySet(values) => write!(f, "<{} binary values>", values.len()),
            Self::List(values) => {
                let values: Vec<_> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", values.join(", "))
            }
            Self::Map(map) => {
                let entries: Vec<_> = map
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(value.into())
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}
