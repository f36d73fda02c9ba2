use crate::{common::value::Value, schema::operator::OperatorType};

use std::fmt;

/// A caller-supplied condition on one attribute.
///
/// ```rust
/// use dynamodb_gen::{plan::predicate::Predicate, schema::operator::OperatorType};
///
/// let predicate = Predicate::new("status", OperatorType::Eq, vec!["active".into()]);
/// assert_eq!(predicate.to_string(), "status = active");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    /// Attribute name as declared in the schema.
    pub attribute: String,
    /// Comparison operator.
    pub operator: OperatorType,
    /// Operands; their count must fit the operator.
    pub values: Vec<Value>,
}

impl Predicate {
    /// Create a predicate.
    pub fn new(attribute: impl Into<String>, operator: OperatorType, values: Vec<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            values,
        }
    }
}

pub(crate) fn fmt_condition(
    f: &mut fmt::Formatter<'_>,
    attribute: &str,
    operator: OperatorType,
    values: &[Value],
) -> fmt::Result {
    match (operator, values) {
        (OperatorType::Between, [low, high]) => write!(f, "{attribute} BETWEEN {low} AND {high}"),
        (_, []) => write!(f, "{attribute} {operator}"),
        (OperatorType::In | OperatorType::NotIn, values) => {
            let values: Vec<_> = values.iter().map(Value::to_string).collect();
            write!(f, "{attribute} {operator} ({})", values.join(", "))
        }
        (_, values) => {
            let values: Vec<_> = values.iter().map(Value::to_string).collect();
            write!(f, "{attribute} {operator} {}", values.join(", "))
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_condition(f, &self.attribute, self.operator, &self.values)
    }
}

/// Why a predicate was left out of a plan.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DropReason {
    /// The attribute is not declared.
    UnknownAttribute,
    /// The operator is not legal for the attribute's type.
    OperatorNotAllowed,
    /// The number of values does not fit the operator.
    Arity,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnknownAttribute => "unknown attribute",
            Self::OperatorNotAllowed => "operator not allowed for the attribute type",
            Self::Arity => "wrong number of values for the operator",
        };
        f.write_str(reason)
    }
}

/// A predicate the planner could not use, kept for the caller to inspect.
#[derive(Clone, Debug, PartialEq)]
pub struct DroppedPredicate {
    /// The predicate as supplied.
    pub predicate: Predicate,
    /// Why it was dropped.
    pub reason: DropReason,
}

impl fmt::Display for DroppedPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.predicate, self.reason)
    }
}
