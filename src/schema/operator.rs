use crate::schema::attribute::AttributeType;

use std::fmt;

/// Comparison operator applicable to an attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OperatorType {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `BETWEEN a AND b`, inclusive.
    Between,
    /// `contains(path, operand)`.
    Contains,
    /// `NOT contains(path, operand)`.
    NotContains,
    /// `begins_with(path, prefix)`.
    BeginsWith,
    /// `IN (a, b, ...)`.
    In,
    /// `NOT (path IN (a, b, ...))`.
    NotIn,
    /// `attribute_exists(path)`.
    Exists,
    /// `attribute_not_exists(path)`.
    NotExists,
}

/// Every operator, in declaration order.
pub const ALL_OPERATORS: [OperatorType; 14] = [
    OperatorType::Eq,
    OperatorType::Ne,
    OperatorType::Gt,
    OperatorType::Lt,
    OperatorType::Gte,
    OperatorType::Lte,
    OperatorType::Between,
    OperatorType::Contains,
    OperatorType::NotContains,
    OperatorType::BeginsWith,
    OperatorType::In,
    OperatorType::NotIn,
    OperatorType::Exists,
    OperatorType::NotExists,
];

impl OperatorType {
    /// Whether the operator can narrow a range key in a key condition.
    pub const fn is_range_capable(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Gt | Self::Lt | Self::Gte | Self::Lte | Self::Between
        )
    }

    /// Whether `count` operand values fit this operator.
    pub const fn accepts_arity(self, count: usize) -> bool {
        match self {
            Self::Exists | Self::NotExists => count == 0,
            Self::Between => count == 2,
            Self::In | Self::NotIn => count >= 1,
            _ => count == 1,
        }
    }

    /// Short lowercase tag, used in value placeholders.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::BeginsWith => "begins_with",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl fmt::Display for OperatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Between => "BETWEEN",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::BeginsWith => "BEGINS_WITH",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT_EXISTS",
        };
        f.write_str(symbol)
    }
}

/// Immutable set of operators.
///
/// ```rust
/// use dynamodb_gen::schema::{attribute::AttributeType, operator::{self, OperatorType}};
///
/// let allowed = operator::allowed_operators(AttributeType::Bool);
/// assert!(allowed.contains(OperatorType::Eq));
/// assert!(!allowed.contains(OperatorType::Gt));
/// ```
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct OperatorSet(u16);

impl OperatorSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Set holding exactly `operators`.
    pub const fn of(operators: &[OperatorType]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < operators.len() {
            bits |= operators[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Union of two sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether `operator` is in the set.
    pub const fn contains(self, operator: OperatorType) -> bool {
        self.0 & operator.bit() != 0
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of operators in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Operators in the set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = OperatorType> {
        ALL_OPERATORS
            .into_iter()
            .filter(move |operator| self.contains(*operator))
    }
}

impl fmt::Debug for OperatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

const EXISTENCE: OperatorSet = OperatorSet::of(&[OperatorType::Exists, OperatorType::NotExists]);

const EQUALITY: OperatorSet = EXISTENCE.union(OperatorSet::of(&[
    OperatorType::Eq,
    OperatorType::Ne,
]));

const ORDERED: OperatorSet = EQUALITY.union(OperatorSet::of(&[
    OperatorType::Gt,
    OperatorType::Lt,
    OperatorType::Gte,
    OperatorType::Lte,
    OperatorType::Between,
    OperatorType::In,
    OperatorType::NotIn,
]));

const TEXT: OperatorSet = ORDERED.union(OperatorSet::of(&[
    OperatorType::Contains,
    OperatorType::NotContains,
    OperatorType::BeginsWith,
]));

const MEMBERSHIP: OperatorSet = EXISTENCE.union(OperatorSet::of(&[
    OperatorType::Contains,
    OperatorType::NotContains,
]));

/// Operators allowed on an unrecognized wire type.
pub const FALLBACK: OperatorSet = EQUALITY;

/// Operators that are semantically legal for an attribute of type `attribute_type`.
///
/// Strings and numbers are ordinal; strings also support substring checks.
/// Sets are unordered, so they only support membership. Containers and nulls
/// only support existence.
pub const fn allowed_operators(attribute_type: AttributeType) -> OperatorSet {
    match attribute_type {
        AttributeType::String => TEXT,
        AttributeType::Number | AttributeType::Binary => ORDERED,
        AttributeType::Bool => EQUALITY,
        AttributeType::StringSet | AttributeType::NumberSet | AttributeType::BinarySet => {
            MEMBERSHIP
        }
        AttributeType::List | AttributeType::Map | AttributeType::Null => EXISTENCE,
    }
}

/// Total form of [`allowed_operators`] keyed by the wire type string.
///
/// Unknown types degrade to [`FALLBACK`] instead of failing.
pub fn allowed_operators_for_wire(wire_type: &str) -> OperatorSet {
    match AttributeType::from_wire(wire_type) {
        Some(attribute_type) => allowed_operators(attribute_type),
        None => FALLBACK,
    }
}
