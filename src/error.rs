//! Error types, one enum per failure domain.
//!
//! Schema errors are fatal to a load and never leave a partial model behind.
//! Codec, composite and build errors abort a single key or request build and
//! name the attribute at fault. Planning itself never fails.

use crate::schema::operator::OperatorType;

use aws_sdk_dynamodb::{error, operation};
use thiserror::Error;

/// Rejection of a schema description.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SchemaError {
    /// The description could not be parsed.
    #[error("failed to parse schema description: {0}")]
    Parse(String),

    /// The table name is empty.
    #[error("table_name is empty")]
    EmptyTableName,

    /// No hash key was declared.
    #[error("hash_key is missing")]
    MissingHashKey,

    /// The attribute list is empty.
    #[error("attributes is empty")]
    NoAttributes,

    /// An attribute has an empty name.
    #[error("attribute at position {position} has an empty name")]
    EmptyAttributeName {
        /// Zero-based position in the declaration list.
        position: usize,
    },

    /// A name has no identifier left after sanitization.
    #[error("'{name}' is empty after sanitization")]
    EmptyIdentifier {
        /// The raw name.
        name: String,
    },

    /// The same attribute name is declared twice.
    #[error("attribute '{attribute}' is declared more than once")]
    DuplicateAttribute {
        /// The repeated name.
        attribute: String,
    },

    /// The wire type is not one of the supported DynamoDB types.
    #[error("attribute '{attribute}' has unsupported type '{wire_type}'")]
    UnsupportedType {
        /// The attribute name.
        attribute: String,
        /// The declared type.
        wire_type: String,
    },

    /// The subtype hint is not a known subtype.
    #[error("attribute '{attribute}' declares unknown subtype '{subtype}'")]
    UnknownSubtype {
        /// The attribute name.
        attribute: String,
        /// The declared subtype.
        subtype: String,
    },

    /// The subtype hint cannot represent the wire type.
    #[error("attribute '{attribute}' of type {wire_type} declares incompatible subtype '{subtype}'")]
    IncompatibleSubtype {
        /// The attribute name.
        attribute: String,
        /// The declared type.
        wire_type: String,
        /// The declared subtype.
        subtype: String,
    },

    /// A table or index key names an attribute that is not declared.
    #[error("{key} '{attribute}' of {owner} does not reference a declared attribute")]
    UnknownKeyAttribute {
        /// The table or index name.
        owner: String,
        /// Which key (`hash_key`, `range_key`, ...).
        key: &'static str,
        /// The referenced name.
        attribute: String,
    },

    /// A key attribute has a type DynamoDB cannot key on.
    #[error("{key} '{attribute}' of {owner} has type {wire_type}, which cannot be used as a key")]
    InvalidKeyType {
        /// The table or index name.
        owner: String,
        /// Which key (`hash_key`, `range_key`, ...).
        key: &'static str,
        /// The attribute name.
        attribute: String,
        /// The attribute type.
        wire_type: String,
    },

    /// An index has an empty name.
    #[error("secondary index at position {position} has an empty name")]
    EmptyIndexName {
        /// Zero-based position in the declaration list.
        position: usize,
    },

    /// The same index name is declared twice.
    #[error("secondary index '{index}' is declared more than once")]
    DuplicateIndex {
        /// The repeated name.
        index: String,
    },

    /// Both or neither of the simple and composite forms of a key were set.
    #[error("secondary index '{index}' must set exactly one of {key} and {key}_parts")]
    AmbiguousKey {
        /// The index name.
        index: String,
        /// `hash_key` or `range_key`.
        key: &'static str,
    },

    /// A range key was declared in both forms.
    #[error("secondary index '{index}' sets both range_key and range_key_parts")]
    DuplicateRangeKey {
        /// The index name.
        index: String,
    },

    /// A constant composite segment is empty or contains the separator.
    #[error("secondary index '{index}' has invalid constant key part '{value}'")]
    InvalidConstantPart {
        /// The index name.
        index: String,
        /// The literal.
        value: String,
    },

    /// A composite key made only of constants.
    #[error("secondary index '{index}' composite {key} has no attribute parts")]
    ConstantCompositeKey {
        /// The index name.
        index: String,
        /// `hash_key` or `range_key`.
        key: &'static str,
    },

    /// The projection type is not ALL, KEYS_ONLY or INCLUDE.
    #[error("secondary index '{index}' has unknown projection type '{projection}'")]
    UnknownProjection {
        /// The index name.
        index: String,
        /// The declared projection type.
        projection: String,
    },

    /// An INCLUDE projection without non-key attributes.
    #[error("secondary index '{index}' uses INCLUDE projection without non_key_attributes")]
    EmptyInclude {
        /// The index name.
        index: String,
    },

    /// Non-key attributes on an ALL or KEYS_ONLY projection.
    #[error("secondary index '{index}' with {projection} projection must not list non_key_attributes")]
    UnexpectedNonKeyAttributes {
        /// The index name.
        index: String,
        /// The declared projection type.
        projection: String,
    },

    /// An INCLUDE entry that is not a declared attribute.
    #[error("secondary index '{index}' includes undeclared attribute '{attribute}'")]
    UnknownNonKeyAttribute {
        /// The index name.
        index: String,
        /// The included name.
        attribute: String,
    },

    /// Two distinct names that sanitize to the same identifier.
    #[error("'{first}' and '{second}' both sanitize to identifier '{identifier}'")]
    IdentifierCollision {
        /// The earlier raw name.
        first: String,
        /// The later raw name.
        second: String,
        /// The shared identifier.
        identifier: String,
    },
}

/// Failure of the value codec.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CodecError {
    /// NaN and infinities have no DynamoDB number representation.
    #[error("number {0} is not finite")]
    NonFiniteNumber(f64),

    /// DynamoDB rejects empty sets.
    #[error("{0} must not be empty")]
    EmptySet(&'static str),

    /// A wire number that does not parse.
    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    /// A wire variant this codec does not know.
    #[error("unsupported attribute value")]
    Unsupported,
}

/// Failure of the composite key resolver.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CompositeError {
    /// An attribute part without a supplied value.
    #[error("no value supplied for composite key part '{attribute}'")]
    MissingValue {
        /// The attribute name.
        attribute: String,
    },

    /// A value without a scalar string form.
    #[error("composite key part '{attribute}' cannot be built from a {kind} value")]
    UnsupportedValue {
        /// The attribute name.
        attribute: String,
        /// The kind of the supplied value.
        kind: &'static str,
    },

    /// A value whose string form contains the separator.
    #[error("composite key part '{attribute}' contains the separator '{separator}'")]
    SeparatorInValue {
        /// The attribute name.
        attribute: String,
        /// The separator.
        separator: char,
    },

    /// A key with the wrong number of segments.
    #[error("composite key has {found} segments, expected {expected}")]
    PartCountMismatch {
        /// Declared parts.
        expected: usize,
        /// Segments found.
        found: usize,
    },

    /// A constant segment that does not match its literal.
    #[error("composite key segment '{found}' does not match constant '{expected}'")]
    ConstantMismatch {
        /// The declared literal.
        expected: String,
        /// The segment found.
        found: String,
    },
}

/// Failure to render a plan or key into request form.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BuildError {
    /// A supplied value could not be encoded.
    #[error("failed to encode value for '{attribute}': {source}")]
    Encode {
        /// The attribute whose value failed.
        attribute: String,
        /// The codec failure.
        source: CodecError,
    },

    /// A condition carries the wrong number of values for its operator.
    #[error("'{operator}' on '{attribute}' cannot take {found} value(s)")]
    Arity {
        /// The attribute the condition applies to.
        attribute: String,
        /// The operator.
        operator: OperatorType,
        /// The number of values supplied.
        found: usize,
    },

    /// A composite key could not be resolved.
    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// Failure to marshal a record into an item.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The record could not be serialized.
    #[error(transparent)]
    Serialize(#[from] serde_dynamo::Error),

    /// The record lacks a base table key attribute.
    #[error("record is missing key attribute '{attribute}'")]
    MissingKey {
        /// The key attribute.
        attribute: String,
    },

    /// A composite key part could not be decoded.
    #[error("failed to decode '{attribute}': {source}")]
    Codec {
        /// The attribute whose value failed.
        attribute: String,
        /// The codec failure.
        source: CodecError,
    },

    /// A composite key could not be resolved.
    #[error(transparent)]
    Composite(#[from] CompositeError),
}

/// Failure of an executed read.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The query call failed.
    #[error(transparent)]
    Query(#[from] error::SdkError<operation::query::QueryError>),

    /// The scan call failed.
    #[error(transparent)]
    Scan(#[from] error::SdkError<operation::scan::ScanError>),
}
