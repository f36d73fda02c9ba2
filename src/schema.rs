//! Table schema model and its validator.
//!
//! A [`table::TableSchema`] is built once from a [`raw::RawSchema`] and never
//! changes afterwards; planners, key builders and marshaling helpers borrow it.

/// Attribute wire types and subtype hints.
pub mod attribute;

/// Composite key parts, building and splitting.
pub mod composite;

/// Secondary index declarations.
pub mod index;

/// Operators and which attribute types allow them.
pub mod operator;

/// Serde form of a schema description.
pub mod raw;

/// Identifier sanitization.
pub mod sanitize;

/// Validated table schema.
pub mod table;
