//! Query planning: which index a query runs against, and how its predicates
//! split into a key condition and filters.

/// Query and scan builders.
pub mod builder;

/// Caller-supplied predicates and the reasons they get dropped.
pub mod predicate;

/// Index selection and rendering.
pub mod selector;
