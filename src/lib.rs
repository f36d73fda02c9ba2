#![deny(missing_docs)]

//! # DynamoDB Gen
//!
//! Schema-driven core of a generated DynamoDB data-access layer.
//!
//! ## Overview
//!
//! Describe a table once, as JSON or as a [`schema::raw::RawSchema`], and this library:
//! - Validates it, with one typed error naming the attribute or index at fault
//! - Derives which comparison operators every attribute type allows
//! - Resolves composite keys (attribute values and literals joined by `#`)
//! - Plans queries: picks the base table or the secondary index a set of
//!   predicates can use, splits them into a key condition and filters, and
//!   reports the predicates it had to drop instead of failing
//! - Renders the plan into DynamoDB expressions and runs it, following every page
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_gen::{common::codec::DynamoCodec, plan::builder::QueryBuilder, schema::table::TableSchema};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::from_conf(aws_sdk_dynamodb::config::Config::builder().build());
//! let schema = TableSchema::from_json_str(r#"{
//!     "table_name": "posts",
//!     "hash_key": "post_id",
//!     "attributes": [
//!         {"name": "post_id", "type": "S"},
//!         {"name": "category", "type": "S"},
//!         {"name": "is_published", "type": "N", "subtype": "u8"},
//!         {"name": "created_at", "type": "N", "subtype": "i64"},
//!         {"name": "tags", "type": "SS"}
//!     ],
//!     "secondary_indexes": [{
//!         "name": "by_category",
//!         "hash_key_parts": [{"value": "category"}, {"value": "is_published"}],
//!         "range_key": "created_at"
//!     }]
//! }"#)?;
//!
//! // The planner picks `by_category` and resolves its key to "tech#1"
//! let builder = QueryBuilder::new(&schema)
//!     .eq("category", "tech")
//!     .eq("is_published", 1)
//!     .gt("created_at", 1_700_000_000_i64)
//!     .contains("tags", "rust");
//! let plan = builder.plan();
//! assert!(plan.dropped_predicates.is_empty());
//!
//! let output = builder.build(&DynamoCodec)?.send(&client).await?;
//! for extraction in output.extract(&schema, &DynamoCodec) {
//!     println!("{:?}", extraction.fields);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@schema`] - Schema model, validator, operator table and composite keys
//! - [`mod@plan`] - Query planner and builders
//! - [`mod@common`] - Values, value codec, condition rendering and key builders
//! - [`mod@read`] - Query and Scan execution
//! - [`mod@marshal`] - Records to items and back
//! - [`mod@error`] - Error types

/// Values, codec, condition rendering and key builders.
pub mod common;

/// Error types.
pub mod error;

/// Conversion between records and items.
pub mod marshal;

/// Query planning and builders.
pub mod plan;

/// Rendered read requests and their execution.
pub mod read;

/// Schema model and validation.
pub mod schema;

#[cfg(test)]
mod fixtures;
