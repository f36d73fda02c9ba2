//! Rendered read requests and their execution.
//!
//! A [`Request`] is what the builders in [`crate::plan::builder`] produce: a
//! Query when the planner found a key, a Scan otherwise. Sending it follows
//! every page and aggregates the results.

/// Settings and output shared by Query and Scan.
pub mod common;

/// Query requests.
pub mod query;

/// Scan requests.
pub mod scan;

use crate::error::ReadError;

use aws_sdk_dynamodb::{Client, types};

/// A rendered read request.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// Query against the table or an index.
    Query(query::QueryInput),
    /// Scan of the table or an index.
    Scan(scan::ScanInput),
}

impl Request {
    /// Settings shared by both request kinds.
    pub fn read_input(&self) -> &common::ReadInput {
        match self {
            Self::Query(query) => &query.read_input,
            Self::Scan(scan) => &scan.read_input,
        }
    }

    /// Key condition expression; `None` for scans.
    pub fn key_condition_expression(&self) -> Option<&str> {
        match self {
            Self::Query(query) => Some(&query.key_condition_expression),
            Self::Scan(_) => None,
        }
    }

    /// Resume reading after `key`, typically the last evaluated key of a previous read.
    pub fn starting_after(
        mut self,
        key: std::collections::HashMap<String, types::AttributeValue>,
    ) -> Self {
        let read_input = match &mut self {
            Self::Query(query) => &mut query.read_input,
            Self::Scan(scan) => &mut scan.read_input,
        };
        read_input.exclusive_start_key = Some(key);
        self
    }

    /// Execute the request.
    pub async fn send(self, client: &Client) -> Result<common::ReadOutput, ReadError> {
        match self {
            Self::Query(query) => query.send(client).await,
            Self::Scan(scan) => scan.send(client).await,
        }
    }
}
