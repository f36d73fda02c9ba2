use crate::{
    common::codec::ValueCodec,
    marshal::{self, Extraction},
    schema::table::TableSchema,
};

use aws_sdk_dynamodb::types;
use std::collections;

/// Settings shared by Query and Scan requests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadInput {
    /// Strongly consistent read when `true`; passed through as given.
    pub consistent_read: Option<bool>,
    /// Where to resume a previous read.
    pub exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Name placeholders.
    pub expression_attribute_names: Option<collections::HashMap<String, String>>,
    /// Value placeholders.
    pub expression_attribute_values: Option<collections::HashMap<String, types::AttributeValue>>,
    /// Filter expression.
    pub filter_expression: Option<String>,
    /// Secondary index to read.
    pub index_name: Option<String>,
    /// Maximum number of items evaluated per page.
    pub limit: Option<i32>,
    /// Consumed capacity detail to report.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Table to read.
    pub table_name: String,
}

/// Items and counters of a read, aggregated over every page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadOutput {
    /// Items, in the order returned.
    pub items: Vec<collections::HashMap<String, types::AttributeValue>>,
    /// Number of items returned.
    pub count: i32,
    /// Number of items evaluated before filtering.
    pub scanned_count: i32,
    /// Consumed capacity, summed over pages when reported.
    pub consumed_capacity: Option<types::ConsumedCapacity>,
}

impl ReadOutput {
    /// Extract the declared fields of every item.
    pub fn extract<C: ValueCodec + ?Sized>(
        &self,
        schema: &TableSchema,
        codec: &C,
    ) -> Vec<Extraction> {
        self.items
            .iter()
            .map(|item| marshal::extract(schema, codec, item))
            .collect()
    }
}

/// get paginated output
#[macro_export]
macro_rules! get_paginated_output {
    ($paginator:expr) => {{
        let mut outputs = Vec::new();
        while let Some(page) = $paginator.next().await {
            outputs.push(page?);
        }
        let (items, count, scanned_count, capacities) = outputs.into_iter().fold(
            (Vec::new(), 0, 0, Vec::new()),
            |(mut items, count, scanned, mut caps), output| {
                if let Some(other_items) = output.items {
                    items.extend(other_items);
                }
                if let Some(cap) = output.consumed_capacity {
                    caps.push(cap);
                }
                (
                    items,
                    count + output.count,
                    scanned + output.scanned_count,
                    caps,
                )
            },
        );
        let output = $crate::read::common::ReadOutput {
            items,
            count,
            scanned_count,
            consumed_capacity: $crate::read::common::aggregate_capacity(capacities),
        };
        Ok(output)
    }};
}

/// Sum the consumed capacity of every page; `None` when no page reported any.
#[doc(hidden)]
pub fn aggregate_capacity(
    capacities: Vec<types::ConsumedCapacity>,
) -> Option<types::ConsumedCapacity> {
    if capacities.is_empty() {
        return None;
    }
    let (cap, read, write, table) = capacities.into_iter().fold(
        (0.0, 0.0, 0.0, None),
        |(cap, read, write, table), capacity| {
            (
                cap + capacity.capacity_units.unwrap_or(0.0),
                read + capacity.read_capacity_units.unwrap_or(0.0),
                write + capacity.write_capacity_units.unwrap_or(0.0),
                table.or(capacity.table_name),
            )
        },
    );
    let capacity = types::ConsumedCapacity::builder()
        .set_table_name(table)
        .set_capacity_units(Some(cap))
        .set_read_capacity_units(Some(read))
        .set_write_capacity_units(Some(write))
        .build();
    Some(capacity)
}

/// apply common read settings to a builder
#[macro_export]
macro_rules! apply_read_input {
    ($builder:expr, $read_input:expr) => {
        $builder
            .set_consistent_read($read_input.consistent_read)
            .set_exclusive_start_key($read_input.exclusive_start_key)
            .set_expression_attribute_names($read_input.expression_attribute_names)
            .set_expression_attribute_values($read_input.expression_attribute_values)
            .set_filter_expression($read_input.filter_expression)
            .set_index_name($read_input.index_name)
            .set_limit($read_input.limit)
            .set_return_consumed_capacity($read_input.return_consumed_capacity)
            .table_name($read_input.table_name)
    };
}
