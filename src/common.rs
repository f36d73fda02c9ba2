//! Shared building blocks for rendered requests.
//!
//! Tagged values and their wire codec, condition rendering and key builders.

/// Value codec between [`value::Value`] and DynamoDB attribute values.
pub mod codec;

/// Condition rendering for key conditions and filters.
pub mod condition;

/// Key builders for the base table and secondary indexes.
pub mod key;

/// Tagged native values.
pub mod value;

use aws_sdk_dynamodb::types;
use std::collections;

pub(crate) const AND: &str = " AND ";

pub(crate) fn name_placeholder(identifier: &str) -> String {
    format!("#{identifier}")
}

pub(crate) fn value_placeholder(identifier: &str, tag: &str, index: &mut usize) -> String {
    let placeholder = format!(":{identifier}_{tag}{index}");
    *index += 1;
    placeholder
}

fn get_expression(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_names: collections::HashMap<String, String>,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = get_expression(operation.expression, operator, item.expression);
        }
        operation
    }

    pub(crate) fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        if !self.expression_attribute_names.is_empty() {
            names
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_names);
        }
        if !self.expression_attribute_values.is_empty() {
            values
                .get_or_insert_with(collections::HashMap::new)
                .extend(self.expression_attribute_values);
        }
        self.expression
    }
}
