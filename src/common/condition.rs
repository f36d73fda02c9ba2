use crate::{
    common::{self, codec::ValueCodec, value::Value},
    error::BuildError,
    schema::operator::OperatorType,
};

use aws_sdk_dynamodb::types;
use std::collections;

/// One condition ready for rendering: an attribute, an operator and its operands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Term<'a> {
    pub(crate) attribute: &'a str,
    pub(crate) identifier: &'a str,
    pub(crate) operator: OperatorType,
    pub(crate) values: &'a [Value],
}

impl Term<'_> {
    fn encode<C: ValueCodec + ?Sized>(
        &self,
        codec: &C,
        value: &Value,
        index: &mut usize,
        expression_attribute_values: &mut collections::HashMap<String, types::AttributeValue>,
    ) -> Result<String, BuildError> {
        let value = codec.encode(value).map_err(|source| BuildError::Encode {
            attribute: self.attribute.to_string(),
            source,
        })?;
        let placeholder = common::value_placeholder(self.identifier, self.operator.tag(), index);
        expression_attribute_values.insert(placeholder.clone(), value);
        Ok(placeholder)
    }

    pub(crate) fn get_expression<C: ValueCodec + ?Sized>(
        &self,
        codec: &C,
        index: &mut usize,
    ) -> Result<common::ExpressionInput, BuildError> {
        if !self.operator.accepts_arity(self.values.len()) {
            return Err(BuildError::Arity {
                attribute: self.attribute.to_string(),
                operator: self.operator,
                found: self.values.len(),
            });
        }
        let key_placeholder = common::name_placeholder(self.identifier);
        let mut expression_attribute_values = collections::HashMap::new();
        let mut placeholders = Vec::with_capacity(self.values.len());
        for value in self.values {
            let placeholder = self.encode(codec, value, index, &mut expression_attribute_values)?;
            placeholders.push(placeholder);
        }
        let expression = match (self.operator, placeholders.as_slice()) {
            (OperatorType::Exists, _) => format!("attribute_exists({key_placeholder})"),
            (OperatorType::NotExists, _) => format!("attribute_not_exists({key_placeholder})"),
            (OperatorType::Between, [low, high]) => {
                format!("{key_placeholder} BETWEEN {low} AND {high}")
            }
            (OperatorType::Contains, [value]) => format!("contains({key_placeholder}, {value})"),
            (OperatorType::NotContains, [value]) => {
                format!("NOT contains({key_placeholder}, {value})")
            }
            (OperatorType::BeginsWith, [value]) => {
                format!("begins_with({key_placeholder}, {value})")
            }
            (OperatorType::In, values) => format!("{key_placeholder} IN ({})", values.join(", ")),
            (OperatorType::NotIn, values) => {
                format!("NOT ({key_placeholder} IN ({}))", values.join(", "))
            }
            (operator, values) => format!("{key_placeholder} {operator} {}", values.join("")),
        };
        let operation = common::ExpressionInput {
            expression,
            expression_attribute_names: collections::HashMap::from([(
                key_placeholder,
                self.attribute.to_string(),
            )]),
            expression_attribute_values,
        };
        Ok(operation)
    }

    /// Render `terms` joined by `AND`, sharing one placeholder counter.
    pub(crate) fn get_expression_operation<C: ValueCodec + ?Sized>(
        terms: &[Self],
        codec: &C,
        index: &mut usize,
    ) -> Result<common::ExpressionInput, BuildError> {
        let mut operations = Vec::with_capacity(terms.len());
        for term in terms {
            operations.push(term.get_expression(codec, index)?);
        }
        Ok(common::ExpressionInput::merge(common::AND, operations))
    }
}
