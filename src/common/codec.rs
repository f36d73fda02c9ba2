use crate::{
    common::value::{Number, Value},
    error::CodecError,
};

use aws_sdk_dynamodb::{primitives::Blob, types};
use std::collections;

/// Encoding of native values into DynamoDB attribute values and back.
///
/// The planner and key builders never touch the wire format directly; they
/// reach it through this trait so that generated code can plug in its own
/// representation.
pub trait ValueCodec {
    /// Encode a native value.
    fn encode(&self, value: &Value) -> Result<types::AttributeValue, CodecError>;

    /// Decode a wire attribute.
    fn decode(&self, attribute: &types::AttributeValue) -> Result<Value, CodecError>;
}

/// Default codec mapping every [`Value`] variant onto its DynamoDB counterpart.
#[derive(Clone, Copy, Debug, Default)]
pub struct DynamoCodec;

fn encode_number(number: &Number) -> Result<String, CodecError> {
    match number {
        Number::Int(value) => Ok(value.to_string()),
        Number::UInt(value) => Ok(value.to_string()),
        Number::Float(value) if value.is_finite() => Ok(value.to_string()),
        Number::Float(value) => Err(CodecError::NonFiniteNumber(*value)),
    }
}

fn decode_number(number: &str) -> Result<Number, CodecError> {
    if let Ok(value) = number.parse::<i64>() {
        return Ok(Number::Int(value));
    }
    if let Ok(value) = number.parse::<u64>() {
        return Ok(Number::UInt(value));
    }
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Number::Float(value)),
        _ => Err(CodecError::MalformedNumber(number.to_string())),
    }
}

impl ValueCodec for DynamoCodec {
    fn encode(&self, value: &Value) -> Result<types::AttributeValue, CodecError> {
        let attribute = match value {
            Value::Null => types::AttributeValue::Null(true),
            Value::Bool(value) => types::AttributeValue::Bool(*value),
            Value::Number(number) => types::AttributeValue::N(encode_number(number)?),
            Value::String(value) => types::AttributeValue::S(value.clone()),
            Value::Binary(value) => types::AttributeValue::B(Blob::new(value.clone())),
            Value::StringSet(values) => {
                if values.is_empty() {
                    return Err(CodecError::EmptySet("string set"));
                }
                types::AttributeValue::Ss(values.clone())
            }
            Value::NumberSet(values) => {
                if values.is_empty() {
                    return Err(CodecError::EmptySet("number set"));
                }
                let numbers = values
                    .iter()
                    .map(encode_number)
                    .collect::<Result<_, _>>()?;
                types::AttributeValue::Ns(numbers)
            }
            Value::BinarySet(values) => {
                if values.is_empty() {
                    return Err(CodecError::EmptySet("binary set"));
                }
                let blobs = values.iter().cloned().map(Blob::new).collect();
                types::AttributeValue::Bs(blobs)
            }
            Value::List(values) => {
                let values = values
                    .iter()
                    .map(|value| self.encode(value))
                    .collect::<Result<_, _>>()?;
                types::AttributeValue::L(values)
            }
            Value::Map(map) => {
                let mut encoded = collections::HashMap::with_capacity(map.len());
                for (key, value) in map {
                    encoded.insert(key.clone(), self.encode(value)?);
                }
                types::AttributeValue::M(encoded)
            }
        };
        Ok(attribute)
    }

    fn decode(&self, attribute: &types::AttributeValue) -> Result<Value, CodecError> {
        let value = match attribute {
            types::AttributeValue::Null(_) => Value::Null,
            types::AttributeValue::Bool(value) => Value::Bool(*value),
            types::AttributeValue::N(number) => Value::Number(decode_number(number)?),
            types::AttributeValue::S(value) => Value::String(value.clone()),
            types::AttributeValue::B(blob) => Value::Binary(blob.as_ref().to_vec()),
            types::AttributeValue::Ss(values) => Value::StringSet(values.clone()),
            types::AttributeValue::Ns(numbers) => Value::NumberSet(
                numbers
                    .iter()
                    .map(|number| decode_number(number))
                    .collect::<Result<_, _>>()?,
            ),
            types::AttributeValue::Bs(blobs) => {
                Value::BinarySet(blobs.iter().map(|blob| blob.as_ref().to_vec()).collect())
            }
            types::AttributeValue::L(values) => Value::List(
                values
                    .iter()
                    .map(|value| self.decode(value))
                    .collect::<Result<_, _>>()?,
            ),
            types::AttributeValue::M(map) => {
                // wire maps are unordered; sort for a stable decoded form
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                let mut decoded = indexmap::IndexMap::with_capacity(map.len());
                for key in keys {
                    decoded.insert(key.clone(), self.decode(&map[key])?);
                }
                Value::Map(decoded)
            }
            _ => return Err(CodecError::Unsupported),
        };
        Ok(value)
    }
}
