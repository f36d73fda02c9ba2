//! Conversion between records and DynamoDB items.
//!
//! [`to_item`] serializes a record and adds the composite index keys it can
//! resolve. [`extract`] decodes the declared attributes of an item; values
//! that do not fit their declaration are reported instead of failing the
//! record.

use crate::{
    common::{
        codec::ValueCodec,
        value::{Number, Value},
    },
    error::{CodecError, MarshalError},
    schema::{
        attribute::{AttributeType, Subtype},
        composite,
        table::{FieldInfo, TableSchema},
    },
};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use serde::Serialize;
use serde_dynamo::to_item as serialize_item;
use std::{collections, fmt};

/// A DynamoDB item.
pub type Item = collections::HashMap<String, types::AttributeValue>;

/// Serialize `record` into an item.
///
/// Every composite index key whose attribute parts are all present is added
/// as a string attribute under its physical name; a key with a missing part
/// is left out so the item stays out of that index.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_gen::{common::codec::DynamoCodec, marshal, schema::table::TableSchema};
/// use serde_json::json;
///
/// let schema = TableSchema::from_json_str(r#"{
///     "table_name": "posts",
///     "hash_key": "post_id",
///     "attributes": [
///         {"name": "post_id", "type": "S"},
///         {"name": "category", "type": "S"},
///         {"name": "year", "type": "N"}
///     ],
///     "secondary_indexes": [{"name": "by_category", "hash_key": "category#year"}]
/// }"#).unwrap();
/// let record = json!({"post_id": "p1", "category": "tech", "year": 2024});
/// let item = marshal::to_item(&schema, &DynamoCodec, record).unwrap();
/// assert_eq!(item["category#year"], AttributeValue::S("tech#2024".to_string()));
/// ```
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "dynamodb_gen.to_item",
        skip_all,
        fields(table = schema.table_name()),
        err
    )
)]
pub fn to_item<T, C>(schema: &TableSchema, codec: &C, record: T) -> Result<Item, MarshalError>
where
    T: Serialize,
    C: ValueCodec + ?Sized,
{
    let mut item: Item = serialize_item(record)?;
    for key in std::iter::once(schema.hash_key()).chain(schema.range_key()) {
        if present(&item, key).is_none() {
            return Err(MarshalError::MissingKey {
                attribute: key.to_string(),
            });
        }
    }

    let mut composite_keys = IndexMap::new();
    'keys: for key in schema
        .secondary_indexes()
        .iter()
        .flat_map(|index| index.composite_keys())
    {
        let attributes = key.non_constant_parts();
        let mut supplied = IndexMap::with_capacity(attributes.len());
        for attribute in attributes {
            let Some(value) = present(&item, attribute) else {
                continue 'keys;
            };
            let value = match value {
                // numeric parts keep their wire digits
                types::AttributeValue::N(number) => Value::String(number.clone()),
                value => codec.decode(value).map_err(|source| MarshalError::Codec {
                    attribute: attribute.to_string(),
                    source,
                })?,
            };
            supplied.insert(attribute, value);
        }
        let resolved = composite::build(&key.parts, |name| supplied.get(name))?;
        composite_keys.insert(key.name.clone(), types::AttributeValue::S(resolved));
    }
    item.extend(composite_keys);
    Ok(item)
}

/// The attribute's value, treating an explicit NULL as absent.
fn present<'i>(item: &'i Item, attribute: &str) -> Option<&'i types::AttributeValue> {
    item.get(attribute)
        .filter(|value| !matches!(value, types::AttributeValue::Null(_)))
}

/// Why a field was left out of an [`Extraction`].
#[derive(Clone, Debug, PartialEq)]
pub enum DiscardReason {
    /// The codec could not decode the attribute.
    Decode(CodecError),
    /// The attribute holds another wire type than declared.
    TypeMismatch {
        /// Declared type.
        expected: AttributeType,
        /// Type found in the item.
        found: AttributeType,
    },
    /// A number does not fit the declared subtype.
    OutOfRange {
        /// Declared subtype.
        subtype: Subtype,
        /// The offending number.
        value: Number,
    },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(source) => write!(f, "failed to decode: {source}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::OutOfRange { subtype, value } => write!(f, "{value} does not fit {subtype}"),
        }
    }
}

/// A declared attribute present in an item but not extracted.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscardedField {
    /// Attribute name.
    pub attribute: String,
    /// Why it was discarded.
    pub reason: DiscardReason,
}

/// Declared fields decoded from one item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    /// Decoded values, in declaration order.
    pub fields: IndexMap<String, Value>,
    /// Fields present but left out, in declaration order.
    pub discarded: Vec<DiscardedField>,
}

fn value_type(value: &Value) -> AttributeType {
    match value {
        Value::Null => AttributeType::Null,
        Value::Bool(_) => AttributeType::Bool,
        Value::Number(_) => AttributeType::Number,
        Value::String(_) => AttributeType::String,
        Value::Binary(_) => AttributeType::Binary,
        Value::StringSet(_) => AttributeType::StringSet,
        Value::NumberSet(_) => AttributeType::NumberSet,
        Value::BinarySet(_) => AttributeType::BinarySet,
        Value::List(_) => AttributeType::List,
        Value::Map(_) => AttributeType::Map,
    }
}

fn fits(subtype: Subtype, number: Number) -> bool {
    match (subtype.integer_range(), number) {
        (Some((min, max)), Number::Int(value)) => (min..=max).contains(&i128::from(value)),
        (Some((min, max)), Number::UInt(value)) => (min..=max).contains(&i128::from(value)),
        // an integral f64 converts to i128 exactly, so rounding past the bound is caught
        (Some((min, max)), Number::Float(value)) => {
            value.fract() == 0.0 && (min..=max).contains(&(value as i128))
        }
        (None, Number::Float(value)) if subtype == Subtype::F32 => {
            value.abs() <= f64::from(f32::MAX)
        }
        (None, _) => true,
    }
}

fn check(field: &FieldInfo, value: &Value) -> Result<(), DiscardReason> {
    let found = value_type(value);
    if found != field.dynamo_type {
        return Err(DiscardReason::TypeMismatch {
            expected: field.dynamo_type,
            found,
        });
    }
    let Some(subtype) = field.subtype.filter(|subtype| subtype.is_numeric()) else {
        return Ok(());
    };
    let numbers = match value {
        Value::Number(number) => std::slice::from_ref(number),
        Value::NumberSet(numbers) => numbers.as_slice(),
        _ => &[],
    };
    match numbers.iter().find(|number| !fits(subtype, **number)) {
        Some(number) => Err(DiscardReason::OutOfRange {
            subtype,
            value: *number,
        }),
        None => Ok(()),
    }
}

/// Decode the declared attributes of `item`.
///
/// Attributes the schema does not declare, composite key attributes included,
/// are ignored. A declared attribute is discarded, with its reason, when it
/// cannot be decoded, holds another wire type, or holds a number outside its
/// subtype's range.
pub fn extract<C: ValueCodec + ?Sized>(schema: &TableSchema, codec: &C, item: &Item) -> Extraction {
    let mut extraction = Extraction::default();
    for (name, field) in schema.fields_map() {
        let Some(attribute) = item.get(name) else {
            continue;
        };
        let checked = codec
            .decode(attribute)
            .map_err(DiscardReason::Decode)
            .and_then(|value| check(field, &value).map(|_| value));
        match checked {
            Ok(value) => {
                extraction.fields.insert(name.clone(), value);
            }
            Err(reason) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attribute = %name, %reason, "discarded field");
                extraction.discarded.push(DiscardedField {
                    attribute: name.clone(),
                    reason,
                });
            }
        }
    }
    extraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::{codec::DynamoCodec, key::Keys},
        fixtures,
    };

    use aws_sdk_dynamodb::primitives::Blob;
    use rstest::rstest;
    use serde_json::json;

    fn s(value: &str) -> types::AttributeValue {
        types::AttributeValue::S(value.to_string())
    }

    fn n(value: &str) -> types::AttributeValue {
        types::AttributeValue::N(value.to_string())
    }

    #[derive(Serialize)]
    struct User {
        user_id: String,
        status: Option<String>,
        category: Option<String>,
        is_published: Option<u8>,
    }

    #[test]
    fn test_to_item_adds_composite_keys() {
        let schema = fixtures::users_schema();
        let user = User {
            user_id: "u1".to_string(),
            status: Some("active".to_string()),
            category: Some("tech".to_string()),
            is_published: Some(1),
        };
        let item = to_item(&schema, &DynamoCodec, user).unwrap();
        assert_eq!(item["user_id"], s("u1"));
        assert_eq!(item["is_published"], n("1"));
        assert_eq!(item["category#is_published"], s("tech#1"));
        assert_eq!(item["USER#status"], s("USER#active"));
    }

    #[test]
    fn test_to_item_skips_keys_with_missing_parts() {
        let schema = fixtures::users_schema();
        let user = User {
            user_id: "u1".to_string(),
            status: None,
            category: Some("tech".to_string()),
            is_published: None,
        };
        let item = to_item(&schema, &DynamoCodec, user).unwrap();
        assert!(!item.contains_key("category#is_published"));
        assert!(!item.contains_key("USER#status"));
        assert_eq!(item["category"], s("tech"));
    }

    #[rstest]
    #[case::missing_hash_key(
        json!({"status": "active"}),
        "user_id"
    )]
    #[case::null_hash_key(
        json!({"user_id": null}),
        "user_id"
    )]
    fn test_to_item_requires_base_keys(
        #[case] record: serde_json::Value,
        #[case] expected: &str,
    ) {
        let schema = fixtures::users_schema();
        let actual = to_item(&schema, &DynamoCodec, record);
        assert!(matches!(
            actual,
            Err(MarshalError::MissingKey { attribute }) if attribute == expected
        ));
    }

    #[test]
    fn test_to_item_rejects_separator_in_composite_part() {
        let schema = fixtures::users_schema();
        let record = json!({"user_id": "u1", "category": "a#b", "is_published": 0});
        let actual = to_item(&schema, &DynamoCodec, record);
        assert!(matches!(actual, Err(MarshalError::Composite(_))));
    }

    fn counters_schema() -> TableSchema {
        TableSchema::from_json_str(
            r#"{
                "table_name": "counters",
                "hash_key": "id",
                "attributes": [
                    {"name": "id", "type": "S"},
                    {"name": "cat", "type": "S"},
                    {"name": "big", "type": "N", "subtype": "u64"}
                ],
                "secondary_indexes": [{"name": "by_big", "hash_key": "cat#big"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_to_item_keeps_u64_digits_in_composite_keys() {
        let schema = counters_schema();
        let record = json!({"id": "c1", "cat": "x", "big": u64::MAX});
        let item = to_item(&schema, &DynamoCodec, record).unwrap();
        assert_eq!(item["big"], n("18446744073709551615"));
        assert_eq!(item["cat#big"], s("x#18446744073709551615"));

        let supplied = IndexMap::from([
            ("cat".to_string(), Value::from("x")),
            ("big".to_string(), Value::from(u64::MAX)),
        ]);
        let keys = Keys::for_index(schema.index("by_big").unwrap(), &supplied).unwrap();
        assert_eq!(
            DynamoCodec.encode(&keys.partition_key.value).unwrap(),
            item["cat#big"]
        );
    }

    #[rstest]
    #[case::u64_max("18446744073709551615", Some(Value::from(u64::MAX)), Vec::new())]
    #[case::beyond_u64(
        "18446744073709551616",
        None,
        vec![
            DiscardedField {
                attribute: "big".to_string(),
                reason: DiscardReason::OutOfRange {
                    subtype: Subtype::U64,
                    value: Number::Float(18_446_744_073_709_551_616.0),
                },
            },
        ]
    )]
    fn test_extract_u64_bounds(
        #[case] big: &str,
        #[case] expected: Option<Value>,
        #[case] discarded: Vec<DiscardedField>,
    ) {
        let schema = counters_schema();
        let item = Item::from([("id".to_string(), s("c1")), ("big".to_string(), n(big))]);
        let extraction = extract(&schema, &DynamoCodec, &item);
        assert_eq!(extraction.fields.get("big"), expected.as_ref());
        assert_eq!(extraction.discarded, discarded);
    }

    #[test]
    fn test_extract() {
        let schema = fixtures::users_schema();
        let item = Item::from([
            ("user_id".to_string(), s("u1")),
            ("createdAt".to_string(), n("1700000000")),
            ("is_published".to_string(), n("300")),
            ("tags".to_string(), s("not a set")),
            ("score".to_string(), n("nan?")),
            ("verified".to_string(), types::AttributeValue::Bool(true)),
            ("avatar".to_string(), types::AttributeValue::B(Blob::new(vec![1, 2]))),
            ("category#is_published".to_string(), s("tech#1")),
            ("nickname".to_string(), s("x")),
        ]);
        let extraction = extract(&schema, &DynamoCodec, &item);

        let expected_fields: IndexMap<String, Value> = [
            ("user_id", Value::from("u1")),
            ("createdAt", Value::from(1_700_000_000_i64)),
            ("verified", Value::from(true)),
            ("avatar", Value::Binary(vec![1, 2])),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
        assert_eq!(extraction.fields, expected_fields);
        assert_eq!(
            extraction.discarded,
            vec![
                DiscardedField {
                    attribute: "is_published".to_string(),
                    reason: DiscardReason::OutOfRange {
                        subtype: Subtype::U8,
                        value: Number::Int(300),
                    },
                },
                DiscardedField {
                    attribute: "tags".to_string(),
                    reason: DiscardReason::TypeMismatch {
                        expected: AttributeType::StringSet,
                        found: AttributeType::String,
                    },
                },
                DiscardedField {
                    attribute: "score".to_string(),
                    reason: DiscardReason::Decode(CodecError::MalformedNumber(
                        "nan?".to_string()
                    )),
                },
            ]
        );
    }

    #[rstest]
    #[case::int_in_range(Subtype::U8, Number::Int(255), true)]
    #[case::int_below_range(Subtype::U8, Number::Int(-1), false)]
    #[case::int_above_range(Subtype::I8, Number::Int(128), false)]
    #[case::integral_float(Subtype::U64, Number::Float(1.0e19), true)]
    #[case::float_rounded_past_u64(
        Subtype::U64,
        Number::Float(18_446_744_073_709_551_616.0),
        false
    )]
    #[case::uint_in_u64(Subtype::U64, Number::UInt(u64::MAX), true)]
    #[case::uint_beyond_i64(Subtype::I64, Number::UInt(u64::MAX), false)]
    #[case::fractional_float(Subtype::I64, Number::Float(1.5), false)]
    #[case::float_in_f32(Subtype::F32, Number::Float(3.5), true)]
    #[case::float_beyond_f32(Subtype::F32, Number::Float(1.0e39), false)]
    #[case::int_as_f64(Subtype::F64, Number::Int(7), true)]
    fn test_fits(#[case] subtype: Subtype, #[case] number: Number, #[case] expected: bool) {
        assert_eq!(fits(subtype, number), expected);
    }

    #[test]
    fn test_round_trip_through_extract() {
        let schema = fixtures::users_schema();
        let record = json!({
            "user_id": "u1",
            "status": "active",
            "createdAt": 42,
            "score": 9.5,
        });
        let item = to_item(&schema, &DynamoCodec, record).unwrap();
        let extraction = extract(&schema, &DynamoCodec, &item);
        assert!(extraction.discarded.is_empty());
        assert_eq!(extraction.fields.get("createdAt"), Some(&Value::from(42)));
        assert_eq!(extraction.fields.get("score"), Some(&Value::from(9.5)));
        assert!(!extraction.fields.contains_key("USER#status"));
    }
}
