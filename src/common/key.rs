use crate::{
    common::{codec::ValueCodec, value::Value},
    error::{BuildError, CompositeError},
    schema::{
        composite,
        index::{KeySpec, SecondaryIndex},
        table::TableSchema,
    },
};

use aws_sdk_dynamodb::types;
use indexmap::IndexMap;
use std::collections;

/// Key component.
///
/// ```rust
/// use dynamodb_gen::common::key;
///
/// let key = key::Key {
///     name: "id".to_string(),
///     value: "1".into(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    /// The physical attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: Value,
}

/// Primary key of the table or of one of its indexes.
#[derive(Clone, Debug, PartialEq)]
pub struct Keys {
    /// The partition key.
    pub partition_key: Key,
    /// The sort key, only for keys with a range component.
    pub sort_key: Option<Key>,
}

fn resolve(spec: &KeySpec, supplied: &IndexMap<String, Value>) -> Result<Key, CompositeError> {
    let value = match spec {
        KeySpec::Simple(name) => supplied
            .get(name)
            .cloned()
            .ok_or_else(|| CompositeError::MissingValue {
                attribute: name.clone(),
            })?,
        KeySpec::Composite(key) => {
            Value::String(composite::build(&key.parts, |name| supplied.get(name))?)
        }
    };
    Ok(Key {
        name: spec.name().to_string(),
        value,
    })
}

impl Keys {
    /// Base table key. `range` is ignored when the table has no range key.
    ///
    /// ```rust
    /// use dynamodb_gen::{common::key::Keys, schema::table::TableSchema};
    ///
    /// let schema = TableSchema::from_json_str(r#"{
    ///     "table_name": "users",
    ///     "hash_key": "user_id",
    ///     "attributes": [{"name": "user_id", "type": "S"}]
    /// }"#).unwrap();
    /// let keys = Keys::for_table(&schema, "u1".into(), None);
    /// assert_eq!(keys.partition_key.name, "user_id");
    /// assert!(keys.sort_key.is_none());
    /// ```
    pub fn for_table(schema: &TableSchema, hash: Value, range: Option<Value>) -> Self {
        Self {
            partition_key: Key {
                name: schema.hash_key().to_string(),
                value: hash,
            },
            sort_key: schema
                .range_key()
                .zip(range)
                .map(|(name, value)| Key {
                    name: name.to_string(),
                    value,
                }),
        }
    }

    /// Key of a secondary index, composite components resolved from `supplied`.
    ///
    /// The range key is included only when every attribute it reads is supplied.
    pub fn for_index(
        index: &SecondaryIndex,
        supplied: &IndexMap<String, Value>,
    ) -> Result<Self, CompositeError> {
        let partition_key = resolve(&index.hash_key, supplied)?;
        let sort_key = match &index.range_key {
            Some(range_key)
                if range_key
                    .attributes()
                    .iter()
                    .all(|attribute| supplied.contains_key(*attribute)) =>
            {
                Some(resolve(range_key, supplied)?)
            }
            _ => None,
        };
        Ok(Self {
            partition_key,
            sort_key,
        })
    }

    /// Encode the key into an item map.
    pub fn into_item<C: ValueCodec + ?Sized>(
        self,
        codec: &C,
    ) -> Result<collections::HashMap<String, types::AttributeValue>, BuildError> {
        let mut item = collections::HashMap::with_capacity(2);
        for key in std::iter::once(self.partition_key).chain(self.sort_key) {
            let value = codec.encode(&key.value).map_err(|source| BuildError::Encode {
                attribute: key.name.clone(),
                source,
            })?;
            item.insert(key.name, value);
        }
        Ok(item)
    }
}
