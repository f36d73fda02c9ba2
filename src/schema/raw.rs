//! Unvalidated schema description, as read from JSON.
//!
//! Types and subtypes stay plain strings here so that the validator, not the
//! deserializer, reports unsupported values with the attribute at fault.

use serde::{Deserialize, Serialize};

/// Schema description of one table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawSchema {
    /// Table name.
    #[serde(default)]
    pub table_name: String,
    /// Hash key attribute name.
    #[serde(default)]
    pub hash_key: Option<String>,
    /// Range key attribute name.
    #[serde(default)]
    pub range_key: Option<String>,
    /// Table attributes.
    #[serde(default)]
    pub attributes: Vec<RawAttribute>,
    /// Attributes shared by every entity stored in the table.
    #[serde(default)]
    pub common_attributes: Vec<RawAttribute>,
    /// Secondary indexes.
    #[serde(default)]
    pub secondary_indexes: Vec<RawSecondaryIndex>,
}

/// Attribute declaration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawAttribute {
    /// Attribute name.
    #[serde(default)]
    pub name: String,
    /// Wire type tag (`S`, `N`, `BOOL`, `SS`, ...).
    #[serde(rename = "type", default)]
    pub wire_type: String,
    /// Optional representation hint (`string`, `i64`, `f64`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

/// Composite key segment declaration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawKeyPart {
    /// Whether `value` is a literal rather than an attribute name.
    #[serde(default)]
    pub is_constant: bool,
    /// Literal or attribute name.
    pub value: String,
}

/// Secondary index declaration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawSecondaryIndex {
    /// Index name.
    #[serde(default)]
    pub name: String,
    /// Simple hash key, or a `#`-joined composite string form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_key: Option<String>,
    /// Composite hash key segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_key_parts: Option<Vec<RawKeyPart>>,
    /// Simple range key, or a `#`-joined composite string form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
    /// Composite range key segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key_parts: Option<Vec<RawKeyPart>>,
    /// `ALL`, `KEYS_ONLY` or `INCLUDE`.
    #[serde(default = "default_projection_type")]
    pub projection_type: String,
    /// Attributes copied by an `INCLUDE` projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_key_attributes: Option<Vec<String>>,
}

impl Default for RawSecondaryIndex {
    fn default() -> Self {
        Self {
            name: String::new(),
            hash_key: None,
            hash_key_parts: None,
            range_key: None,
            range_key_parts: None,
            projection_type: default_projection_type(),
            non_key_attributes: None,
        }
    }
}

fn default_projection_type() -> String {
    "ALL".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_deserialize() {
        let raw: RawSchema = serde_json::from_value(json!({
            "table_name": "posts",
            "hash_key": "id",
            "attributes": [
                {"name": "id", "type": "S"},
                {"name": "views", "type": "N", "subtype": "u32"},
            ],
            "secondary_indexes": [
                {
                    "name": "by_category",
                    "hash_key_parts": [
                        {"is_constant": true, "value": "POST"},
                        {"value": "category"},
                    ],
                },
            ],
        }))
        .unwrap();
        let expected = RawSchema {
            table_name: "posts".to_string(),
            hash_key: Some("id".to_string()),
            attributes: vec![
                RawAttribute {
                    name: "id".to_string(),
                    wire_type: "S".to_string(),
                    subtype: None,
                },
                RawAttribute {
                    name: "views".to_string(),
                    wire_type: "N".to_string(),
                    subtype: Some("u32".to_string()),
                },
            ],
            secondary_indexes: vec![RawSecondaryIndex {
                name: "by_category".to_string(),
                hash_key_parts: Some(vec![
                    RawKeyPart {
                        is_constant: true,
                        value: "POST".to_string(),
                    },
                    RawKeyPart {
                        is_constant: false,
                        value: "category".to_string(),
                    },
                ]),
                projection_type: "ALL".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(raw, expected);
    }
}
