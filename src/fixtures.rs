use crate::schema::{raw::RawSchema, table::TableSchema};

use serde_json::json;
use std::sync::LazyLock;

pub(crate) static USERS: LazyLock<TableSchema> = LazyLock::new(users_schema);

pub(crate) fn users() -> serde_json::Value {
    json!({
        "table_name": "users",
        "hash_key": "user_id",
        "attributes": [
            {"name": "user_id", "type": "S"},
            {"name": "email", "type": "S"},
            {"name": "status", "type": "S"},
            {"name": "createdAt", "type": "N", "subtype": "i64"},
            {"name": "category", "type": "S"},
            {"name": "is_published", "type": "N", "subtype": "u8"},
            {"name": "tags", "type": "SS"},
            {"name": "score", "type": "N", "subtype": "f64"},
            {"name": "verified", "type": "BOOL"},
            {"name": "avatar", "type": "B"},
            {"name": "profile", "type": "M"},
        ],
        "common_attributes": [
            {"name": "updated_at", "type": "N"},
        ],
        "secondary_indexes": [
            {
                "name": "by_status",
                "hash_key": "status",
                "range_key": "createdAt",
                "projection_type": "KEYS_ONLY",
            },
            {
                "name": "by_email",
                "hash_key": "email",
            },
            {
                "name": "by_category",
                "hash_key_parts": [
                    {"value": "category"},
                    {"value": "is_published"},
                ],
                "range_key": "createdAt",
                "projection_type": "INCLUDE",
                "non_key_attributes": ["tags"],
            },
            {
                "name": "by_user_status",
                "hash_key": "const:USER#status",
            },
        ],
    })
}

pub(crate) fn users_schema() -> TableSchema {
    let raw: RawSchema = serde_json::from_value(users()).unwrap();
    TableSchema::load_and_validate(raw).unwrap()
}
