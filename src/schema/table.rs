use crate::{
    error::SchemaError,
    schema::{
        attribute::{Attribute, AttributeType, Subtype},
        composite::{self, CompositeKeyPart, SEPARATOR},
        index::{CompositeKey, KeySpec, Projection, SecondaryIndex},
        operator::{self, OperatorSet, OperatorType},
        raw::{RawAttribute, RawKeyPart, RawSchema, RawSecondaryIndex},
        sanitize::{self, Identifiers, Namespace, Sanitize},
    },
};

use indexmap::{IndexMap, IndexSet};
use std::io;

/// Metadata derived once per attribute when a schema is loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldInfo {
    /// Wire type.
    pub dynamo_type: AttributeType,
    /// Representation hint.
    pub subtype: Option<Subtype>,
    /// Sanitized identifier.
    pub identifier: String,
    /// Whether the attribute takes part in the table key or any index key.
    pub is_key: bool,
    /// Whether the attribute is the table hash key.
    pub is_hash_key: bool,
    /// Whether the attribute is the table range key.
    pub is_range_key: bool,
    /// Whether the attribute was declared among the common attributes.
    pub is_common: bool,
    /// Operators legal for the attribute's type.
    pub allowed_operators: OperatorSet,
}

impl FieldInfo {
    /// Whether `operator` is legal on this attribute.
    pub const fn allows(&self, operator: OperatorType) -> bool {
        self.allowed_operators.contains(operator)
    }
}

/// A validated, immutable table schema.
///
/// ```rust
/// use dynamodb_gen::schema::table::TableSchema;
///
/// let schema = TableSchema::from_json_str(r#"{
///     "table_name": "users",
///     "hash_key": "user_id",
///     "attributes": [{"name": "user_id", "type": "S"}]
/// }"#).unwrap();
/// assert_eq!(schema.hash_key(), "user_id");
/// assert!(schema.field("user_id").unwrap().is_hash_key);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableSchema {
    table_name: String,
    hash_key: String,
    range_key: Option<String>,
    attributes: Vec<Attribute>,
    common_attributes: Vec<Attribute>,
    secondary_indexes: Vec<SecondaryIndex>,
    fields_map: IndexMap<String, FieldInfo>,
}

impl TableSchema {
    /// Parse a JSON schema description and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema =
            serde_json::from_str(json).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::load_and_validate(raw)
    }

    /// Read a JSON schema description and validate it.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, SchemaError> {
        let raw: RawSchema =
            serde_json::from_reader(reader).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::load_and_validate(raw)
    }

    /// Validate a description with the default [`Identifiers`] sanitizer.
    pub fn load_and_validate(raw: RawSchema) -> Result<Self, SchemaError> {
        Self::load_and_validate_with(raw, &Identifiers)
    }

    /// Validate a description, sanitizing identifiers with `sanitizer`.
    ///
    /// Checks run in order and stop at the first failure: structure,
    /// attributes, table keys, secondary indexes, identifier collisions.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_gen.load_and_validate",
            skip_all,
            fields(table = %raw.table_name),
            err
        )
    )]
    pub fn load_and_validate_with<S: Sanitize + ?Sized>(
        raw: RawSchema,
        sanitizer: &S,
    ) -> Result<Self, SchemaError> {
        let hash_key = check_structure(&raw)?;

        let attributes = check_attributes(&raw.attributes, sanitizer, &mut IndexSet::new())?;
        let mut seen: IndexSet<String> = attributes.iter().map(|a| a.name.clone()).collect();
        let common_attributes = check_attributes(&raw.common_attributes, sanitizer, &mut seen)?;
        let declared: IndexMap<&str, &Attribute> = attributes
            .iter()
            .chain(&common_attributes)
            .map(|attribute| (attribute.name.as_str(), attribute))
            .collect();

        let table_name = raw.table_name.trim().to_string();
        check_simple_key(&declared, &table_name, "hash_key", &hash_key)?;
        if let Some(range_key) = &raw.range_key {
            check_simple_key(&declared, &table_name, "range_key", range_key)?;
        }

        let mut index_names = IndexSet::new();
        let mut secondary_indexes = Vec::with_capacity(raw.secondary_indexes.len());
        for (position, raw_index) in raw.secondary_indexes.iter().enumerate() {
            let index = check_index(&declared, raw_index, position, sanitizer)?;
            if !index_names.insert(index.name.clone()) {
                return Err(SchemaError::DuplicateIndex { index: index.name });
            }
            secondary_indexes.push(index);
        }

        check_identifiers(&attributes, &common_attributes, &secondary_indexes)?;

        let mut key_attributes: IndexSet<&str> = IndexSet::new();
        key_attributes.insert(&hash_key);
        key_attributes.extend(raw.range_key.as_deref());
        for index in &secondary_indexes {
            key_attributes.extend(index.hash_key.attributes());
            if let Some(range_key) = &index.range_key {
                key_attributes.extend(range_key.attributes());
            }
        }
        let fields_map = attributes
            .iter()
            .map(|attribute| (attribute, false))
            .chain(common_attributes.iter().map(|attribute| (attribute, true)))
            .map(|(attribute, is_common)| {
                let info = FieldInfo {
                    dynamo_type: attribute.attribute_type,
                    subtype: attribute.subtype,
                    identifier: attribute.identifier.clone(),
                    is_key: key_attributes.contains(attribute.name.as_str()),
                    is_hash_key: attribute.name == hash_key,
                    is_range_key: raw.range_key.as_deref() == Some(attribute.name.as_str()),
                    is_common,
                    allowed_operators: operator::allowed_operators(attribute.attribute_type),
                };
                (attribute.name.clone(), info)
            })
            .collect();

        Ok(Self {
            table_name,
            hash_key,
            range_key: raw.range_key,
            attributes,
            common_attributes,
            secondary_indexes,
            fields_map,
        })
    }

    /// Table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Table hash key attribute.
    pub fn hash_key(&self) -> &str {
        &self.hash_key
    }

    /// Table range key attribute.
    pub fn range_key(&self) -> Option<&str> {
        self.range_key.as_deref()
    }

    /// Declared attributes.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Declared common attributes.
    pub fn common_attributes(&self) -> &[Attribute] {
        &self.common_attributes
    }

    /// Secondary indexes, in declaration order.
    pub fn secondary_indexes(&self) -> &[SecondaryIndex] {
        &self.secondary_indexes
    }

    /// Derived metadata of every attribute, attributes first, then common attributes.
    pub fn fields_map(&self) -> &IndexMap<String, FieldInfo> {
        &self.fields_map
    }

    /// Derived metadata of one attribute.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields_map.get(name)
    }

    /// Secondary index by name.
    pub fn index(&self, name: &str) -> Option<&SecondaryIndex> {
        self.secondary_indexes.iter().find(|index| index.name == name)
    }

    /// Sanitized identifier of an attribute or of a composite key name.
    pub fn identifier_of(&self, name: &str) -> Option<&str> {
        if let Some(field) = self.fields_map.get(name) {
            return Some(&field.identifier);
        }
        self.secondary_indexes
            .iter()
            .flat_map(SecondaryIndex::composite_keys)
            .find(|key| key.name == name)
            .map(|key| key.identifier.as_str())
    }
}

fn check_structure(raw: &RawSchema) -> Result<String, SchemaError> {
    if raw.table_name.trim().is_empty() {
        return Err(SchemaError::EmptyTableName);
    }
    let hash_key = match raw.hash_key.as_deref() {
        Some(hash_key) if !hash_key.trim().is_empty() => hash_key.to_string(),
        _ => return Err(SchemaError::MissingHashKey),
    };
    if raw.attributes.is_empty() {
        return Err(SchemaError::NoAttributes);
    }
    Ok(hash_key)
}

fn check_attributes<S: Sanitize + ?Sized>(
    raw_attributes: &[RawAttribute],
    sanitizer: &S,
    seen: &mut IndexSet<String>,
) -> Result<Vec<Attribute>, SchemaError> {
    let mut attributes = Vec::with_capacity(raw_attributes.len());
    for (position, raw) in raw_attributes.iter().enumerate() {
        if raw.name.trim().is_empty() {
            return Err(SchemaError::EmptyAttributeName { position });
        }
        let identifier = sanitize::identifier_for(sanitizer, &raw.name)?;
        if !seen.insert(raw.name.clone()) {
            return Err(SchemaError::DuplicateAttribute {
                attribute: raw.name.clone(),
            });
        }
        let attribute_type =
            AttributeType::from_wire(&raw.wire_type).ok_or_else(|| SchemaError::UnsupportedType {
                attribute: raw.name.clone(),
                wire_type: raw.wire_type.clone(),
            })?;
        let subtype = match &raw.subtype {
            Some(hint) => {
                let subtype = Subtype::parse(hint).ok_or_else(|| SchemaError::UnknownSubtype {
                    attribute: raw.name.clone(),
                    subtype: hint.clone(),
                })?;
                if !attribute_type.accepts_subtype(subtype) {
                    return Err(SchemaError::IncompatibleSubtype {
                        attribute: raw.name.clone(),
                        wire_type: raw.wire_type.clone(),
                        subtype: hint.clone(),
                    });
                }
                Some(subtype)
            }
            None => None,
        };
        attributes.push(Attribute {
            name: raw.name.clone(),
            attribute_type,
            subtype,
            identifier,
        });
    }
    Ok(attributes)
}

fn check_simple_key(
    declared: &IndexMap<&str, &Attribute>,
    owner: &str,
    key: &'static str,
    name: &str,
) -> Result<(), SchemaError> {
    let attribute = declared
        .get(name)
        .ok_or_else(|| SchemaError::UnknownKeyAttribute {
            owner: owner.to_string(),
            key,
            attribute: name.to_string(),
        })?;
    if !attribute.attribute_type.is_key_type() {
        return Err(SchemaError::InvalidKeyType {
            owner: owner.to_string(),
            key,
            attribute: name.to_string(),
            wire_type: attribute.attribute_type.to_string(),
        });
    }
    Ok(())
}

fn parse_key(
    index: &str,
    key: &'static str,
    simple: Option<&str>,
    parts: Option<&[RawKeyPart]>,
) -> Result<Option<Vec<CompositeKeyPart>>, SchemaError> {
    let parts = match (simple.filter(|name| !name.is_empty()), parts) {
        (Some(name), None) if name.contains(SEPARATOR) => {
            name.split(SEPARATOR).map(CompositeKeyPart::parse).collect()
        }
        (Some(name), None) => return Ok(Some(vec![CompositeKeyPart::Attribute(name.to_string())])),
        (None, Some(parts)) => parts
            .iter()
            .map(|part| match part.is_constant {
                true => CompositeKeyPart::Constant(part.value.clone()),
                false => CompositeKeyPart::Attribute(part.value.clone()),
            })
            .collect(),
        (None, None) if key == "range_key" => return Ok(None),
        (Some(_), Some(_)) if key == "range_key" => {
            return Err(SchemaError::DuplicateRangeKey {
                index: index.to_string(),
            });
        }
        _ => {
            return Err(SchemaError::AmbiguousKey {
                index: index.to_string(),
                key,
            });
        }
    };
    Ok(Some(parts))
}

fn check_key_spec<S: Sanitize + ?Sized>(
    declared: &IndexMap<&str, &Attribute>,
    index: &str,
    key: &'static str,
    parts: Vec<CompositeKeyPart>,
    composite_form: bool,
    sanitizer: &S,
) -> Result<KeySpec, SchemaError> {
    if !composite_form {
        if let [CompositeKeyPart::Attribute(name)] = parts.as_slice() {
            check_simple_key(declared, index, key, name)?;
            return Ok(KeySpec::Simple(name.clone()));
        }
    }
    for part in &parts {
        match part {
            CompositeKeyPart::Constant(literal)
                if literal.is_empty() || literal.contains(SEPARATOR) =>
            {
                return Err(SchemaError::InvalidConstantPart {
                    index: index.to_string(),
                    value: literal.clone(),
                });
            }
            CompositeKeyPart::Constant(_) => {}
            CompositeKeyPart::Attribute(name) => {
                let attribute =
                    declared
                        .get(name.as_str())
                        .ok_or_else(|| SchemaError::UnknownKeyAttribute {
                            owner: index.to_string(),
                            key,
                            attribute: name.clone(),
                        })?;
                if !attribute.attribute_type.is_composite_part_type() {
                    return Err(SchemaError::InvalidKeyType {
                        owner: index.to_string(),
                        key,
                        attribute: name.clone(),
                        wire_type: attribute.attribute_type.to_string(),
                    });
                }
            }
        }
    }
    if composite::non_constant_parts(&parts).is_empty() {
        return Err(SchemaError::ConstantCompositeKey {
            index: index.to_string(),
            key,
        });
    }
    let name = composite::physical_name(&parts);
    let identifier = sanitizer.sanitize(&name);
    Ok(KeySpec::Composite(CompositeKey {
        name,
        identifier,
        parts,
    }))
}

fn check_projection(
    declared: &IndexMap<&str, &Attribute>,
    raw: &RawSecondaryIndex,
) -> Result<Projection, SchemaError> {
    let non_key_attributes = raw.non_key_attributes.clone().unwrap_or_default();
    let projection = match raw.projection_type.as_str() {
        "ALL" => Projection::All,
        "KEYS_ONLY" => Projection::KeysOnly,
        "INCLUDE" => {
            if non_key_attributes.is_empty() {
                return Err(SchemaError::EmptyInclude {
                    index: raw.name.clone(),
                });
            }
            if let Some(attribute) = non_key_attributes
                .iter()
                .find(|attribute| !declared.contains_key(attribute.as_str()))
            {
                return Err(SchemaError::UnknownNonKeyAttribute {
                    index: raw.name.clone(),
                    attribute: attribute.clone(),
                });
            }
            return Ok(Projection::Include(non_key_attributes));
        }
        other => {
            return Err(SchemaError::UnknownProjection {
                index: raw.name.clone(),
                projection: other.to_string(),
            });
        }
    };
    if !non_key_attributes.is_empty() {
        return Err(SchemaError::UnexpectedNonKeyAttributes {
            index: raw.name.clone(),
            projection: raw.projection_type.clone(),
        });
    }
    Ok(projection)
}

fn check_index<S: Sanitize + ?Sized>(
    declared: &IndexMap<&str, &Attribute>,
    raw: &RawSecondaryIndex,
    position: usize,
    sanitizer: &S,
) -> Result<SecondaryIndex, SchemaError> {
    if raw.name.trim().is_empty() {
        return Err(SchemaError::EmptyIndexName { position });
    }
    let hash_composite = raw.hash_key_parts.is_some()
        || raw.hash_key.as_deref().is_some_and(|key| key.contains(SEPARATOR));
    let hash_parts = parse_key(
        &raw.name,
        "hash_key",
        raw.hash_key.as_deref(),
        raw.hash_key_parts.as_deref(),
    )?
    .unwrap_or_default();
    let hash_key = check_key_spec(
        declared,
        &raw.name,
        "hash_key",
        hash_parts,
        hash_composite,
        sanitizer,
    )?;

    let range_composite = raw.range_key_parts.is_some()
        || raw.range_key.as_deref().is_some_and(|key| key.contains(SEPARATOR));
    let range_key = parse_key(
        &raw.name,
        "range_key",
        raw.range_key.as_deref(),
        raw.range_key_parts.as_deref(),
    )?
    .map(|parts| {
        check_key_spec(
            declared,
            &raw.name,
            "range_key",
            parts,
            range_composite,
            sanitizer,
        )
    })
    .transpose()?;

    let projection = check_projection(declared, raw)?;
    Ok(SecondaryIndex {
        name: raw.name.clone(),
        identifier: sanitizer.sanitize(&raw.name),
        hash_key,
        range_key,
        projection,
    })
}

fn check_identifiers(
    attributes: &[Attribute],
    common_attributes: &[Attribute],
    secondary_indexes: &[SecondaryIndex],
) -> Result<(), SchemaError> {
    let mut fields = Namespace::default();
    for attribute in attributes.iter().chain(common_attributes) {
        fields.claim(&attribute.name, &attribute.identifier)?;
    }
    let mut indexes = Namespace::default();
    for index in secondary_indexes {
        if index.identifier.is_empty() {
            return Err(SchemaError::EmptyIdentifier {
                name: index.name.clone(),
            });
        }
        indexes.claim(&index.name, &index.identifier)?;
        for key in index.composite_keys() {
            if key.identifier.is_empty() {
                return Err(SchemaError::EmptyIdentifier {
                    name: key.name.clone(),
                });
            }
            fields.claim(&key.name, &key.identifier)?;
        }
    }
    Ok(())
}
