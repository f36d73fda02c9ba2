use crate::schema::composite::{self, CompositeKeyPart};

use std::fmt;

/// A composite key declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompositeKey {
    /// Physical attribute name holding the joined value.
    pub name: String,
    /// Sanitized identifier for the physical attribute.
    pub identifier: String,
    /// Segments in declared order.
    pub parts: Vec<CompositeKeyPart>,
}

impl CompositeKey {
    /// Attribute names of the non-constant parts, in declared order.
    pub fn non_constant_parts(&self) -> Vec<&str> {
        composite::non_constant_parts(&self.parts)
    }
}

/// A hash or range key of a table or index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeySpec {
    /// Key held by a single declared attribute.
    Simple(String),
    /// Key assembled from several segments.
    Composite(CompositeKey),
}

impl KeySpec {
    /// Physical attribute name of the key.
    pub fn name(&self) -> &str {
        match self {
            Self::Simple(name) => name,
            Self::Composite(composite) => &composite.name,
        }
    }

    /// Declared attributes the key reads from.
    pub fn attributes(&self) -> Vec<&str> {
        match self {
            Self::Simple(name) => vec![name.as_str()],
            Self::Composite(composite) => composite.non_constant_parts(),
        }
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much of a record a secondary index copies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Projection {
    /// Every attribute.
    All,
    /// Table and index keys only.
    KeysOnly,
    /// Keys plus the listed attributes.
    Include(Vec<String>),
}

impl Projection {
    /// The projection type as DynamoDB spells it.
    pub const fn projection_type(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::KeysOnly => "KEYS_ONLY",
            Self::Include(_) => "INCLUDE",
        }
    }

    /// Listed non-key attributes; empty unless the projection is INCLUDE.
    pub fn non_key_attributes(&self) -> &[String] {
        match self {
            Self::Include(attributes) => attributes,
            Self::All | Self::KeysOnly => &[],
        }
    }
}

/// One validated secondary index.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecondaryIndex {
    /// Index name.
    pub name: String,
    /// Sanitized identifier.
    pub identifier: String,
    /// Hash key.
    pub hash_key: KeySpec,
    /// Optional range key.
    pub range_key: Option<KeySpec>,
    /// Projection.
    pub projection: Projection,
}

impl SecondaryIndex {
    /// Composite keys declared by the index, hash key first.
    pub fn composite_keys(&self) -> impl Iterator<Item = &CompositeKey> {
        std::iter::once(&self.hash_key)
            .chain(self.range_key.as_ref())
            .filter_map(|key| match key {
                KeySpec::Composite(composite) => Some(composite),
                KeySpec::Simple(_) => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite(parts: Vec<CompositeKeyPart>) -> KeySpec {
        KeySpec::Composite(CompositeKey {
            name: composite::physical_name(&parts),
            identifier: String::new(),
            parts,
        })
    }

    #[test]
    fn test_key_spec_attributes() {
        let simple = KeySpec::Simple("status".to_string());
        assert_eq!(simple.name(), "status");
        assert_eq!(simple.attributes(), vec!["status"]);

        let composite = composite(vec![
            CompositeKeyPart::Constant("POST".to_string()),
            CompositeKeyPart::Attribute("category".to_string()),
        ]);
        assert_eq!(composite.name(), "POST#category");
        assert_eq!(composite.attributes(), vec!["category"]);
    }

    #[test]
    fn test_composite_keys() {
        let index = SecondaryIndex {
            name: "by_category".to_string(),
            identifier: "by_category".to_string(),
            hash_key: composite(vec![
                CompositeKeyPart::Attribute("category".to_string()),
                CompositeKeyPart::Attribute("is_published".to_string()),
            ]),
            range_key: Some(KeySpec::Simple("created_at".to_string())),
            projection: Projection::KeysOnly,
        };
        let names: Vec<_> = index.composite_keys().map(|key| key.name.as_str()).collect();
        assert_eq!(names, vec!["category#is_published"]);
        assert!(index.projection.non_key_attributes().is_empty());
    }
}
