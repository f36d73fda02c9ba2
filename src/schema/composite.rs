//! Composite keys: one physical key built from several attribute values and
//! literals joined by [`SEPARATOR`].
//!
//! Both the write path ([`crate::marshal`]) and the query path
//! ([`crate::plan`]) build composite values through this module only, so a
//! key written by one always matches a key looked up by the other.

use crate::{common::value::Value, error::CompositeError};

use indexmap::IndexMap;
use std::fmt;

/// Separator between composite key segments.
pub const SEPARATOR: char = '#';

/// Prefix marking a constant segment in the string form of a composite key.
pub const CONSTANT_PREFIX: &str = "const:";

/// Optional prefix marking an attribute segment in the string form of a composite key.
pub const ATTRIBUTE_PREFIX: &str = "var:";

/// One segment of a composite key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CompositeKeyPart {
    /// A literal written as is.
    Constant(String),
    /// The value of the named attribute.
    Attribute(String),
}

impl CompositeKeyPart {
    /// Whether the part is a literal.
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// The literal or the attribute name.
    pub fn value(&self) -> &str {
        match self {
            Self::Constant(value) | Self::Attribute(value) => value,
        }
    }

    /// Parse one segment of the string form (`const:USER`, `var:user_id`, `user_id`).
    pub fn parse(segment: &str) -> Self {
        if let Some(literal) = segment.strip_prefix(CONSTANT_PREFIX) {
            Self::Constant(literal.to_string())
        } else if let Some(attribute) = segment.strip_prefix(ATTRIBUTE_PREFIX) {
            Self::Attribute(attribute.to_string())
        } else {
            Self::Attribute(segment.to_string())
        }
    }
}

impl fmt::Display for CompositeKeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "{CONSTANT_PREFIX}{value}"),
            Self::Attribute(value) => write!(f, "{ATTRIBUTE_PREFIX}{value}"),
        }
    }
}

/// Attribute names of the non-constant parts, in declared order.
///
/// Tells callers how many values to supply to [`build`] and for which attributes.
pub fn non_constant_parts(parts: &[CompositeKeyPart]) -> Vec<&str> {
    parts
        .iter()
        .filter_map(|part| match part {
            CompositeKeyPart::Attribute(attribute) => Some(attribute.as_str()),
            CompositeKeyPart::Constant(_) => None,
        })
        .collect()
}

/// Physical attribute name of a composite key: each part's literal or
/// attribute name, joined by the separator.
pub fn physical_name(parts: &[CompositeKeyPart]) -> String {
    let segments: Vec<_> = parts.iter().map(CompositeKeyPart::value).collect();
    segments.join(&SEPARATOR.to_string())
}

/// Build the composite value from `supplied` attribute values.
///
/// ```rust
/// use dynamodb_gen::{common::value::Value, schema::composite::{self, CompositeKeyPart}};
/// use std::collections::HashMap;
///
/// let parts = [
///     CompositeKeyPart::Constant("POST".to_string()),
///     CompositeKeyPart::Attribute("category".to_string()),
/// ];
/// let supplied = HashMap::from([("category", Value::from("tech"))]);
/// assert_eq!(composite::build(&parts, |name| supplied.get(name)).unwrap(), "POST#tech");
/// ```
pub fn build<'a, F>(parts: &[CompositeKeyPart], supplied: F) -> Result<String, CompositeError>
where
    F: Fn(&str) -> Option<&'a Value>,
{
    let mut segments = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            CompositeKeyPart::Constant(literal) => segments.push(literal.clone()),
            CompositeKeyPart::Attribute(attribute) => {
                let value = supplied(attribute).ok_or_else(|| CompositeError::MissingValue {
                    attribute: attribute.clone(),
                })?;
                let segment =
                    value
                        .as_key_segment()
                        .ok_or_else(|| CompositeError::UnsupportedValue {
                            attribute: attribute.clone(),
                            kind: value.kind(),
                        })?;
                if segment.contains(SEPARATOR) {
                    return Err(CompositeError::SeparatorInValue {
                        attribute: attribute.clone(),
                        separator: SEPARATOR,
                    });
                }
                segments.push(segment);
            }
        }
    }
    Ok(segments.join(&SEPARATOR.to_string()))
}

/// Split a composite value back into its attribute segments.
///
/// Constant segments are checked against their literal and left out of the result.
pub fn split(
    parts: &[CompositeKeyPart],
    key: &str,
) -> Result<IndexMap<String, String>, CompositeError> {
    let segments: Vec<_> = key.split(SEPARATOR).collect();
    if segments.len() != parts.len() {
        return Err(CompositeError::PartCountMismatch {
            expected: parts.len(),
            found: segments.len(),
        });
    }
    let mut values = IndexMap::with_capacity(parts.len());
    for (part, segment) in parts.iter().zip(segments) {
        match part {
            CompositeKeyPart::Constant(literal) if literal != segment => {
                return Err(CompositeError::ConstantMismatch {
                    expected: literal.clone(),
                    found: segment.to_string(),
                });
            }
            CompositeKeyPart::Constant(_) => {}
            CompositeKeyPart::Attribute(attribute) => {
                values.insert(attribute.clone(), segment.to_string());
            }
        }
    }
    Ok(values)
}
