use crate::error::SchemaError;

use convert_case::{Case, Casing};
use indexmap::IndexMap;

/// Reserved words of the generated language, lowercase.
pub const RESERVED_WORDS: [&str; 52] = [
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Turns raw schema names into identifiers that are safe in generated code.
///
/// Implementations must be deterministic: the same raw name always yields the
/// same identifier.
pub trait Sanitize {
    /// Sanitize `raw`. An empty result means the name has no usable identifier.
    fn sanitize(&self, raw: &str) -> String;
}

/// Default sanitizer producing snake case identifiers.
///
/// ```rust
/// use dynamodb_gen::schema::sanitize::{Identifiers, Sanitize};
///
/// assert_eq!(Identifiers.sanitize("userName"), "user_name");
/// assert_eq!(Identifiers.sanitize("Type"), "type_");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Identifiers;

/// Whether `word` collides with a reserved word, ignoring case.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(word))
}

impl Sanitize for Identifiers {
    fn sanitize(&self, raw: &str) -> String {
        let replaced: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let words: Vec<_> = replaced.split('_').filter(|word| !word.is_empty()).collect();
        if words.is_empty() {
            return String::new();
        }
        let mut identifier = words.join("_").to_case(Case::Snake);
        if identifier.starts_with(|c: char| c.is_ascii_digit()) {
            identifier.insert(0, '_');
        }
        if is_reserved(&identifier) {
            identifier.push('_');
        }
        identifier
    }
}

/// Sanitize `raw`, rejecting names with no identifier left.
pub(crate) fn identifier_for<S: Sanitize + ?Sized>(
    sanitizer: &S,
    raw: &str,
) -> Result<String, SchemaError> {
    let identifier = sanitizer.sanitize(raw);
    if identifier.is_empty() {
        return Err(SchemaError::EmptyIdentifier {
            name: raw.to_string(),
        });
    }
    Ok(identifier)
}

/// Identifiers handed out within one namespace, mapped to the raw name that claimed them.
#[derive(Debug, Default)]
pub(crate) struct Namespace {
    claimed: IndexMap<String, String>,
}

impl Namespace {
    /// Claim `identifier` for `raw`.
    ///
    /// Claiming again for the same raw name is a no-op; two different raw
    /// names landing on one identifier is an error.
    pub(crate) fn claim(&mut self, raw: &str, identifier: &str) -> Result<(), SchemaError> {
        match self.claimed.get(identifier) {
            Some(first) if first != raw => Err(SchemaError::IdentifierCollision {
                first: first.clone(),
                second: raw.to_string(),
                identifier: identifier.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.claimed.insert(identifier.to_string(), raw.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::plain("user_id", "user_id")]
    #[case::camel("userId", "user_id")]
    #[case::pascal("CreatedAt", "created_at")]
    #[case::hyphen("user-name", "user_name")]
    #[case::space("display name", "display_name")]
    #[case::composite("category#is_published", "category_is_published")]
    #[case::surrounding_separators("__status__", "status")]
    #[case::reserved("type", "type_")]
    #[case::reserved_uppercase("TYPE", "type_")]
    #[case::reserved_mixed_case("Match", "match_")]
    #[case::only_symbols("#!", "")]
    #[case::empty("", "")]
    fn test_sanitize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Identifiers.sanitize(raw), expected);
    }

    #[test]
    fn test_sanitize_is_deterministic() {
        for raw in ["orderTotal", "self", "a-b-c"] {
            assert_eq!(Identifiers.sanitize(raw), Identifiers.sanitize(raw));
        }
    }

    #[test]
    fn test_namespace_collision() {
        let mut namespace = Namespace::default();
        let identifier = identifier_for(&Identifiers, "user_id").unwrap();
        assert_eq!(namespace.claim("user_id", &identifier), Ok(()));
        assert_eq!(namespace.claim("user_id", &identifier), Ok(()));

        let identifier = identifier_for(&Identifiers, "userId").unwrap();
        assert_eq!(
            namespace.claim("userId", &identifier),
            Err(SchemaError::IdentifierCollision {
                first: "user_id".to_string(),
                second: "userId".to_string(),
                identifier: "user_id".to_string(),
            })
        );
    }

    #[test]
    fn test_identifier_for_rejects_empty_identifier() {
        assert_eq!(
            identifier_for(&Identifiers, "##"),
            Err(SchemaError::EmptyIdentifier {
                name: "##".to_string(),
            })
        );
    }
}
