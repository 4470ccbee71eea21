//! Validated Cypher identifiers.
//!
//! Labels and relationship types cannot be passed as query parameters, so
//! the few places that splice them into Cypher text go through [`Label`].

use std::fmt;

use crate::error::AppError;

/// A node label or relationship type that is safe to splice into Cypher.
///
/// Only `[A-Za-z_][A-Za-z0-9_]*` is accepted. [`Display`](fmt::Display)
/// renders the back-quoted form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Result<Self, AppError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Self(name))
        } else {
            Err(AppError::InvalidIdentifier(name))
        }
    }

    /// Turns free-form dataset text into an identifier.
    ///
    /// Every character outside `[A-Za-z0-9_]` becomes `_`, a leading digit
    /// gets a `_` prefix, and empty input falls back to `fallback`.
    pub fn sanitize(raw: &str, fallback: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self(fallback.to_string());
        }
        let mut name: String = trimmed
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_identifiers() {
        assert_eq!(Label::new("evidence_for").unwrap().to_string(), "`evidence_for`");
        assert!(Label::new("_Private1").is_ok());
    }

    #[test]
    fn test_rejects_injection() {
        let err = Label::new("Entity`) DETACH DELETE (n").unwrap_err();
        assert!(matches!(err, AppError::InvalidIdentifier(_)));
        assert!(Label::new("").is_err());
        assert!(Label::new("1abc").is_err());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(Label::sanitize("is colleague of", "X").as_str(), "is_colleague_of");
        assert_eq!(Label::sanitize("3rd-party", "X").as_str(), "_3rd_party");
        assert_eq!(Label::sanitize("  ", "RELATED_TO").as_str(), "RELATED_TO");
    }
}
