//! Validated primitive types shared by the DDX crates.
//!
//! - [`NonEmptyText`] for free text that must carry content (names, mechanisms, actions)
//! - [`ConceptId`] for stable, normalised identifiers (diagnoses, symptoms, anatomy)

use std::borrow::Borrow;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The identifier exceeded [`ConceptId::MAX_LEN`]
    #[error("identifier exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    /// The identifier contained something other than `a-z`, `0-9` and single inner hyphens
    #[error("invalid identifier '{0}' (only lowercase a-z, 0-9 and single inner '-' allowed)")]
    InvalidIdentifier(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the input is empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

impl<'s> utoipa::ToSchema<'s> for NonEmptyText {
    fn schema() -> (
        &'s str,
        utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
    ) {
        (
            "NonEmptyText",
            utoipa::openapi::ObjectBuilder::new()
                .schema_type(utoipa::openapi::SchemaType::String)
                .description(Some("Trimmed text with at least one non-whitespace character"))
                .into(),
        )
    }
}

/// A stable, normalised identifier such as `acute-coronary-syndrome` or `chest-pain`.
///
/// Identifiers are lowercase ASCII kebab-case: letters, digits and single hyphens between
/// segments. They are the join keys of the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConceptId(String);

impl ConceptId {
    /// Upper bound on identifier length.
    pub const MAX_LEN: usize = 96;

    /// Creates a new `ConceptId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input, [`TextError::TooLong`] above
    /// [`ConceptId::MAX_LEN`], and [`TextError::InvalidIdentifier`] for anything that is not
    /// lowercase kebab-case.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(TextError::TooLong { max: Self::MAX_LEN });
        }

        let chars_ok = trimmed
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'-'));
        let hyphens_ok =
            !trimmed.starts_with('-') && !trimmed.ends_with('-') && !trimmed.contains("--");
        if !chars_ok || !hyphens_ok {
            return Err(TextError::InvalidIdentifier(trimmed.to_owned()));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ConceptId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConceptId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ConceptId {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for ConceptId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for ConceptId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ConceptId::new(&s).map_err(serde::de::Error::custom)
    }
}

impl<'s> utoipa::ToSchema<'s> for ConceptId {
    fn schema() -> (
        &'s str,
        utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
    ) {
        (
            "ConceptId",
            utoipa::openapi::ObjectBuilder::new()
                .schema_type(utoipa::openapi::SchemaType::String)
                .description(Some("Lowercase kebab-case identifier"))
                .pattern(Some("^[a-z0-9]+(-[a-z0-9]+)*$"))
                .into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Chest pain \n").expect("valid text");
        assert_eq!(text.as_str(), "Chest pain");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new(" \t ").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn concept_id_accepts_kebab_case() {
        for id in ["chest-pain", "acute-coronary-syndrome", "t2dm", "age-10-30"] {
            assert!(ConceptId::new(id).is_ok(), "{id} should be accepted");
        }
    }

    #[test]
    fn concept_id_rejects_malformed_identifiers() {
        for id in ["Chest-Pain", "chest pain", "-chest", "chest-", "chest--pain", "chest_pain"] {
            let err = ConceptId::new(id).expect_err("should reject");
            assert!(matches!(err, TextError::InvalidIdentifier(_)), "{id}: {err:?}");
        }
    }

    #[test]
    fn concept_id_rejects_overlong_identifiers() {
        let long = "a".repeat(ConceptId::MAX_LEN + 1);
        assert_eq!(
            ConceptId::new(long).unwrap_err(),
            TextError::TooLong {
                max: ConceptId::MAX_LEN
            }
        );
    }

    #[test]
    fn concept_id_deserialization_validates() {
        let ok: ConceptId = serde_json::from_str("\"appendix\"").expect("valid id");
        assert_eq!(ok.as_str(), "appendix");

        let err = serde_json::from_str::<ConceptId>("\"Appendix\"").expect_err("invalid id");
        assert!(err.to_string().contains("invalid identifier"));
    }

    #[test]
    fn concept_id_borrows_as_str_for_map_lookups() {
        let mut index = std::collections::HashMap::new();
        index.insert(ConceptId::new("migraine").expect("valid id"), 1);
        assert_eq!(index.get("migraine"), Some(&1));
    }
}
