//! Content knowledge base model for the DDX engine.
//!
//! This crate provides the **domain model** and **strict YAML parsing** for the two
//! knowledge-base documents the engine consumes:
//! - `diagnoses.yaml`: [`DifferentialDiagnosis`] reference records
//! - `symptoms.yaml`: curated [`SymptomDifferentialList`]s keyed by symptom id
//!
//! This crate focuses on shape: closed vocabularies, non-blank text, well-formed identifiers
//! and colours. Cross-document rules (references resolve, ranks are unique) belong to the
//! loader in `ddx-core`.

pub mod diagnosis;
pub mod symptom_list;
pub mod vocabulary;

// Re-export facades
pub use diagnosis::DiagnosisCatalogue;
pub use symptom_list::SymptomCatalogue;

// Re-export public domain-level types
pub use diagnosis::{
    AffectedAnatomy, AlarmSymptom, CareGuidance, ClinicalFeatureSet, DiagnosesDocument,
    DiagnosticWorkup, DifferentialDiagnosis, DifferentiatingTest, ExplanationLadder,
    Pathophysiology, SymptomFrequency,
};
pub use symptom_list::{DifferentialEntry, SymptomDifferentialList, SymptomListsDocument};
pub use vocabulary::{
    BodySystem, DiagnosisCategory, HighlightColor, InvolvementType, Likelihood, Timeframe,
    Urgency,
};

pub use ddx_types::{ConceptId, NonEmptyText};

/// Errors returned by the `ddx-content` crate.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{document} schema mismatch at {path}: {message}")]
    SchemaMismatch {
        document: &'static str,
        path: String,
        message: String,
    },
}

/// Type alias for Results that can fail with a [`ContentError`].
pub type ContentResult<T> = Result<T, ContentError>;

/// Deserialize a YAML document, reporting the path of the first failing field.
///
/// Uses `serde_path_to_error` so that a schema mismatch names the offending location
/// (e.g. `symptoms[1].entries[0].rank`) rather than only a line/column.
pub(crate) fn parse_document<T>(document: &'static str, yaml_text: &str) -> ContentResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    serde_path_to_error::deserialize::<_, T>(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_owned()
        } else {
            path
        };
        ContentError::SchemaMismatch {
            document,
            path,
            message: source.to_string(),
        }
    })
}
