use ddx_content::ContentError;
use std::path::PathBuf;

/// Knowledge-base integrity failures detected at load time.
///
/// Any of these aborts start-up: a partially consistent knowledge base is never served.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("symptom '{symptom_id}' references unknown diagnosis '{diagnosis_id}'")]
    DanglingReference {
        symptom_id: String,
        diagnosis_id: String,
    },
    #[error("symptom '{symptom_id}' uses rank {rank} more than once")]
    DuplicateRank { symptom_id: String, rank: u32 },
    #[error("symptom '{symptom_id}' has rank {rank} for '{diagnosis_id}' (ranks start at 1)")]
    InvalidRank {
        symptom_id: String,
        diagnosis_id: String,
        rank: u32,
    },
    #[error("diagnosis '{0}' is defined more than once")]
    DuplicateDiagnosis(String),
    #[error("symptom '{0}' is defined more than once")]
    DuplicateSymptom(String),
    #[error("symptom '{symptom_id}' lists diagnosis '{diagnosis_id}' more than once")]
    DuplicateEntry {
        symptom_id: String,
        diagnosis_id: String,
    },
    #[error("symptom '{0}' has an empty differential list")]
    EmptyDifferentialList(String),
    #[error(
        "symptom '{symptom_id}' lists '{diagnosis_id}' as {listed}, but the diagnosis is {canonical}"
    )]
    LikelihoodMismatch {
        symptom_id: String,
        diagnosis_id: String,
        listed: String,
        canonical: String,
    },
    #[error("diagnoses version '{diagnoses}' does not match symptoms version '{symptoms}'")]
    VersionMismatch { diagnoses: String, symptoms: String },
}

/// Errors returned by the DDX engine.
#[derive(Debug, thiserror::Error)]
pub enum DdxError {
    #[error("knowledge base integrity error: {0}")]
    Integrity(#[from] IntegrityError),
    #[error("no differential is available for symptom '{0}'")]
    SymptomNotFound(String),
    #[error("no diagnosis found with id '{0}'")]
    DiagnosisNotFound(String),
    #[error("ranking invariant violated: {0}")]
    InvariantViolation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl DdxError {
    /// True for the recoverable "nothing known about this id" errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DdxError::SymptomNotFound(_) | DdxError::DiagnosisNotFound(_)
        )
    }

    /// True for errors that indicate a broken knowledge base or engine rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DdxError::Integrity(_)
                | DdxError::InvariantViolation(_)
                | DdxError::FileRead { .. }
                | DdxError::Content(_)
        )
    }
}

pub type DdxResult<T> = std::result::Result<T, DdxError>;
