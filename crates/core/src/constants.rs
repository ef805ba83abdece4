//! Constants used throughout the DDX core crate.

/// Default directory holding the knowledge-base documents.
pub const KNOWLEDGE_BASE_DIR: &str = "knowledge-base";

/// Filename of the diagnosis reference document.
pub const DIAGNOSES_FILENAME: &str = "diagnoses.yaml";

/// Filename of the symptom differential lists document.
pub const SYMPTOMS_FILENAME: &str = "symptoms.yaml";

/// Upper bound on the size of a single knowledge-base document.
pub const MAX_DOCUMENT_BYTES: u64 = 8 * 1024 * 1024;

/// Attached verbatim to every explorer result and every presentation payload.
pub const EDUCATIONAL_DISCLAIMER: &str = "IMPORTANT: This content is for educational purposes \
only and is not intended as medical advice, diagnosis, or treatment. Always consult qualified \
healthcare professionals for medical decisions.";

/// Score added per key distinguishing feature implied by the reported modifiers.
pub const FEATURE_MATCH_WEIGHT: i64 = 2;

/// Score added per medical-history token found among a diagnosis's risk factors.
pub const HISTORY_MATCH_WEIGHT: i64 = 1;

/// Score added when age or sex matches a demographic risk factor.
pub const DEMOGRAPHIC_MATCH_WEIGHT: i64 = 1;

/// Highest accepted symptom severity.
pub const MAX_SEVERITY: u8 = 10;

/// Highest accepted age in years.
pub const MAX_AGE: u8 = 130;

/// Number of rungs on every explanation ladder.
pub const EXPLANATION_LEVELS: u8 = 5;
