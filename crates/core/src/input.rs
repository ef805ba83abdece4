//! Query inputs.

use ddx_types::ConceptId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Self-reported sex, matched against sex-specific risk factors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Sex {
    Female,
    Male,
    Other,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
            Sex::Other => "other",
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => Ok(Sex::Female),
            "male" | "m" => Ok(Sex::Male),
            "other" => Ok(Sex::Other),
            other => Err(format!("unknown sex '{other}' (expected female, male or other)")),
        }
    }
}

/// Optional context that refines the curated ranking.
///
/// Token lists hold short free-text phrases such as `"thunderclap onset"` or `"smoking"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct SymptomModifiers {
    pub duration: Option<String>,
    /// 0 (none) to 10 (worst imaginable).
    pub severity: Option<u8>,
    pub associated_symptoms: Vec<String>,
    pub aggravating_factors: Vec<String>,
    pub relieving_factors: Vec<String>,
    pub medical_history: Vec<String>,
    pub age: Option<u8>,
    pub sex: Option<Sex>,
}

impl SymptomModifiers {
    /// Tokens that may imply a diagnosis's key distinguishing features.
    pub fn feature_tokens(&self) -> impl Iterator<Item = &str> {
        self.associated_symptoms
            .iter()
            .chain(&self.aggravating_factors)
            .chain(&self.relieving_factors)
            .map(String::as_str)
    }

    /// True when nothing here can move a score.
    pub fn is_unscoreable(&self) -> bool {
        self.associated_symptoms.is_empty()
            && self.aggravating_factors.is_empty()
            && self.relieving_factors.is_empty()
            && self.medical_history.is_empty()
            && self.age.is_none()
            && self.sex.is_none()
    }
}

/// A single patient-reported symptom query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UserSymptomInput {
    pub symptom_id: ConceptId,
    #[serde(default)]
    pub modifiers: Option<SymptomModifiers>,
}

impl UserSymptomInput {
    pub fn new(symptom_id: ConceptId) -> Self {
        Self {
            symptom_id,
            modifiers: None,
        }
    }

    pub fn with_modifiers(mut self, modifiers: SymptomModifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }
}
