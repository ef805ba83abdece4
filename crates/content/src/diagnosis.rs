//! Differential diagnosis records.
//!
//! A [`DifferentialDiagnosis`] is immutable reference data: it is parsed once from the
//! `diagnoses.yaml` document and never mutated afterwards.
//!
//! Notes:
//! - All structs use `#[serde(deny_unknown_fields)]`; a misspelt key is a load failure, not a
//!   silently dropped field
//! - Optional sections (lab/imaging findings, differentiating tests, alarm tags) default to
//!   empty

use crate::vocabulary::{
    BodySystem, DiagnosisCategory, HighlightColor, InvolvementType, Likelihood, Timeframe,
    Urgency,
};
use crate::{parse_document, ContentError};
use ddx_types::{ConceptId, NonEmptyText};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// Public domain-level types
// ============================================================================

/// A candidate condition with everything needed to explain and visualise it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DifferentialDiagnosis {
    pub diagnosis_id: ConceptId,
    pub name: NonEmptyText,
    pub category: DiagnosisCategory,
    pub likelihood: Likelihood,
    pub pathophysiology: Pathophysiology,
    pub affected_anatomy: Vec<AffectedAnatomy>,
    pub clinical_features: ClinicalFeatureSet,
    #[serde(default)]
    pub red_flags: Vec<AlarmSymptom>,
    pub workup: DiagnosticWorkup,
    pub treatment_overview: NonEmptyText,
    pub prognosis: NonEmptyText,
    pub care_guidance: CareGuidance,
    pub explanations: ExplanationLadder,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Pathophysiology {
    pub mechanism: NonEmptyText,
    /// Ordered progression steps.
    pub progression: Vec<NonEmptyText>,
    #[serde(default)]
    pub risk_factors: Vec<NonEmptyText>,
    #[serde(default)]
    pub protective_factors: Vec<NonEmptyText>,
}

/// An anatomical structure involved by a diagnosis, used to drive the visual overlay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AffectedAnatomy {
    pub structure_id: ConceptId,
    pub structure_name: NonEmptyText,
    pub system: BodySystem,
    pub involvement_type: InvolvementType,
    pub highlight_color: HighlightColor,
    pub pathologic_change: NonEmptyText,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ClinicalFeatureSet {
    pub typical_presentation: NonEmptyText,
    #[serde(default)]
    pub symptom_frequencies: Vec<SymptomFrequency>,
    #[serde(default)]
    pub physical_signs: Vec<NonEmptyText>,
    #[serde(default)]
    pub lab_findings: Vec<NonEmptyText>,
    #[serde(default)]
    pub imaging_findings: Vec<NonEmptyText>,
}

/// One row of the symptom frequency table, e.g. `nausea: ~40%`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SymptomFrequency {
    pub symptom: NonEmptyText,
    pub frequency: NonEmptyText,
}

/// A red-flag finding that raises suspicion for a serious diagnosis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AlarmSymptom {
    /// Text pattern matched against reported symptoms.
    pub symptom: NonEmptyText,
    /// Controlled-vocabulary identifiers that trigger this alarm on exact match.
    #[serde(default)]
    pub tags: Vec<ConceptId>,
    pub concern: NonEmptyText,
    pub action: NonEmptyText,
    pub timeframe: Timeframe,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticWorkup {
    pub first_line: Vec<NonEmptyText>,
    #[serde(default)]
    pub second_line: Vec<NonEmptyText>,
    #[serde(default)]
    pub gold_standard: Option<NonEmptyText>,
    #[serde(default)]
    pub differentiating_tests: Vec<DifferentiatingTest>,
}

/// Which test separates this diagnosis from a look-alike.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DifferentiatingTest {
    pub versus: NonEmptyText,
    pub test: NonEmptyText,
    pub finding: NonEmptyText,
}

/// Where and how fast to seek care for a diagnosis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CareGuidance {
    pub urgency: Urgency,
    pub setting: NonEmptyText,
    pub reasoning: NonEmptyText,
    #[serde(default)]
    pub immediate_actions: Vec<NonEmptyText>,
}

/// Five explanations of the same diagnosis, from lay language (1) to specialist depth (5).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ExplanationLadder {
    pub level1: NonEmptyText,
    pub level2: NonEmptyText,
    pub level3: NonEmptyText,
    pub level4: NonEmptyText,
    pub level5: NonEmptyText,
}

impl ExplanationLadder {
    /// Returns the explanation at `level` (1-5), or `None` outside that range.
    pub fn level(&self, level: u8) -> Option<&NonEmptyText> {
        match level {
            1 => Some(&self.level1),
            2 => Some(&self.level2),
            3 => Some(&self.level3),
            4 => Some(&self.level4),
            5 => Some(&self.level5),
            _ => None,
        }
    }
}

/// The parsed `diagnoses.yaml` document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosesDocument {
    pub version: NonEmptyText,
    pub diagnoses: Vec<DifferentialDiagnosis>,
}

// ============================================================================
// Public DiagnosisCatalogue operations
// ============================================================================

/// Diagnosis catalogue operations.
///
/// This is a zero-sized type used for namespacing; all methods are associated functions.
pub struct DiagnosisCatalogue;

impl DiagnosisCatalogue {
    /// Parse the diagnoses document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::SchemaMismatch`] (with the failing path, e.g.
    /// `diagnoses[2].care_guidance.urgency`) if the YAML does not match the schema, including
    /// unknown keys, blank text, malformed identifiers or colours.
    pub fn parse(yaml_text: &str) -> Result<DiagnosesDocument, ContentError> {
        parse_document("diagnoses", yaml_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"version: "test-1"
diagnoses:
  - diagnosis_id: appendicitis
    name: Acute appendicitis
    category: gastrointestinal
    likelihood: likely
    pathophysiology:
      mechanism: Luminal obstruction of the appendix leads to inflammation.
      progression:
        - Luminal obstruction
        - Bacterial overgrowth
      risk_factors:
        - Age 10-30
    affected_anatomy:
      - structure_id: appendix
        structure_name: Vermiform appendix
        system: digestive
        involvement_type: primary
        highlight_color: "#E74C3C"
        pathologic_change: Inflamed, distended appendix
    clinical_features:
      typical_presentation: Periumbilical pain migrating to the right lower quadrant.
      symptom_frequencies:
        - symptom: Anorexia
          frequency: "~80%"
    red_flags:
      - symptom: Rigid abdomen
        tags: [rigid-abdomen]
        concern: Perforation with peritonitis
        action: Go to the emergency department
        timeframe: immediate
    workup:
      first_line:
        - CBC
      gold_standard: CT abdomen
    treatment_overview: Appendectomy.
    prognosis: Excellent when treated before perforation.
    care_guidance:
      urgency: emergency
      setting: Emergency department
      reasoning: Risk of perforation.
    explanations:
      level1: A small pouch of the bowel is inflamed.
      level2: The appendix is blocked and infected.
      level3: Obstruction leads to distension and ischemia.
      level4: Luminal obstruction raises intraluminal pressure.
      level5: Transmural inflammation progresses to gangrene.
"##;

    #[test]
    fn parses_sample_document() {
        let doc = DiagnosisCatalogue::parse(SAMPLE).expect("parse yaml");
        assert_eq!(doc.version.as_str(), "test-1");
        assert_eq!(doc.diagnoses.len(), 1);

        let dx = &doc.diagnoses[0];
        assert_eq!(dx.diagnosis_id.as_str(), "appendicitis");
        assert_eq!(dx.likelihood, Likelihood::Likely);
        assert_eq!(dx.affected_anatomy[0].highlight_color.as_str(), "#e74c3c");
        assert_eq!(dx.red_flags[0].timeframe, Timeframe::Immediate);
        assert_eq!(dx.red_flags[0].tags[0].as_str(), "rigid-abdomen");
        assert_eq!(dx.care_guidance.urgency, Urgency::Emergency);
        assert!(dx.care_guidance.immediate_actions.is_empty());
        assert!(dx.workup.second_line.is_empty());
        assert_eq!(
            dx.explanations.level(3).map(|t| t.as_str()),
            Some("Obstruction leads to distension and ischemia.")
        );
        assert!(dx.explanations.level(0).is_none());
        assert!(dx.explanations.level(6).is_none());
    }

    #[test]
    fn rejects_unknown_keys_with_path() {
        let input = SAMPLE.replace("    prognosis:", "    outlook: good\n    prognosis:");
        let err = DiagnosisCatalogue::parse(&input).expect_err("should reject unknown key");
        match err {
            ContentError::SchemaMismatch { path, message, .. } => {
                assert!(path.starts_with("diagnoses[0]"), "path was {path}");
                assert!(message.contains("outlook"));
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_urgency() {
        let input = SAMPLE.replace("urgency: emergency", "urgency: whenever");
        let err = DiagnosisCatalogue::parse(&input).expect_err("should reject urgency");
        match err {
            ContentError::SchemaMismatch { path, .. } => {
                assert!(path.ends_with("care_guidance.urgency"), "path was {path}");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_identifier() {
        let input = SAMPLE.replace("structure_id: appendix", "structure_id: Appendix");
        let err = DiagnosisCatalogue::parse(&input).expect_err("should reject id");
        match err {
            ContentError::SchemaMismatch { path, message, .. } => {
                assert_eq!(path, "diagnoses[0].affected_anatomy[0].structure_id");
                assert!(message.contains("invalid identifier"));
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_highlight_colour() {
        let input = SAMPLE.replace("\"#E74C3C\"", "crimson");
        let err = DiagnosisCatalogue::parse(&input).expect_err("should reject colour");
        assert!(err.to_string().contains("highlight_color"));
    }

    #[test]
    fn rejects_blank_text() {
        let input = SAMPLE.replace(
            "prognosis: Excellent when treated before perforation.",
            "prognosis: \"  \"",
        );
        let err = DiagnosisCatalogue::parse(&input).expect_err("should reject blank text");
        assert!(err.to_string().contains("prognosis"));
    }

    #[test]
    fn rejects_missing_explanation_level() {
        let input = SAMPLE.replace(
            "      level5: Transmural inflammation progresses to gangrene.\n",
            "",
        );
        let err = DiagnosisCatalogue::parse(&input).expect_err("should require level5");
        assert!(err.to_string().contains("level5"));
    }
}
