//! Curated symptom → differential lists.
//!
//! Each [`SymptomDifferentialList`] maps one normalised symptom id to a hand-ranked list of
//! [`DifferentialEntry`] records. Rank 1 is the most likely diagnosis in that symptom
//! context.

use crate::vocabulary::Likelihood;
use crate::{parse_document, ContentError};
use ddx_types::{ConceptId, NonEmptyText};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The curated differential for one presenting symptom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SymptomDifferentialList {
    pub symptom_id: ConceptId,
    pub symptom_name: NonEmptyText,
    #[serde(default)]
    pub aliases: Vec<NonEmptyText>,
    /// Set when the authors confirm this symptom has no must-not-miss differentials.
    #[serde(default)]
    pub no_red_flag_differentials: bool,
    pub entries: Vec<DifferentialEntry>,
}

impl SymptomDifferentialList {
    /// Entries flagged must-not-miss, in stored order.
    pub fn must_not_miss(&self) -> impl Iterator<Item = &DifferentialEntry> {
        self.entries.iter().filter(|e| e.must_not_miss)
    }
}

/// One candidate diagnosis within a symptom's differential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct DifferentialEntry {
    pub diagnosis_id: ConceptId,
    pub rank: u32,
    /// Denormalised copy of the diagnosis's likelihood, checked at load.
    pub likelihood: Likelihood,
    #[serde(default)]
    pub key_distinguishing_features: Vec<NonEmptyText>,
    #[serde(default)]
    pub must_not_miss: bool,
}

/// The parsed `symptoms.yaml` document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SymptomListsDocument {
    pub version: NonEmptyText,
    pub symptoms: Vec<SymptomDifferentialList>,
}

/// Symptom catalogue operations.
pub struct SymptomCatalogue;

impl SymptomCatalogue {
    /// Parse the symptom lists document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::SchemaMismatch`] if the YAML does not match the schema.
    pub fn parse(yaml_text: &str) -> Result<SymptomListsDocument, ContentError> {
        parse_document("symptoms", yaml_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"version: "test-1"
symptoms:
  - symptom_id: headache
    symptom_name: Headache
    aliases: [cephalalgia, head pain]
    entries:
      - diagnosis_id: tension-headache
        rank: 1
        likelihood: most-likely
        key_distinguishing_features:
          - Band-like pressure
      - diagnosis_id: subarachnoid-hemorrhage
        rank: 3
        likelihood: rare-but-serious
        key_distinguishing_features:
          - Thunderclap onset
        must_not_miss: true
"#;

    #[test]
    fn parses_sample_document() {
        let doc = SymptomCatalogue::parse(SAMPLE).expect("parse yaml");
        let list = &doc.symptoms[0];
        assert_eq!(list.symptom_id.as_str(), "headache");
        assert_eq!(list.aliases.len(), 2);
        assert!(!list.no_red_flag_differentials);
        assert_eq!(list.entries[1].rank, 3);
        assert_eq!(list.entries[1].likelihood, Likelihood::RareButSerious);

        let must: Vec<_> = list.must_not_miss().map(|e| e.diagnosis_id.as_str()).collect();
        assert_eq!(must, vec!["subarachnoid-hemorrhage"]);
    }

    #[test]
    fn must_not_miss_defaults_to_false() {
        let doc = SymptomCatalogue::parse(SAMPLE).expect("parse yaml");
        assert!(!doc.symptoms[0].entries[0].must_not_miss);
    }

    #[test]
    fn rejects_negative_rank() {
        let input = SAMPLE.replace("rank: 3", "rank: -3");
        let err = SymptomCatalogue::parse(&input).expect_err("should reject negative rank");
        match err {
            ContentError::SchemaMismatch { path, .. } => {
                assert_eq!(path, "symptoms[0].entries[1].rank");
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_likelihood() {
        let input = SAMPLE.replace("likelihood: most-likely", "likelihood: probable");
        let err = SymptomCatalogue::parse(&input).expect_err("should reject likelihood");
        assert!(err.to_string().contains("symptoms[0].entries[0].likelihood"));
    }
}
