//! Knowledge-base loading and indexing.
//!
//! [`KnowledgeBase`] is built once at startup from the two content documents and is immutable
//! afterwards. Every cross-document rule is enforced here so that the query pipeline can index
//! without re-checking references.

use crate::config::CoreConfig;
use crate::error::IntegrityError;
use crate::{DdxError, DdxResult};
use ddx_content::{
    ConceptId, DiagnosesDocument, DiagnosisCatalogue, DifferentialDiagnosis, NonEmptyText,
    SymptomCatalogue, SymptomDifferentialList, SymptomListsDocument,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Validated, indexed knowledge base.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    version: NonEmptyText,
    diagnoses: Vec<DifferentialDiagnosis>,
    symptom_lists: Vec<SymptomDifferentialList>,
    diagnosis_index: HashMap<ConceptId, usize>,
    symptom_index: HashMap<ConceptId, usize>,
}

impl KnowledgeBase {
    /// Build a knowledge base from already-parsed records.
    ///
    /// Entries of every symptom list are stored sorted by rank ascending.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrityError`] for duplicate ids, empty lists, dangling references,
    /// zero or duplicate ranks, and likelihood copies that disagree with the diagnosis.
    pub fn load(
        version: NonEmptyText,
        diagnoses: Vec<DifferentialDiagnosis>,
        symptom_lists: Vec<SymptomDifferentialList>,
    ) -> Result<Self, IntegrityError> {
        let mut diagnosis_index = HashMap::with_capacity(diagnoses.len());
        for (idx, dx) in diagnoses.iter().enumerate() {
            if diagnosis_index.insert(dx.diagnosis_id.clone(), idx).is_some() {
                return Err(IntegrityError::DuplicateDiagnosis(
                    dx.diagnosis_id.to_string(),
                ));
            }
        }

        let mut symptom_lists = symptom_lists;
        let mut symptom_index = HashMap::with_capacity(symptom_lists.len());
        for (idx, list) in symptom_lists.iter_mut().enumerate() {
            if symptom_index.insert(list.symptom_id.clone(), idx).is_some() {
                return Err(IntegrityError::DuplicateSymptom(list.symptom_id.to_string()));
            }
            check_symptom_list(list, &diagnoses, &diagnosis_index)?;
            list.entries.sort_by_key(|e| e.rank);

            if !list.no_red_flag_differentials && list.must_not_miss().next().is_none() {
                tracing::warn!(
                    symptom_id = %list.symptom_id,
                    "differential has no must-not-miss entry and is not marked as having none"
                );
            }
        }

        tracing::info!(
            version = %version,
            diagnoses = diagnoses.len(),
            symptoms = symptom_lists.len(),
            "knowledge base loaded"
        );

        Ok(Self {
            version,
            diagnoses,
            symptom_lists,
            diagnosis_index,
            symptom_index,
        })
    }

    /// Build a knowledge base from the two parsed documents, which must share a version.
    pub fn from_documents(
        diagnoses: DiagnosesDocument,
        symptoms: SymptomListsDocument,
    ) -> Result<Self, IntegrityError> {
        if diagnoses.version != symptoms.version {
            return Err(IntegrityError::VersionMismatch {
                diagnoses: diagnoses.version.to_string(),
                symptoms: symptoms.version.to_string(),
            });
        }
        Self::load(diagnoses.version, diagnoses.diagnoses, symptoms.symptoms)
    }

    /// Parse both documents from YAML text and load them.
    pub fn from_yaml(diagnoses_yaml: &str, symptoms_yaml: &str) -> DdxResult<Self> {
        let diagnoses = DiagnosisCatalogue::parse(diagnoses_yaml)?;
        let symptoms = SymptomCatalogue::parse(symptoms_yaml)?;
        Ok(Self::from_documents(diagnoses, symptoms)?)
    }

    /// Read, parse and load `diagnoses.yaml` and `symptoms.yaml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> DdxResult<Self> {
        let config = CoreConfig::new(dir.to_path_buf())?;
        Self::load_from_config(&config)
    }

    /// Read, parse and load the documents named by `config`.
    pub fn load_from_config(config: &CoreConfig) -> DdxResult<Self> {
        let diagnoses_yaml = read_document(&config.diagnoses_path())?;
        let symptoms_yaml = read_document(&config.symptoms_path())?;
        Self::from_yaml(&diagnoses_yaml, &symptoms_yaml)
    }

    pub fn version(&self) -> &NonEmptyText {
        &self.version
    }

    /// All diagnoses in authored order.
    pub fn diagnoses(&self) -> &[DifferentialDiagnosis] {
        &self.diagnoses
    }

    /// All symptom lists in authored order, entries sorted by rank.
    pub fn symptoms(&self) -> &[SymptomDifferentialList] {
        &self.symptom_lists
    }

    pub fn diagnosis(&self, diagnosis_id: &str) -> Option<&DifferentialDiagnosis> {
        self.diagnosis_index
            .get(diagnosis_id)
            .map(|&idx| &self.diagnoses[idx])
    }

    pub fn symptom_list(&self, symptom_id: &str) -> Option<&SymptomDifferentialList> {
        self.symptom_index
            .get(symptom_id)
            .map(|&idx| &self.symptom_lists[idx])
    }

    /// Like [`KnowledgeBase::diagnosis`], but absent ids become [`DdxError::DiagnosisNotFound`].
    pub fn require_diagnosis(&self, diagnosis_id: &str) -> DdxResult<&DifferentialDiagnosis> {
        self.diagnosis(diagnosis_id)
            .ok_or_else(|| DdxError::DiagnosisNotFound(diagnosis_id.to_owned()))
    }

    /// Like [`KnowledgeBase::symptom_list`], but absent ids become [`DdxError::SymptomNotFound`].
    pub fn require_symptom_list(&self, symptom_id: &str) -> DdxResult<&SymptomDifferentialList> {
        self.symptom_list(symptom_id)
            .ok_or_else(|| DdxError::SymptomNotFound(symptom_id.to_owned()))
    }
}

fn read_document(path: &Path) -> DdxResult<String> {
    std::fs::read_to_string(path).map_err(|source| DdxError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn check_symptom_list(
    list: &SymptomDifferentialList,
    diagnoses: &[DifferentialDiagnosis],
    diagnosis_index: &HashMap<ConceptId, usize>,
) -> Result<(), IntegrityError> {
    let symptom_id = list.symptom_id.to_string();

    if list.entries.is_empty() {
        return Err(IntegrityError::EmptyDifferentialList(symptom_id));
    }

    let mut ranks = HashSet::new();
    let mut listed = HashSet::new();
    for entry in &list.entries {
        let diagnosis_id = entry.diagnosis_id.as_str();

        let Some(&idx) = diagnosis_index.get(diagnosis_id) else {
            return Err(IntegrityError::DanglingReference {
                symptom_id,
                diagnosis_id: diagnosis_id.to_owned(),
            });
        };
        if entry.rank == 0 {
            return Err(IntegrityError::InvalidRank {
                symptom_id,
                diagnosis_id: diagnosis_id.to_owned(),
                rank: entry.rank,
            });
        }
        if !ranks.insert(entry.rank) {
            return Err(IntegrityError::DuplicateRank {
                symptom_id,
                rank: entry.rank,
            });
        }
        if !listed.insert(diagnosis_id) {
            return Err(IntegrityError::DuplicateEntry {
                symptom_id,
                diagnosis_id: diagnosis_id.to_owned(),
            });
        }

        let canonical = diagnoses[idx].likelihood;
        if entry.likelihood != canonical {
            return Err(IntegrityError::LikelihoodMismatch {
                symptom_id,
                diagnosis_id: diagnosis_id.to_owned(),
                listed: entry.likelihood.to_string(),
                canonical: canonical.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_documents, seed_knowledge_base};
    use ddx_content::Likelihood;

    #[test]
    fn seed_knowledge_base_loads() {
        let kb = seed_knowledge_base();
        assert_eq!(kb.diagnoses().len(), 15);
        assert_eq!(kb.symptoms().len(), 4);
        assert!(kb.diagnosis("appendicitis").is_some());
        assert!(kb.symptom_list("chest-pain").is_some());
    }

    #[test]
    fn every_list_is_non_empty_and_rank_sorted() {
        let kb = seed_knowledge_base();
        for list in kb.symptoms() {
            assert!(!list.entries.is_empty(), "{}", list.symptom_id);
            assert!(list.entries.windows(2).all(|w| w[0].rank < w[1].rank));
        }
    }

    #[test]
    fn every_entry_resolves_to_its_diagnosis() {
        let kb = seed_knowledge_base();
        for list in kb.symptoms() {
            for entry in &list.entries {
                let dx = kb.diagnosis(entry.diagnosis_id.as_str()).expect("resolves");
                assert_eq!(dx.diagnosis_id, entry.diagnosis_id);
                assert_eq!(dx.likelihood, entry.likelihood);
            }
        }
    }

    #[test]
    fn entries_are_sorted_by_rank_regardless_of_authored_order() {
        let (diagnoses, mut symptoms) = seed_documents();
        symptoms.symptoms[0].entries.reverse();
        let kb = KnowledgeBase::from_documents(diagnoses, symptoms).expect("loads");
        let ranks: Vec<u32> = kb.symptoms()[0].entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn dangling_reference_is_an_integrity_error() {
        let (diagnoses, mut symptoms) = seed_documents();
        symptoms.symptoms[0].entries[0].diagnosis_id =
            ConceptId::new("nonexistent-dx").expect("valid id");

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("dangling");
        assert_eq!(
            err,
            IntegrityError::DanglingReference {
                symptom_id: "chest-pain".into(),
                diagnosis_id: "nonexistent-dx".into(),
            }
        );
    }

    #[test]
    fn duplicate_rank_is_rejected() {
        let (diagnoses, mut symptoms) = seed_documents();
        symptoms.symptoms[0].entries[1].rank = 1;

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("dup rank");
        assert!(matches!(err, IntegrityError::DuplicateRank { rank: 1, .. }));
    }

    #[test]
    fn rank_zero_is_rejected() {
        let (diagnoses, mut symptoms) = seed_documents();
        symptoms.symptoms[1].entries[0].rank = 0;

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("rank 0");
        assert!(matches!(err, IntegrityError::InvalidRank { rank: 0, .. }));
    }

    #[test]
    fn duplicate_diagnosis_is_rejected() {
        let (mut diagnoses, symptoms) = seed_documents();
        let copy = diagnoses.diagnoses[0].clone();
        diagnoses.diagnoses.push(copy);

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("dup dx");
        assert_eq!(
            err,
            IntegrityError::DuplicateDiagnosis("costochondritis".into())
        );
    }

    #[test]
    fn duplicate_symptom_is_rejected() {
        let (diagnoses, mut symptoms) = seed_documents();
        let copy = symptoms.symptoms[0].clone();
        symptoms.symptoms.push(copy);

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("dup symptom");
        assert_eq!(err, IntegrityError::DuplicateSymptom("chest-pain".into()));
    }

    #[test]
    fn same_diagnosis_twice_in_one_list_is_rejected() {
        let (diagnoses, mut symptoms) = seed_documents();
        let mut copy = symptoms.symptoms[0].entries[0].clone();
        copy.rank = 99;
        symptoms.symptoms[0].entries.push(copy);

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("dup entry");
        assert!(matches!(err, IntegrityError::DuplicateEntry { .. }));
    }

    #[test]
    fn empty_list_is_rejected() {
        let (diagnoses, mut symptoms) = seed_documents();
        symptoms.symptoms[2].entries.clear();

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("empty");
        assert_eq!(
            err,
            IntegrityError::EmptyDifferentialList("abdominal-pain".into())
        );
    }

    #[test]
    fn likelihood_copy_must_match_diagnosis() {
        let (diagnoses, mut symptoms) = seed_documents();
        symptoms.symptoms[0].entries[0].likelihood = Likelihood::RareButSerious;

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("mismatch");
        match err {
            IntegrityError::LikelihoodMismatch {
                listed, canonical, ..
            } => {
                assert_eq!(listed, "rare-but-serious");
                assert_eq!(canonical, "most-likely");
            }
            other => panic!("expected LikelihoodMismatch, got {other:?}"),
        }
    }

    #[test]
    fn document_versions_must_agree() {
        let (diagnoses, mut symptoms) = seed_documents();
        symptoms.version = NonEmptyText::new("1999.01").expect("valid text");

        let err = KnowledgeBase::from_documents(diagnoses, symptoms).expect_err("versions");
        assert!(matches!(err, IntegrityError::VersionMismatch { .. }));
    }

    #[test]
    fn missing_must_not_miss_is_tolerated() {
        let (diagnoses, mut symptoms) = seed_documents();
        for entry in &mut symptoms.symptoms[0].entries {
            entry.must_not_miss = false;
        }
        assert!(KnowledgeBase::from_documents(diagnoses, symptoms).is_ok());
    }

    #[test]
    fn load_from_dir_reads_bundled_documents() {
        let dir = crate::config::resolve_knowledge_base_dir(None).expect("bundled dir");
        let kb = KnowledgeBase::load_from_dir(&dir).expect("loads");
        assert_eq!(kb.version().as_str(), "2026.10");
    }

    #[test]
    fn require_lookups_return_not_found() {
        let kb = seed_knowledge_base();
        assert!(matches!(
            kb.require_symptom_list("unknown-symptom-xyz"),
            Err(DdxError::SymptomNotFound(_))
        ));
        assert!(matches!(
            kb.require_diagnosis("nonexistent-dx"),
            Err(DdxError::DiagnosisNotFound(_))
        ));
    }

    #[test]
    fn content_errors_surface_through_from_yaml() {
        let err = KnowledgeBase::from_yaml("version: x\n", "version: x\nsymptoms: []\n")
            .expect_err("missing diagnoses");
        assert!(matches!(err, DdxError::Content(_)));
    }
}
