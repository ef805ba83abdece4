//! Read-only catalogue queries over a loaded [`KnowledgeBase`].

use crate::knowledge_base::KnowledgeBase;
use crate::matching::{contains_phrase, normalise};
use crate::red_flags::alarm_matches;
use crate::validation::validate_explanation_level;
use crate::{DdxError, DdxResult};
use ddx_content::{
    AlarmSymptom, DiagnosisCategory, DifferentialDiagnosis, DifferentialEntry, Likelihood,
    NonEmptyText, SymptomDifferentialList,
};

/// How well a symptom matched a search query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchMatch {
    Partial,
    Alias,
    Exact,
}

/// An alarm found by [`KnowledgeBase::search_red_flags`].
#[derive(Clone, Copy, Debug)]
pub struct RedFlagMatch<'a> {
    pub diagnosis: &'a DifferentialDiagnosis,
    pub alarm: &'a AlarmSymptom,
}

impl KnowledgeBase {
    /// Search symptoms by id, name and alias.
    ///
    /// Exact name or id matches come first, then exact alias matches, then partial matches;
    /// authored order breaks ties. A blank query returns every symptom.
    pub fn search_symptoms(&self, query: &str) -> Vec<(&SymptomDifferentialList, SearchMatch)> {
        let query = normalise(query);
        if query.is_empty() {
            return self
                .symptoms()
                .iter()
                .map(|list| (list, SearchMatch::Partial))
                .collect();
        }

        let mut hits: Vec<(&SymptomDifferentialList, SearchMatch)> = self
            .symptoms()
            .iter()
            .filter_map(|list| symptom_match(list, &query).map(|m| (list, m)))
            .collect();
        hits.sort_by(|a, b| b.1.cmp(&a.1));
        hits
    }

    /// Diagnoses in `category`, authored order.
    pub fn diagnoses_by_category(&self, category: DiagnosisCategory) -> Vec<&DifferentialDiagnosis> {
        self.diagnoses()
            .iter()
            .filter(|dx| dx.category == category)
            .collect()
    }

    /// The curated must-not-miss entries for `symptom_id`, rank order.
    pub fn must_not_miss(&self, symptom_id: &str) -> DdxResult<Vec<&DifferentialEntry>> {
        Ok(self.require_symptom_list(symptom_id)?.must_not_miss().collect())
    }

    /// Entries of `symptom_id` with the given likelihood, rank order.
    pub fn entries_by_likelihood(
        &self,
        symptom_id: &str,
        likelihood: Likelihood,
    ) -> DdxResult<Vec<&DifferentialEntry>> {
        Ok(self
            .require_symptom_list(symptom_id)?
            .entries
            .iter()
            .filter(|e| e.likelihood == likelihood)
            .collect())
    }

    /// Every symptom list that references `diagnosis_id`.
    pub fn symptoms_for_diagnosis(
        &self,
        diagnosis_id: &str,
    ) -> DdxResult<Vec<&SymptomDifferentialList>> {
        self.require_diagnosis(diagnosis_id)?;
        Ok(self
            .symptoms()
            .iter()
            .filter(|list| {
                list.entries
                    .iter()
                    .any(|e| e.diagnosis_id.as_str() == diagnosis_id)
            })
            .collect())
    }

    /// Alarms whose tags or symptom text match `query`, or whose concern mentions it.
    pub fn search_red_flags(&self, query: &str) -> Vec<RedFlagMatch<'_>> {
        if normalise(query).is_empty() {
            return Vec::new();
        }

        self.diagnoses()
            .iter()
            .flat_map(|diagnosis| {
                diagnosis
                    .red_flags
                    .iter()
                    .map(move |alarm| RedFlagMatch { diagnosis, alarm })
            })
            .filter(|m| {
                alarm_matches(m.alarm, query) || contains_phrase(m.alarm.concern.as_str(), query)
            })
            .collect()
    }

    /// One rung of a diagnosis's explanation ladder.
    ///
    /// # Errors
    ///
    /// [`DdxError::InvalidInput`] for levels outside 1-5, [`DdxError::DiagnosisNotFound`] for
    /// an unknown id.
    pub fn explanation(&self, diagnosis_id: &str, level: u8) -> DdxResult<&NonEmptyText> {
        validate_explanation_level(level)?;
        let diagnosis = self.require_diagnosis(diagnosis_id)?;
        diagnosis.explanations.level(level).ok_or_else(|| {
            DdxError::InvalidInput(format!("explanation level {level} is not available"))
        })
    }
}

fn symptom_match(list: &SymptomDifferentialList, query: &str) -> Option<SearchMatch> {
    let name = normalise(list.symptom_name.as_str());
    let id = normalise(list.symptom_id.as_str());
    if name == query || id == query {
        return Some(SearchMatch::Exact);
    }

    let aliases: Vec<String> = list.aliases.iter().map(|a| normalise(a.as_str())).collect();
    if aliases.iter().any(|a| a == query) {
        return Some(SearchMatch::Alias);
    }

    let partial = std::iter::once(&name)
        .chain(std::iter::once(&id))
        .chain(aliases.iter())
        .any(|candidate| candidate.contains(query));
    partial.then_some(SearchMatch::Partial)
}
