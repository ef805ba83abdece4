//! The query façade: one symptom in, one safety-aware differential out.

use crate::anatomy::{merge_anatomy, AnatomyHighlight};
use crate::constants::EDUCATIONAL_DISCLAIMER;
use crate::input::UserSymptomInput;
use crate::knowledge_base::KnowledgeBase;
use crate::ranking::{rank, RankedDifferential};
use crate::red_flags::{evaluate_red_flags, TriggeredRedFlag};
use crate::validation::validate_input;
use crate::DdxResult;
use ddx_content::{CareGuidance, ConceptId, DifferentialDiagnosis, NonEmptyText};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Everything a presentation layer needs for one symptom query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct DifferentialExplorerResult {
    pub symptom_id: ConceptId,
    pub symptom_name: NonEmptyText,
    pub ranked: Vec<RankedDifferential>,
    pub selected_diagnosis: Option<DifferentialDiagnosis>,
    pub anatomy_highlights: Vec<AnatomyHighlight>,
    pub red_flags_present: Vec<TriggeredRedFlag>,
    pub recommended_action: CareGuidance,
    /// The diagnosis whose care guidance became `recommended_action`.
    pub guidance_source: ConceptId,
    pub disclaimer: String,
}

/// Stateless entry point over a shared knowledge base.
#[derive(Clone, Debug)]
pub struct DifferentialExplorer {
    kb: Arc<KnowledgeBase>,
}

impl DifferentialExplorer {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Rank, evaluate red flags and merge anatomy for one symptom.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the modifiers are out of range
    /// - `SymptomNotFound` if the symptom has no curated differential
    /// - `InvariantViolation` if the ranking lost a must-not-miss entry
    pub fn explore(&self, input: &UserSymptomInput) -> DdxResult<DifferentialExplorerResult> {
        self.explore_with_selection(input, None)
    }

    /// As [`DifferentialExplorer::explore`], also attaching the full record of
    /// `selected_diagnosis_id`.
    pub fn explore_with_selection(
        &self,
        input: &UserSymptomInput,
        selected_diagnosis_id: Option<&str>,
    ) -> DdxResult<DifferentialExplorerResult> {
        validate_input(input)?;

        let symptom_id = input.symptom_id.as_str();
        let list = self.kb.require_symptom_list(symptom_id)?;
        let modifiers = input.modifiers.as_ref();

        let ranked = rank(&self.kb, symptom_id, modifiers)?;
        let assessment = evaluate_red_flags(&self.kb, &ranked, modifiers)?;
        let anatomy_highlights = merge_anatomy(&self.kb, &ranked)?;

        let selected_diagnosis = selected_diagnosis_id
            .map(|id| self.get_diagnosis(id).cloned())
            .transpose()?;

        tracing::debug!(
            symptom_id,
            ranked = ranked.len(),
            red_flags = assessment.triggered.len(),
            urgency = %assessment.aggregate_guidance.urgency,
            "explored differential"
        );

        Ok(DifferentialExplorerResult {
            symptom_id: list.symptom_id.clone(),
            symptom_name: list.symptom_name.clone(),
            ranked,
            selected_diagnosis,
            anatomy_highlights,
            red_flags_present: assessment.triggered,
            recommended_action: assessment.aggregate_guidance,
            guidance_source: assessment.guidance_source,
            disclaimer: EDUCATIONAL_DISCLAIMER.to_owned(),
        })
    }

    /// Look up a diagnosis by id.
    pub fn get_diagnosis(&self, diagnosis_id: &str) -> DdxResult<&DifferentialDiagnosis> {
        self.kb.require_diagnosis(diagnosis_id)
    }
}
