//! Scoring & ranking of a symptom's curated differential.
//!
//! The curated rank is the baseline: over a list of `n` entries the entry at index `i` starts
//! with `n - i` points. Modifiers only ever add points, and entries are never removed, so every
//! must-not-miss diagnosis survives into the final list.

use crate::constants::{DEMOGRAPHIC_MATCH_WEIGHT, FEATURE_MATCH_WEIGHT, HISTORY_MATCH_WEIGHT};
use crate::input::SymptomModifiers;
use crate::knowledge_base::KnowledgeBase;
use crate::matching::{age_band_matches, implies, sex_matches};
use crate::{DdxError, DdxResult};
use ddx_content::{
    DifferentialDiagnosis, DifferentialEntry, NonEmptyText, SymptomDifferentialList,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Why a score was adjusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreReasonKind {
    KeyFeature,
    MedicalHistory,
    Age,
    Sex,
}

/// One auditable score adjustment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct ScoreReason {
    pub kind: ScoreReasonKind,
    /// The knowledge-base phrase that matched (feature or risk factor).
    pub matched: String,
    /// The reported value that matched it.
    pub input: String,
    pub weight: i64,
}

/// A curated entry placed in the final, adjusted ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct RankedDifferential {
    pub entry: DifferentialEntry,
    pub diagnosis_name: NonEmptyText,
    /// 1-based position in the final ranking.
    pub position: usize,
    pub score: i64,
    pub adjustment: i64,
    pub reasons: Vec<ScoreReason>,
}

/// Rank the curated differential for `symptom_id`.
///
/// Without modifiers, or with modifiers that carry nothing scoreable, the curated order is
/// returned unchanged.
///
/// # Errors
///
/// - [`DdxError::SymptomNotFound`] if the symptom has no curated list.
/// - [`DdxError::InvariantViolation`] if a must-not-miss entry is missing from the result.
pub fn rank(
    kb: &KnowledgeBase,
    symptom_id: &str,
    modifiers: Option<&SymptomModifiers>,
) -> DdxResult<Vec<RankedDifferential>> {
    let list = kb.require_symptom_list(symptom_id)?;
    let modifiers = modifiers.filter(|m| !m.is_unscoreable());
    let n = list.entries.len() as i64;

    let mut ranked = Vec::with_capacity(list.entries.len());
    for (idx, entry) in list.entries.iter().enumerate() {
        let diagnosis = kb.require_diagnosis(entry.diagnosis_id.as_str())?;
        let reasons = match modifiers {
            Some(m) => score_reasons(entry, diagnosis, m),
            None => Vec::new(),
        };
        let adjustment: i64 = reasons.iter().map(|r| r.weight).sum();
        let base = n - idx as i64;

        ranked.push(RankedDifferential {
            entry: entry.clone(),
            diagnosis_name: diagnosis.name.clone(),
            position: 0,
            score: base + adjustment,
            adjustment,
            reasons,
        });
    }

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.entry.rank.cmp(&b.entry.rank))
    });
    for (idx, item) in ranked.iter_mut().enumerate() {
        item.position = idx + 1;
    }

    ensure_must_not_miss(list, &ranked)?;

    tracing::debug!(
        symptom_id,
        entries = ranked.len(),
        adjusted = ranked.iter().filter(|r| r.adjustment > 0).count(),
        "ranked differential"
    );

    Ok(ranked)
}

fn score_reasons(
    entry: &DifferentialEntry,
    diagnosis: &DifferentialDiagnosis,
    modifiers: &SymptomModifiers,
) -> Vec<ScoreReason> {
    let mut reasons = Vec::new();

    for feature in &entry.key_distinguishing_features {
        if let Some(token) = modifiers
            .feature_tokens()
            .find(|t| implies(t, feature.as_str()))
        {
            reasons.push(ScoreReason {
                kind: ScoreReasonKind::KeyFeature,
                matched: feature.to_string(),
                input: token.to_owned(),
                weight: FEATURE_MATCH_WEIGHT,
            });
        }
    }

    let risk_factors = &diagnosis.pathophysiology.risk_factors;

    for token in &modifiers.medical_history {
        if let Some(rf) = risk_factors.iter().find(|rf| implies(token, rf.as_str())) {
            reasons.push(ScoreReason {
                kind: ScoreReasonKind::MedicalHistory,
                matched: rf.to_string(),
                input: token.clone(),
                weight: HISTORY_MATCH_WEIGHT,
            });
        }
    }

    if let Some(age) = modifiers.age {
        if let Some(rf) = risk_factors
            .iter()
            .find(|rf| age_band_matches(rf.as_str(), age))
        {
            reasons.push(ScoreReason {
                kind: ScoreReasonKind::Age,
                matched: rf.to_string(),
                input: age.to_string(),
                weight: DEMOGRAPHIC_MATCH_WEIGHT,
            });
        }
    }

    if let Some(sex) = modifiers.sex {
        if let Some(rf) = risk_factors.iter().find(|rf| sex_matches(rf.as_str(), sex)) {
            reasons.push(ScoreReason {
                kind: ScoreReasonKind::Sex,
                matched: rf.to_string(),
                input: sex.as_str().to_owned(),
                weight: DEMOGRAPHIC_MATCH_WEIGHT,
            });
        }
    }

    reasons
}

/// Fail if any curated must-not-miss entry is absent from `ranked`.
pub(crate) fn ensure_must_not_miss(
    list: &SymptomDifferentialList,
    ranked: &[RankedDifferential],
) -> DdxResult<()> {
    for required in list.must_not_miss() {
        let present = ranked
            .iter()
            .any(|r| r.entry.diagnosis_id == required.diagnosis_id);
        if !present {
            tracing::error!(
                symptom_id = %list.symptom_id,
                diagnosis_id = %required.diagnosis_id,
                "must-not-miss diagnosis missing from ranked differential"
            );
            return Err(DdxError::InvariantViolation(format!(
                "must-not-miss diagnosis '{}' missing from the ranking for '{}'",
                required.diagnosis_id, list.symptom_id
            )));
        }
    }
    Ok(())
}
