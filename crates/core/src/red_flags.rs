//! Red-flag evaluation and aggregate care guidance.

use crate::input::SymptomModifiers;
use crate::knowledge_base::KnowledgeBase;
use crate::matching::{implies, slug};
use crate::ranking::RankedDifferential;
use crate::{DdxError, DdxResult};
use ddx_content::{AlarmSymptom, CareGuidance, ConceptId, NonEmptyText};
use serde::Serialize;
use std::cmp::Reverse;
use utoipa::ToSchema;

/// What caused an alarm to be surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RedFlagTrigger {
    /// A reported associated symptom matched the alarm's tags or text.
    ReportedSymptom,
    /// No associated symptoms were reported, so every alarm of a must-not-miss entry is
    /// surfaced as a potential red flag.
    MustNotMiss,
}

/// An alarm symptom raised for one diagnosis in the ranking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct TriggeredRedFlag {
    pub diagnosis_id: ConceptId,
    pub diagnosis_name: NonEmptyText,
    /// Position of the diagnosis in the final ranking.
    pub position: usize,
    pub alarm: AlarmSymptom,
    pub trigger: RedFlagTrigger,
    /// The reported token that matched, for [`RedFlagTrigger::ReportedSymptom`].
    pub matched: Option<String>,
}

/// Outcome of red-flag evaluation for a ranked differential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct RedFlagAssessment {
    /// Ordered by timeframe urgency, then position, then authored order.
    pub triggered: Vec<TriggeredRedFlag>,
    pub aggregate_guidance: CareGuidance,
    /// The diagnosis whose guidance was chosen.
    pub guidance_source: ConceptId,
}

/// Evaluate every alarm of every ranked diagnosis.
///
/// Aggregate guidance is the most urgent guidance among diagnoses with at least one triggered
/// flag (ties go to the better position). With nothing triggered it falls back to the
/// top-ranked diagnosis.
///
/// # Errors
///
/// Returns [`DdxError::InvariantViolation`] for an empty ranking. An empty `triggered` list is
/// not an error.
pub fn evaluate_red_flags(
    kb: &KnowledgeBase,
    ranked: &[RankedDifferential],
    modifiers: Option<&SymptomModifiers>,
) -> DdxResult<RedFlagAssessment> {
    let reported: &[String] = modifiers
        .map(|m| m.associated_symptoms.as_slice())
        .unwrap_or_default();

    let mut triggered = Vec::new();
    let mut best: Option<(&RankedDifferential, &CareGuidance)> = None;

    for item in ranked {
        let diagnosis = kb.require_diagnosis(item.entry.diagnosis_id.as_str())?;
        let before = triggered.len();

        for alarm in &diagnosis.red_flags {
            let flag = if reported.is_empty() {
                item.entry
                    .must_not_miss
                    .then_some((RedFlagTrigger::MustNotMiss, None))
            } else {
                reported
                    .iter()
                    .find(|token| alarm_matches(alarm, token))
                    .map(|token| (RedFlagTrigger::ReportedSymptom, Some(token.clone())))
            };

            if let Some((trigger, matched)) = flag {
                triggered.push(TriggeredRedFlag {
                    diagnosis_id: diagnosis.diagnosis_id.clone(),
                    diagnosis_name: diagnosis.name.clone(),
                    position: item.position,
                    alarm: alarm.clone(),
                    trigger,
                    matched,
                });
            }
        }

        let guidance = &diagnosis.care_guidance;
        let has_flag = triggered.len() > before;
        let more_urgent = best.map_or(true, |(_, g)| guidance.urgency > g.urgency);
        if has_flag && more_urgent {
            best = Some((item, guidance));
        }
    }

    let (source, guidance) = match best {
        Some((item, guidance)) => (item, guidance.clone()),
        None => {
            let top = ranked.first().ok_or_else(|| {
                DdxError::InvariantViolation("cannot assess red flags of an empty ranking".into())
            })?;
            let diagnosis = kb.require_diagnosis(top.entry.diagnosis_id.as_str())?;
            (top, diagnosis.care_guidance.clone())
        }
    };

    triggered.sort_by_key(|f| (Reverse(f.alarm.timeframe), f.position));

    if !triggered.is_empty() {
        tracing::debug!(
            triggered = triggered.len(),
            urgency = %guidance.urgency,
            source = %source.entry.diagnosis_id,
            "red flags raised"
        );
    }

    Ok(RedFlagAssessment {
        triggered,
        aggregate_guidance: guidance,
        guidance_source: source.entry.diagnosis_id.clone(),
    })
}

/// True when `token` equals one of the alarm's tags or is textually implied by its symptom.
pub fn alarm_matches(alarm: &AlarmSymptom, token: &str) -> bool {
    let token_id = slug(token);
    alarm.tags.iter().any(|tag| tag.as_str() == token_id) || implies(token, alarm.symptom.as_str())
}
