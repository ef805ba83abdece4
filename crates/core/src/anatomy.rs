//! Anatomy highlight aggregation across a ranked differential.

use crate::knowledge_base::KnowledgeBase;
use crate::ranking::RankedDifferential;
use crate::DdxResult;
use ddx_content::{AffectedAnatomy, ConceptId};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use utoipa::ToSchema;

/// One structure to highlight, attributed to the diagnosis that won it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct AnatomyHighlight {
    pub anatomy: AffectedAnatomy,
    pub diagnosis_id: ConceptId,
    /// Position of the source diagnosis in the final ranking.
    pub position: usize,
}

/// Collect the affected anatomy of every ranked diagnosis and merge it.
pub fn merge_anatomy(
    kb: &KnowledgeBase,
    ranked: &[RankedDifferential],
) -> DdxResult<Vec<AnatomyHighlight>> {
    let mut candidates = Vec::new();
    for item in ranked {
        let diagnosis = kb.require_diagnosis(item.entry.diagnosis_id.as_str())?;
        candidates.extend(diagnosis.affected_anatomy.iter().map(|anatomy| AnatomyHighlight {
            anatomy: anatomy.clone(),
            diagnosis_id: diagnosis.diagnosis_id.clone(),
            position: item.position,
        }));
    }
    Ok(merge_highlights(candidates))
}

/// Deduplicate highlights by `structure_id`.
///
/// The most severe involvement wins; ties go to the better position, then to the first seen.
/// The survivor is kept whole. Output is ordered by severity descending, then position, then
/// first-seen order, which makes the merge idempotent.
pub fn merge_highlights(
    highlights: impl IntoIterator<Item = AnatomyHighlight>,
) -> Vec<AnatomyHighlight> {
    let mut survivors: Vec<(usize, AnatomyHighlight)> = Vec::new();
    let mut by_structure: HashMap<ConceptId, usize> = HashMap::new();

    for (seq, candidate) in highlights.into_iter().enumerate() {
        let key = candidate.anatomy.structure_id.clone();
        match by_structure.get(&key) {
            Some(&slot) => {
                let current = &survivors[slot].1;
                if outranks(&candidate, current) {
                    survivors[slot] = (seq, candidate);
                }
            }
            None => {
                by_structure.insert(key, survivors.len());
                survivors.push((seq, candidate));
            }
        }
    }

    survivors.sort_by_key(|(seq, h)| {
        (
            Reverse(h.anatomy.involvement_type.severity()),
            h.position,
            *seq,
        )
    });
    survivors.into_iter().map(|(_, h)| h).collect()
}

fn outranks(candidate: &AnatomyHighlight, current: &AnatomyHighlight) -> bool {
    let candidate_severity = candidate.anatomy.involvement_type.severity();
    let current_severity = current.anatomy.involvement_type.severity();
    candidate_severity > current_severity
        || (candidate_severity == current_severity && candidate.position < current.position)
}
