//! Shared fixtures built from the bundled seed knowledge base.

use crate::explorer::DifferentialExplorer;
use crate::knowledge_base::KnowledgeBase;
use ddx_content::{DiagnosesDocument, DiagnosisCatalogue, SymptomCatalogue, SymptomListsDocument};
use std::sync::Arc;

const SEED_DIAGNOSES: &str = include_str!("../../../knowledge-base/diagnoses.yaml");
const SEED_SYMPTOMS: &str = include_str!("../../../knowledge-base/symptoms.yaml");

pub(crate) fn seed_documents() -> (DiagnosesDocument, SymptomListsDocument) {
    (
        DiagnosisCatalogue::parse(SEED_DIAGNOSES).expect("seed diagnoses parse"),
        SymptomCatalogue::parse(SEED_SYMPTOMS).expect("seed symptoms parse"),
    )
}

pub(crate) fn seed_knowledge_base() -> KnowledgeBase {
    let (diagnoses, symptoms) = seed_documents();
    KnowledgeBase::from_documents(diagnoses, symptoms).expect("seed knowledge base loads")
}

pub(crate) fn seed_explorer() -> DifferentialExplorer {
    DifferentialExplorer::new(Arc::new(seed_knowledge_base()))
}
