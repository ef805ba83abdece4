//! # DDX Core
//!
//! Deterministic differential-diagnosis engine over a curated knowledge base.
//!
//! Pipeline, leaves first:
//! - [`KnowledgeBase`]: validated, indexed content loaded once at startup
//! - [`ranking::rank`]: curated ranking adjusted by symptom modifiers
//! - [`red_flags::evaluate_red_flags`]: triggered alarms and aggregate care guidance
//! - [`anatomy::merge_anatomy`]: deduplicated anatomy highlights
//! - [`DifferentialExplorer`]: the façade that runs the pipeline and attaches the disclaimer
//!
//! **No API concerns**: HTTP and command-line bindings belong in `api-rest` and `ddx-cli`.

pub mod anatomy;
pub mod catalogue;
pub mod config;
pub mod constants;
pub mod error;
pub mod explorer;
pub mod input;
pub mod knowledge_base;
pub mod matching;
pub mod ranking;
pub mod red_flags;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use anatomy::AnatomyHighlight;
pub use catalogue::{RedFlagMatch, SearchMatch};
pub use config::{resolve_knowledge_base_dir, CoreConfig};
pub use constants::EDUCATIONAL_DISCLAIMER;
pub use error::{DdxError, DdxResult, IntegrityError};
pub use explorer::{DifferentialExplorer, DifferentialExplorerResult};
pub use input::{Sex, SymptomModifiers, UserSymptomInput};
pub use knowledge_base::KnowledgeBase;
pub use ranking::{RankedDifferential, ScoreReason, ScoreReasonKind};
pub use red_flags::{RedFlagAssessment, RedFlagTrigger, TriggeredRedFlag};

pub use ddx_content as content;
