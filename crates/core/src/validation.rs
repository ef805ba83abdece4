//! Input validation utilities.
//!
//! Query inputs are checked here before any scoring happens so that the engine only ever sees
//! in-range values.

use crate::constants::{EXPLANATION_LEVELS, MAX_AGE, MAX_SEVERITY};
use crate::input::{SymptomModifiers, UserSymptomInput};
use crate::{DdxError, DdxResult};

/// Validates a symptom query.
///
/// # Errors
///
/// Returns `DdxError::InvalidInput` if severity exceeds 10, age exceeds 130, or any modifier
/// token is blank.
pub fn validate_input(input: &UserSymptomInput) -> DdxResult<()> {
    match &input.modifiers {
        Some(modifiers) => validate_modifiers(modifiers),
        None => Ok(()),
    }
}

/// Validates the optional modifiers of a symptom query.
pub fn validate_modifiers(modifiers: &SymptomModifiers) -> DdxResult<()> {
    if let Some(severity) = modifiers.severity {
        if severity > MAX_SEVERITY {
            return Err(DdxError::InvalidInput(format!(
                "severity {severity} is outside 0-{MAX_SEVERITY}"
            )));
        }
    }

    if let Some(age) = modifiers.age {
        if age > MAX_AGE {
            return Err(DdxError::InvalidInput(format!(
                "age {age} is outside 0-{MAX_AGE}"
            )));
        }
    }

    if let Some(duration) = &modifiers.duration {
        if duration.trim().is_empty() {
            return Err(DdxError::InvalidInput("duration cannot be blank".into()));
        }
    }

    let lists = [
        ("associated_symptoms", &modifiers.associated_symptoms),
        ("aggravating_factors", &modifiers.aggravating_factors),
        ("relieving_factors", &modifiers.relieving_factors),
        ("medical_history", &modifiers.medical_history),
    ];
    for (field, tokens) in lists {
        if tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(DdxError::InvalidInput(format!(
                "{field} cannot contain blank entries"
            )));
        }
    }

    Ok(())
}

/// Validates an explanation ladder level.
pub fn validate_explanation_level(level: u8) -> DdxResult<()> {
    if (1..=EXPLANATION_LEVELS).contains(&level) {
        Ok(())
    } else {
        Err(DdxError::InvalidInput(format!(
            "explanation level {level} is outside 1-{EXPLANATION_LEVELS}"
        )))
    }
}
