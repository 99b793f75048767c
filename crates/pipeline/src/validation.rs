//! Domain rules for node outputs.
//!
//! Nodes call these after parsing a model response; the context calls them
//! again when rebuilding from an exported report. Nothing here truncates or
//! pads: a list of the wrong length is an error, never a repair.

use std::collections::HashSet;

use crate::{Distinction, NextStep, ValidationError};

/// Number of distinctions the Skill-Analysis node must produce.
pub const DISTINCTION_COUNT: usize = 5;

/// Number of insights the Insight-Generation node must produce.
pub const INSIGHT_COUNT: usize = 4;

/// Number of next steps the Next-Steps node must produce.
pub const NEXT_STEP_COUNT: usize = 3;

fn check_count(field: &'static str, expected: usize, actual: usize) -> Result<(), ValidationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::WrongCount {
            field,
            expected,
            actual,
        })
    }
}

fn check_text(path: impl FnOnce() -> String, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { field: path() })
    } else {
        Ok(())
    }
}

/// Checks cardinality, required text, and name uniqueness of distinctions.
pub fn check_distinctions(distinctions: &[Distinction]) -> Result<(), ValidationError> {
    check_count("distinctions", DISTINCTION_COUNT, distinctions.len())?;

    let mut seen = HashSet::new();
    for (i, d) in distinctions.iter().enumerate() {
        check_text(|| format!("distinctions[{i}].name"), &d.name)?;
        check_text(|| format!("distinctions[{i}].description"), &d.description)?;
        check_text(|| format!("distinctions[{i}].importance"), &d.importance)?;

        if !seen.insert(name_key(&d.name)) {
            return Err(ValidationError::DuplicateDistinction {
                name: d.name.clone(),
            });
        }
    }
    Ok(())
}

/// Checks cardinality and required text of insights.
pub fn check_insights(insights: &[String]) -> Result<(), ValidationError> {
    check_count("insights", INSIGHT_COUNT, insights.len())?;
    for (i, insight) in insights.iter().enumerate() {
        check_text(|| format!("insights[{i}]"), insight)?;
    }
    Ok(())
}

/// Checks cardinality, required text, and that every `develops` entry names
/// one of `distinctions` exactly.
pub fn check_next_steps(
    steps: &[NextStep],
    distinctions: &[Distinction],
) -> Result<(), ValidationError> {
    check_count("next_steps", NEXT_STEP_COUNT, steps.len())?;

    for (i, step) in steps.iter().enumerate() {
        check_step_text(i, step)?;
        if step.develops.is_empty() {
            return Err(ValidationError::NothingDeveloped { step: i });
        }
        for name in &step.develops {
            if !distinctions.iter().any(|d| &d.name == name) {
                return Err(ValidationError::UnknownDistinction {
                    step: i,
                    name: name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_step_text(i: usize, step: &NextStep) -> Result<(), ValidationError> {
    check_text(|| format!("next_steps[{i}].action"), &step.action)?;
    check_text(|| format!("next_steps[{i}].time_commitment"), &step.time_commitment)?;
    check_text(|| format!("next_steps[{i}].success_criteria"), &step.success_criteria)
}

/// Resolves every `develops` entry to the stored spelling of a known
/// distinction.
///
/// Matching ignores case and surrounding whitespace. Repeated references to
/// the same distinction collapse to one. A name that matches no distinction
/// is an error; it is never dropped.
pub fn resolve_develops(
    steps: Vec<NextStep>,
    distinctions: &[Distinction],
) -> Result<Vec<NextStep>, ValidationError> {
    steps
        .into_iter()
        .enumerate()
        .map(|(i, mut step)| -> Result<NextStep, ValidationError> {
            let mut resolved: Vec<String> = Vec::with_capacity(step.develops.len());
            for name in &step.develops {
                let key = name_key(name);
                let known = distinctions
                    .iter()
                    .find(|d| name_key(&d.name) == key)
                    .ok_or_else(|| ValidationError::UnknownDistinction {
                        step: i,
                        name: name.clone(),
                    })?;
                if !resolved.contains(&known.name) {
                    resolved.push(known.name.clone());
                }
            }
            step.develops = resolved;
            Ok(step)
        })
        .collect()
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
