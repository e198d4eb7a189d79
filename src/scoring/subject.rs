use crate::error::EngineError;
use crate::record::Components;
use crate::rules::{ComponentField, GradeLevel, RuleBook, SemesterHalf, WeightFormula};

use super::round_to;

/// How one formula term contributed to a subject's raw score.
#[derive(Debug, Clone, PartialEq)]
pub struct TermContribution {
    pub field: ComponentField,
    /// Value as entered; `None` when left blank (counts as 0).
    pub input: Option<f64>,
    pub weight: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectScore {
    /// Rounded to one decimal, within 0..=100.
    pub raw_score: f64,
    pub terms: Vec<TermContribution>,
}

/// Score one subject and keep the per-term breakdown.
///
/// Only the fields named by the subject's formula are read. A value stored
/// for a field the school does not hold has no effect.
pub fn score_subject_detailed(
    rules: &RuleBook,
    components: &Components,
    grade: GradeLevel,
    half: SemesterHalf,
    subject: &str,
) -> Result<SubjectScore, EngineError> {
    let formula = rules.weights_for(grade, half, subject)?;
    if components.layout() != grade.layout() {
        return Err(EngineError::LayoutMismatch {
            grade,
            expected: grade.layout(),
        });
    }

    let scale = rules.performance();
    let terms: Vec<TermContribution> = formula
        .terms
        .iter()
        .map(|&(field, weight)| {
            let input = components.get(field);
            let points = match input {
                None => 0.0,
                // Grade-1 performance is entered already weighted (points out of weight * 100)
                Some(v) if field == ComponentField::Performance => v,
                Some(v) if field.is_tally() => scale.normalize(v as u32) * weight,
                Some(v) => v * weight,
            };
            TermContribution {
                field,
                input,
                weight,
                points,
            }
        })
        .collect();

    let sum: f64 = terms.iter().map(|t| t.points).sum();
    Ok(SubjectScore {
        raw_score: round_to(sum.clamp(0.0, 100.0), 1),
        terms,
    })
}

/// Raw score of one subject, rounded to one decimal.
pub fn score_subject(
    rules: &RuleBook,
    components: &Components,
    grade: GradeLevel,
    half: SemesterHalf,
    subject: &str,
) -> Result<f64, EngineError> {
    score_subject_detailed(rules, components, grade, half, subject).map(|s| s.raw_score)
}

/// Largest value a field accepts under a formula.
pub fn component_max(rules: &RuleBook, formula: &WeightFormula, field: ComponentField) -> f64 {
    if field.is_tally() {
        return f64::from(rules.performance().max_tally);
    }
    match (field, formula.weight_of(field)) {
        (ComponentField::Performance, Some(weight)) => round_to(weight * 100.0, 6),
        _ => 100.0,
    }
}

/// Boundary check for a single component edit.
///
/// Rejects unknown subjects, fields the school does not hold for the subject,
/// non-finite or out-of-range values, and fractional tallies. The scorer
/// itself assumes input has passed through here.
pub fn validate_component(
    rules: &RuleBook,
    grade: GradeLevel,
    half: SemesterHalf,
    subject: &str,
    field: ComponentField,
    value: f64,
) -> Result<(), EngineError> {
    let formula = rules.weights_for(grade, half, subject)?;

    if field.layout() != grade.layout() {
        return Err(EngineError::LayoutMismatch {
            grade,
            expected: grade.layout(),
        });
    }
    if !rules.is_component_applicable(grade, subject, field) {
        return Err(EngineError::InapplicableComponent {
            grade,
            subject: subject.to_string(),
            field,
        });
    }

    let max = component_max(rules, formula, field);
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(EngineError::OutOfRange { field, value, max });
    }
    if field.is_tally() && value.fract() != 0.0 {
        return Err(EngineError::FractionalTally { field, value });
    }
    Ok(())
}
