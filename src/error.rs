use thiserror::Error;

use crate::record::SemesterKey;
use crate::rules::{ComponentField, ComponentLayout, GradeLevel, SemesterHalf};

/// Errors raised by the scoring engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid rule set:\n  - {}", .0.join("\n  - "))]
    InvalidRules(Vec<String>),

    #[error("no weight formula for '{subject}' in {grade} {half}")]
    NoFormula {
        grade: GradeLevel,
        half: SemesterHalf,
        subject: String,
    },

    #[error("'{subject}' is not a {grade} subject")]
    UnknownSubject { grade: GradeLevel, subject: String },

    #[error("{grade} subjects use the {expected} layout")]
    LayoutMismatch {
        grade: GradeLevel,
        expected: ComponentLayout,
    },

    #[error("{field} is not held for '{subject}' in {grade}")]
    InapplicableComponent {
        grade: GradeLevel,
        subject: String,
        field: ComponentField,
    },

    #[error("{field} must be within 0..={max} (got {value})")]
    OutOfRange {
        field: ComponentField,
        value: f64,
        max: f64,
    },

    #[error("{field} is a tally and must be a whole number (got {value})")]
    FractionalTally { field: ComponentField, value: f64 },

    #[error("{0} is a free semester; numeric inputs are suspended")]
    FreeSemesterLocked(SemesterKey),

    #[error("{key} has {actual} subjects, expected {expected}")]
    SubjectCountMismatch {
        key: SemesterKey,
        expected: usize,
        actual: usize,
    },

    #[error("{key} subject {position} is '{actual}', expected '{expected}'")]
    SubjectOrderMismatch {
        key: SemesterKey,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("invalid {what}: {reason}")]
    InvalidNonAcademic { what: String, reason: String },
}
