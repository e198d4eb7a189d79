use std::fmt;
use std::str::FromStr;

use super::{AcademicRecord, SemesterKey, VolunteerTier};
use crate::error::EngineError;
use crate::rules::{ComponentField, GradeLevel, RuleBook};
use crate::scoring::{new_semester, rescore_semester, set_component, toggle_free_semester, validate_non_academic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceKind {
    Absences,
    Tardies,
    EarlyLeaves,
    Results,
}

impl FromStr for AttendanceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "absences" | "결석" => Ok(AttendanceKind::Absences),
            "tardies" | "지각" => Ok(AttendanceKind::Tardies),
            "earlyLeaves" | "early-leaves" | "조퇴" => Ok(AttendanceKind::EarlyLeaves),
            "results" | "결과" => Ok(AttendanceKind::Results),
            other => Err(format!(
                "unknown attendance kind '{}' (expected absences, tardies, early-leaves or results)",
                other
            )),
        }
    }
}

impl fmt::Display for AttendanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttendanceKind::Absences => "absences",
            AttendanceKind::Tardies => "tardies",
            AttendanceKind::EarlyLeaves => "earlyLeaves",
            AttendanceKind::Results => "results",
        };
        f.write_str(s)
    }
}

/// New behavior points for a grade; `None` keeps the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BehaviorEdit {
    pub base: Option<f64>,
    pub extra: Option<f64>,
}

/// A single field change, as supplied by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordEdit {
    Component {
        semester: SemesterKey,
        subject: String,
        field: ComponentField,
        value: f64,
    },
    FreeSemester {
        semester: SemesterKey,
        enabled: bool,
    },
    Attendance {
        kind: AttendanceKind,
        grade: GradeLevel,
        count: u32,
    },
    VolunteerHours(f64),
    VolunteerTier(VolunteerTier),
    Behavior {
        grade: GradeLevel,
        edit: BehaviorEdit,
    },
}

/// Apply one edit and return the updated record.
///
/// The input record is never modified. Semesters that have not been touched
/// yet are created on first edit. Dependent scores are recomputed before the
/// record is returned, so the result is always valid.
pub fn apply_edit(
    rules: &RuleBook,
    record: &AcademicRecord,
    edit: &RecordEdit,
) -> Result<AcademicRecord, EngineError> {
    match edit {
        RecordEdit::Component {
            semester: key,
            subject,
            field,
            value,
        } => {
            let current = record
                .semester(key)
                .cloned()
                .unwrap_or_else(|| new_semester(rules, key.grade));
            let updated = set_component(rules, *key, &current, subject, *field, *value)?;
            tracing::info!(semester = %key, %subject, %field, value, "component updated");
            Ok(record.with_semester(*key, updated))
        }
        RecordEdit::FreeSemester {
            semester: key,
            enabled,
        } => {
            let current = record
                .semester(key)
                .cloned()
                .unwrap_or_else(|| new_semester(rules, key.grade));
            let updated = toggle_free_semester(&current, *enabled);
            tracing::info!(semester = %key, enabled, "free semester toggled");
            Ok(record.with_semester(*key, updated))
        }
        RecordEdit::Attendance { kind, grade, count } => {
            let mut data = record.non_academic.clone();
            let slots = match kind {
                AttendanceKind::Absences => &mut data.attendance.absences,
                AttendanceKind::Tardies => &mut data.attendance.tardies,
                AttendanceKind::EarlyLeaves => &mut data.attendance.early_leaves,
                AttendanceKind::Results => &mut data.attendance.results,
            };
            slots[grade.index()] = *count;
            tracing::info!(%kind, grade = grade.number(), count, "attendance updated");
            Ok(record.with_non_academic(data))
        }
        RecordEdit::VolunteerHours(hours) => {
            let mut data = record.non_academic.clone();
            data.volunteer.hours = *hours;
            validate_non_academic(rules.non_academic(), &data)?;
            tracing::info!(hours, "volunteer hours updated");
            Ok(record.with_non_academic(data))
        }
        RecordEdit::VolunteerTier(tier) => {
            let mut data = record.non_academic.clone();
            data.volunteer.tier = *tier;
            tracing::info!(%tier, "volunteer tier updated");
            Ok(record.with_non_academic(data))
        }
        RecordEdit::Behavior { grade, edit } => {
            let mut data = record.non_academic.clone();
            let points = data.behavior.for_grade_mut(*grade);
            if let Some(base) = edit.base {
                points.base = base;
            }
            if let Some(extra) = edit.extra {
                points.extra = extra;
            }
            validate_non_academic(rules.non_academic(), &data)?;
            tracing::info!(grade = grade.number(), "behavior points updated");
            Ok(record.with_non_academic(data))
        }
    }
}

/// Re-derive every dependent field of a freshly loaded record.
pub fn recompute(rules: &RuleBook, record: &AcademicRecord) -> Result<AcademicRecord, EngineError> {
    let mut next = record.clone();
    for (key, semester) in &record.semesters {
        next.semesters.insert(*key, rescore_semester(rules, *key, semester)?);
    }
    validate_non_academic(rules.non_academic(), &record.non_academic)?;
    tracing::debug!(semesters = record.semesters.len(), "record recomputed");
    Ok(next)
}
