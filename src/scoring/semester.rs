use crate::error::EngineError;
use crate::record::{RawScore, SemesterData, SemesterKey, SemesterState, SubjectGrade};
use crate::rules::{Achievement, ComponentField, ComponentLayout, GradeLevel, RuleBook};

use super::achievement::classify_subject;
use super::subject::{score_subject, validate_component};

/// Fresh `Scored` semester with the grade's fixed subject list.
pub fn new_semester(rules: &RuleBook, grade: GradeLevel) -> SemesterData {
    SemesterData {
        is_free_semester: false,
        subjects: rules
            .subjects(grade)
            .iter()
            .map(|name| SubjectGrade::blank(name.clone(), grade.layout()))
            .collect(),
    }
}

/// Switch a semester between `Scored` and `Free`.
///
/// Entering `Free` marks every subject `P` / not-applicable and discards its
/// inputs. Leaving it resets every subject to `A` / 0 with no inputs; nothing
/// from before the first toggle comes back. Toggling into the current state
/// is a no-op.
pub fn toggle_free_semester(semester: &SemesterData, enabled: bool) -> SemesterData {
    let target = if enabled {
        SemesterState::Free
    } else {
        SemesterState::Scored
    };
    if semester.state() == target {
        tracing::debug!(?target, "free-semester toggle is a no-op");
        return semester.clone();
    }

    SemesterData {
        is_free_semester: enabled,
        subjects: semester
            .subjects
            .iter()
            .map(|subject| {
                let mut next = SubjectGrade::blank(subject.name.clone(), subject.components.layout());
                if enabled {
                    next.achievement = Achievement::P;
                    next.raw_score = RawScore::NotApplicable;
                }
                next
            })
            .collect(),
    }
}

fn rescore_subject(
    rules: &RuleBook,
    key: SemesterKey,
    subject: &SubjectGrade,
) -> Result<SubjectGrade, EngineError> {
    let formula = rules.weights_for(key.grade, key.half, &subject.name)?;
    let layout_fields: &[ComponentField] = match key.grade.layout() {
        ComponentLayout::Grade1 => &ComponentField::GRADE1,
        ComponentLayout::Upper => &ComponentField::UPPER,
    };
    for &field in layout_fields {
        if subject.components.get(field).is_some() && formula.weight_of(field).is_none() {
            tracing::warn!(
                semester = %key,
                subject = %subject.name,
                %field,
                "ignoring value for a field the subject does not hold"
            );
        }
    }

    let raw = score_subject(rules, &subject.components, key.grade, key.half, &subject.name)?;
    let achievement = classify_subject(rules, key.grade, &subject.name, raw)?;
    Ok(SubjectGrade {
        raw_score: RawScore::Scored(raw),
        achievement,
        ..subject.clone()
    })
}

/// Apply one component edit and recompute that subject's score and band.
pub fn set_component(
    rules: &RuleBook,
    key: SemesterKey,
    semester: &SemesterData,
    subject: &str,
    field: ComponentField,
    value: f64,
) -> Result<SemesterData, EngineError> {
    if semester.is_free_semester {
        return Err(EngineError::FreeSemesterLocked(key));
    }
    validate_component(rules, key.grade, key.half, subject, field, value)?;

    let index = semester
        .subjects
        .iter()
        .position(|s| s.name == subject)
        .ok_or_else(|| EngineError::UnknownSubject {
            grade: key.grade,
            subject: subject.to_string(),
        })?;

    let mut edited = semester.subjects[index].clone();
    edited.components.set(field, value);
    let rescored = rescore_subject(rules, key, &edited)?;

    let mut next = semester.clone();
    next.subjects[index] = rescored;
    Ok(next)
}

/// Re-derive every subject's score and band.
///
/// The subject list must match the grade's fixed list. Free semesters are
/// normalized to `P` / not-applicable.
pub fn rescore_semester(
    rules: &RuleBook,
    key: SemesterKey,
    semester: &SemesterData,
) -> Result<SemesterData, EngineError> {
    let expected = rules.subjects(key.grade);
    if semester.subjects.len() != expected.len() {
        return Err(EngineError::SubjectCountMismatch {
            key,
            expected: expected.len(),
            actual: semester.subjects.len(),
        });
    }
    for (position, (subject, name)) in semester.subjects.iter().zip(expected).enumerate() {
        if !rules.has_subject(key.grade, &subject.name) {
            return Err(EngineError::UnknownSubject {
                grade: key.grade,
                subject: subject.name.clone(),
            });
        }
        if subject.name != *name {
            return Err(EngineError::SubjectOrderMismatch {
                key,
                position: position + 1,
                expected: name.clone(),
                actual: subject.name.clone(),
            });
        }
    }

    if semester.is_free_semester {
        let subjects = semester
            .subjects
            .iter()
            .map(|s| SubjectGrade {
                achievement: Achievement::P,
                raw_score: RawScore::NotApplicable,
                ..s.clone()
            })
            .collect();
        return Ok(SemesterData {
            is_free_semester: true,
            subjects,
        });
    }

    let subjects = semester
        .subjects
        .iter()
        .map(|s| rescore_subject(rules, key, s))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SemesterData {
        is_free_semester: false,
        subjects,
    })
}
