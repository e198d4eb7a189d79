use crate::error::EngineError;
use crate::record::{Attendance, Behavior, NonAcademicData, Volunteer, VolunteerTier};
use crate::rules::{
    AttendancePolicy, BehaviorPolicy, GradeLevel, NonAcademicPolicy, VolunteerPolicy,
    NON_ACADEMIC_CEILING,
};

/// Non-academic sub-scores.
#[derive(Debug, Clone, PartialEq)]
pub struct NonAcademicScore {
    pub attendance_by_grade: [f64; 3],
    pub attendance: f64,
    pub volunteer: f64,
    pub behavior: f64,
    /// Sum of the three parts, capped at the 60-point ceiling.
    pub total: f64,
}

/// Absences a grade is charged with once minor events are folded in.
pub fn equivalent_absences(policy: &AttendancePolicy, attendance: &Attendance, grade: GradeLevel) -> u32 {
    let i = grade.index();
    let minor = attendance.tardies[i]
        .saturating_add(attendance.early_leaves[i])
        .saturating_add(attendance.results[i]);
    attendance.absences[i].saturating_add(minor / policy.minor_events_per_absence.max(1))
}

/// Per-grade attendance score: the grade's ceiling less its deductions,
/// never below zero.
pub fn attendance_scores(policy: &AttendancePolicy, attendance: &Attendance) -> [f64; 3] {
    GradeLevel::ALL.map(|grade| {
        let deduction = f64::from(equivalent_absences(policy, attendance, grade)) * policy.absence_deduction;
        (policy.points_per_grade - deduction).max(0.0)
    })
}

/// Volunteer score under the chosen tier. Saturates at the tier's hours.
pub fn volunteer_score(policy: &VolunteerPolicy, volunteer: &Volunteer) -> f64 {
    let full_marks_hours = match volunteer.tier {
        VolunteerTier::Disabled => return policy.points,
        VolunteerTier::None => policy.default_hours,
        VolunteerTier::ThirtyHours => policy.thirty_hour_tier,
        VolunteerTier::TwentyHours => policy.twenty_hour_tier,
    };
    let hours = volunteer.hours.max(0.0).min(full_marks_hours);
    policy.points * hours / full_marks_hours
}

/// Behavior score: each grade's `base + extra` (each capped) summed and
/// scaled into the behavior share.
pub fn behavior_score(policy: &BehaviorPolicy, behavior: &Behavior) -> f64 {
    let per_grade_max = policy.base_max + policy.extra_max;
    let earned: f64 = GradeLevel::ALL
        .iter()
        .map(|&grade| {
            let points = behavior.for_grade(grade);
            points.base.clamp(0.0, policy.base_max) + points.extra.clamp(0.0, policy.extra_max)
        })
        .sum();
    policy.points * earned / (per_grade_max * 3.0)
}

pub fn non_academic_score(policy: &NonAcademicPolicy, data: &NonAcademicData) -> NonAcademicScore {
    let attendance_by_grade = attendance_scores(&policy.attendance, &data.attendance);
    let attendance: f64 = attendance_by_grade.iter().sum();
    let volunteer = volunteer_score(&policy.volunteer, &data.volunteer);
    let behavior = behavior_score(&policy.behavior, &data.behavior);

    NonAcademicScore {
        attendance_by_grade,
        attendance,
        volunteer,
        behavior,
        total: (attendance + volunteer + behavior).min(NON_ACADEMIC_CEILING),
    }
}

fn invalid(what: impl Into<String>, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidNonAcademic {
        what: what.into(),
        reason: reason.into(),
    }
}

/// Boundary check for the non-academic inputs. Attendance counts are
/// unsigned, so only hours and behavior points need checking.
pub fn validate_non_academic(policy: &NonAcademicPolicy, data: &NonAcademicData) -> Result<(), EngineError> {
    let hours = data.volunteer.hours;
    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid("volunteer.hours", format!("must be a non-negative number (got {})", hours)));
    }

    let behavior = &policy.behavior;
    for grade in GradeLevel::ALL {
        let points = data.behavior.for_grade(grade);
        let path = format!("behavior.grade{}", grade.number());

        if !points.base.is_finite() || !(0.0..=behavior.base_max).contains(&points.base) {
            return Err(invalid(
                format!("{}.base", path),
                format!("must be within 0..={} (got {})", behavior.base_max, points.base),
            ));
        }
        if !points.extra.is_finite() || !(0.0..=behavior.extra_max).contains(&points.extra) {
            return Err(invalid(
                format!("{}.extra", path),
                format!("must be within 0..={} (got {})", behavior.extra_max, points.extra),
            ));
        }
        if (points.extra / behavior.extra_step).fract() != 0.0 {
            return Err(invalid(
                format!("{}.extra", path),
                format!("must be a multiple of {} (got {})", behavior.extra_step, points.extra),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BehaviorPoints;

    fn perfect() -> NonAcademicData {
        let full = BehaviorPoints { base: 3.0, extra: 2.0 };
        NonAcademicData {
            attendance: Attendance::default(),
            volunteer: Volunteer {
                hours: 30.0,
                tier: VolunteerTier::None,
            },
            behavior: Behavior {
                grade1: full,
                grade2: full,
                grade3: full,
            },
        }
    }

    #[test]
    fn test_maximal_inputs_score_exactly_sixty() {
        let score = non_academic_score(&NonAcademicPolicy::default(), &perfect());
        assert_eq!(score.attendance, 30.0);
        assert_eq!(score.volunteer, 15.0);
        assert_eq!(score.behavior, 15.0);
        assert_eq!(score.total, 60.0);
    }

    #[test]
    fn test_default_record_score() {
        let score = non_academic_score(&NonAcademicPolicy::default(), &NonAcademicData::default());
        // no absences, no hours, base 3 in each grade
        assert_eq!(score.attendance, 30.0);
        assert_eq!(score.volunteer, 0.0);
        assert_eq!(score.behavior, 9.0);
        assert_eq!(score.total, 39.0);
    }

    #[test]
    fn test_minor_events_fold_into_absences() {
        let policy = AttendancePolicy::default();
        let attendance = Attendance {
            absences: [1, 0, 0],
            tardies: [2, 0, 0],
            early_leaves: [1, 2, 0],
            results: [0, 0, 0],
        };
        // grade 1: 1 + (2+1+0)/3 = 2, grade 2: 0 + 2/3 = 0
        assert_eq!(equivalent_absences(&policy, &attendance, GradeLevel::One), 2);
        assert_eq!(equivalent_absences(&policy, &attendance, GradeLevel::Two), 0);
        assert_eq!(attendance_scores(&policy, &attendance), [8.0, 10.0, 10.0]);
    }

    #[test]
    fn test_attendance_saturates_at_zero() {
        let policy = AttendancePolicy::default();
        let attendance = Attendance {
            absences: [0, 25, 0],
            ..Attendance::default()
        };
        assert_eq!(attendance_scores(&policy, &attendance), [10.0, 0.0, 10.0]);
    }

    #[test]
    fn test_extreme_counts_saturate() {
        let policy = AttendancePolicy::default();
        let attendance = Attendance {
            absences: [u32::MAX, 0, 0],
            tardies: [u32::MAX, u32::MAX, 0],
            early_leaves: [1, u32::MAX, 0],
            results: [0, u32::MAX, 0],
        };
        assert_eq!(equivalent_absences(&policy, &attendance, GradeLevel::One), u32::MAX);
        assert_eq!(equivalent_absences(&policy, &attendance, GradeLevel::Two), u32::MAX / 3);
        assert_eq!(attendance_scores(&policy, &attendance), [0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_volunteer_tiers() {
        let policy = VolunteerPolicy::default();
        let at = |hours: f64, tier: VolunteerTier| volunteer_score(&policy, &Volunteer { hours, tier });

        assert_eq!(at(15.0, VolunteerTier::None), 7.5);
        assert_eq!(at(15.0, VolunteerTier::ThirtyHours), 7.5);
        assert_eq!(at(20.0, VolunteerTier::TwentyHours), 15.0);
        assert_eq!(at(45.0, VolunteerTier::TwentyHours), 15.0);
        assert_eq!(at(0.0, VolunteerTier::Disabled), 15.0);
    }

    #[test]
    fn test_volunteer_monotonic() {
        let policy = VolunteerPolicy::default();
        for tier in [
            VolunteerTier::None,
            VolunteerTier::ThirtyHours,
            VolunteerTier::TwentyHours,
            VolunteerTier::Disabled,
        ] {
            let mut previous = 0.0;
            for half_hours in 0..=100 {
                let hours = half_hours as f64 / 2.0;
                let score = volunteer_score(&policy, &Volunteer { hours, tier });
                assert!(score >= previous, "{} at {}h", tier, hours);
                assert!(score <= policy.points);
                previous = score;
            }
        }
    }

    #[test]
    fn test_behavior_extra_is_capped() {
        let policy = BehaviorPolicy::default();
        let over = BehaviorPoints { base: 3.0, extra: 5.0 };
        let behavior = Behavior {
            grade1: over,
            grade2: over,
            grade3: over,
        };
        assert_eq!(behavior_score(&policy, &behavior), 15.0);
    }

    #[test]
    fn test_partition_follows_policy() {
        let mut policy = NonAcademicPolicy::default();
        policy.attendance.points_per_grade = 5.0;
        policy.volunteer.points = 25.0;
        policy.behavior.points = 20.0;
        assert_eq!(policy.ceiling(), 60.0);
        let score = non_academic_score(&policy, &perfect());
        assert_eq!(score.total, 60.0);
        assert_eq!(score.volunteer, 25.0);
    }

    #[test]
    fn test_validate_rejects_bad_extra() {
        let policy = NonAcademicPolicy::default();
        let mut data = NonAcademicData::default();
        data.behavior.grade2.extra = 0.75;
        let err = validate_non_academic(&policy, &data).unwrap_err();
        assert!(err.to_string().contains("behavior.grade2.extra"));

        data.behavior.grade2.extra = 2.5;
        assert!(validate_non_academic(&policy, &data).is_err());

        data.behavior.grade2.extra = 1.5;
        assert!(validate_non_academic(&policy, &data).is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_hours() {
        let policy = NonAcademicPolicy::default();
        let mut data = NonAcademicData::default();
        data.volunteer.hours = -1.0;
        assert!(validate_non_academic(&policy, &data).is_err());
        data.volunteer.hours = f64::INFINITY;
        assert!(validate_non_academic(&policy, &data).is_err());
    }
}
