use crate::record::{AcademicRecord, SemesterData, SemesterKey, SemesterState};
use crate::rules::{FreeSemesterPolicy, RuleBook, NON_ACADEMIC_CEILING};

use super::non_academic::{non_academic_score, NonAcademicScore};
use super::round_to;

/// What one semester added to the academic score.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterContribution {
    pub key: SemesterKey,
    /// `None` when nothing has been entered for the semester yet.
    pub state: Option<SemesterState>,
    /// Mean raw score of the semester's subjects (scored semesters only).
    pub average: Option<f64>,
    /// Share of the academic ceiling this semester can earn.
    pub share: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalScore {
    pub semesters: Vec<SemesterContribution>,
    /// Academic points, rounded to 2 decimals.
    pub academic: f64,
    pub non_academic: NonAcademicScore,
    /// Composite out of 300, rounded to 2 decimals.
    pub total: f64,
}

fn semester_average(semester: &SemesterData) -> f64 {
    let scores: Vec<f64> = semester
        .subjects
        .iter()
        .filter_map(|s| s.raw_score.value())
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Composite score of a record.
///
/// Each of the six semesters owns an equal share of the academic ceiling and
/// earns it in proportion to its subjects' mean raw score. Under the `zero`
/// policy a free semester's share is simply lost; under `prorate` the ceiling
/// is divided among the scored semesters only. Missing semesters count as
/// scored with nothing earned.
pub fn total_score(rules: &RuleBook, record: &AcademicRecord) -> TotalScore {
    let academic_policy = rules.academic();
    let keys = SemesterKey::all();

    let free_count = keys
        .iter()
        .filter(|key| {
            record
                .semester(key)
                .map(|s| s.state() == SemesterState::Free)
                .unwrap_or(false)
        })
        .count();
    let scored_count = keys.len() - free_count;

    let share = match academic_policy.free_semester {
        FreeSemesterPolicy::Zero => academic_policy.ceiling / keys.len() as f64,
        FreeSemesterPolicy::Prorate if scored_count > 0 => {
            academic_policy.ceiling / scored_count as f64
        }
        FreeSemesterPolicy::Prorate => 0.0,
    };

    let semesters: Vec<SemesterContribution> = keys
        .into_iter()
        .map(|key| {
            let semester = record.semester(&key);
            let state = semester.map(|s| s.state());
            match semester {
                Some(s) if s.state() == SemesterState::Free => SemesterContribution {
                    key,
                    state,
                    average: None,
                    share: 0.0,
                    points: 0.0,
                },
                Some(s) => {
                    let average = semester_average(s);
                    SemesterContribution {
                        key,
                        state,
                        average: Some(average),
                        share,
                        points: share * average / 100.0,
                    }
                }
                None => SemesterContribution {
                    key,
                    state,
                    average: None,
                    share,
                    points: 0.0,
                },
            }
        })
        .collect();

    let academic: f64 = semesters.iter().map(|s| s.points).sum();
    let non_academic = non_academic_score(rules.non_academic(), &record.non_academic);
    let total = round_to(academic + non_academic.total.min(NON_ACADEMIC_CEILING), 2);

    tracing::debug!(
        academic,
        non_academic = non_academic.total,
        total,
        free_semesters = free_count,
        "total score computed"
    );

    TotalScore {
        semesters,
        academic: round_to(academic, 2),
        non_academic,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BehaviorPoints, RawScore, SemesterData};
    use crate::rules::{GradeLevel, RuleSet, SemesterHalf};
    use crate::scoring::semester::{new_semester, toggle_free_semester};

    fn uniform_semester(book: &RuleBook, grade: GradeLevel, score: f64) -> SemesterData {
        let mut semester = new_semester(book, grade);
        for subject in &mut semester.subjects {
            subject.raw_score = RawScore::Scored(score);
        }
        semester
    }

    fn full_record(book: &RuleBook, score: f64) -> AcademicRecord {
        let mut record = AcademicRecord::default();
        for key in SemesterKey::all() {
            record = record.with_semester(key, uniform_semester(book, key.grade, score));
        }
        record
    }

    #[test]
    fn test_empty_record_scores_non_academic_only() {
        let book = RuleBook::default();
        let total = total_score(&book, &AcademicRecord::default());
        assert_eq!(total.academic, 0.0);
        assert_eq!(total.total, 39.0);
        assert_eq!(total.semesters.len(), 6);
    }

    #[test]
    fn test_perfect_record_scores_three_hundred() {
        let book = RuleBook::default();
        let mut record = full_record(&book, 100.0);
        let full = BehaviorPoints { base: 3.0, extra: 2.0 };
        record.non_academic.behavior.grade1 = full;
        record.non_academic.behavior.grade2 = full;
        record.non_academic.behavior.grade3 = full;
        record.non_academic.volunteer.hours = 40.0;

        let total = total_score(&book, &record);
        assert_eq!(total.academic, 240.0);
        assert_eq!(total.non_academic.total, 60.0);
        assert_eq!(total.total, 300.0);
    }

    #[test]
    fn test_semester_share_is_proportional() {
        let book = RuleBook::default();
        let key = SemesterKey::new(GradeLevel::Two, SemesterHalf::First);
        let record = AcademicRecord::default().with_semester(key, uniform_semester(&book, GradeLevel::Two, 75.0));
        let total = total_score(&book, &record);
        // 40 * 0.75
        assert_eq!(total.academic, 30.0);
        let contribution = total.semesters.iter().find(|s| s.key == key).unwrap();
        assert_eq!(contribution.average, Some(75.0));
        assert_eq!(contribution.points, 30.0);
    }

    #[test]
    fn test_free_semester_contributes_zero() {
        let book = RuleBook::default();
        let key = SemesterKey::new(GradeLevel::One, SemesterHalf::First);
        let record = full_record(&book, 80.0);
        let before = total_score(&book, &record);

        let free = toggle_free_semester(record.semester(&key).unwrap(), true);
        let after = total_score(&book, &record.with_semester(key, free));

        let contribution = after.semesters.iter().find(|s| s.key == key).unwrap();
        assert_eq!(contribution.points, 0.0);
        assert_eq!(contribution.state, Some(SemesterState::Free));
        // 6 * 32 = 192 before, 5 * 32 = 160 after
        assert_eq!(before.academic, 192.0);
        assert_eq!(after.academic, 160.0);
    }

    #[test]
    fn test_prorate_policy_spreads_free_share() {
        let mut rules = RuleSet::default();
        rules.academic.free_semester = FreeSemesterPolicy::Prorate;
        let book = RuleBook::new(rules).unwrap();

        let key = SemesterKey::new(GradeLevel::One, SemesterHalf::First);
        let record = full_record(&book, 80.0);
        let free = toggle_free_semester(record.semester(&key).unwrap(), true);
        let total = total_score(&book, &record.with_semester(key, free));

        // 240 spread over 5 scored semesters at 80%
        assert_eq!(total.academic, 192.0);
    }

    #[test]
    fn test_total_rounded_to_two_decimals() {
        let book = RuleBook::default();
        let key = SemesterKey::new(GradeLevel::Three, SemesterHalf::Second);
        let mut semester = uniform_semester(&book, GradeLevel::Three, 0.0);
        semester.subjects[0].raw_score = RawScore::Scored(33.3);
        let total = total_score(&book, &AcademicRecord::default().with_semester(key, semester));
        assert_eq!(total.total, (total.total * 100.0).round() / 100.0);
        // 40 * (33.3 / 11) / 100 = 1.2109...
        assert_eq!(total.academic, 1.21);
    }
}
