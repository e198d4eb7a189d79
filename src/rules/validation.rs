use std::collections::{BTreeSet, HashSet};

use super::config::{BandCutoff, RuleSet};
use super::types::{ComponentField, GradeLevel, SemesterHalf};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Number of subjects every grade carries.
pub const SUBJECTS_PER_GRADE: usize = 11;

/// Composite points reserved for the non-academic score.
pub const NON_ACADEMIC_CEILING: f64 = 60.0;

/// Composite points reserved for the six semesters.
pub const ACADEMIC_CEILING: f64 = 240.0;

/// Validate a rule set before it is used for scoring.
/// Returns all validation errors at once (not just the first).
pub fn validate_rules(rules: &RuleSet) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if rules.name.trim().is_empty() {
        errors.push("name: must not be empty".to_string());
    }

    validate_grades(rules, &mut errors);
    validate_performance(rules, &mut errors);
    validate_bands(rules, &mut errors);
    validate_ceilings(rules, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_grades(rules: &RuleSet, errors: &mut Vec<String>) {
    for grade in GradeLevel::ALL {
        let count = rules.grades.iter().filter(|g| g.grade == grade).count();
        if count != 1 {
            errors.push(format!(
                "grades: grade {} must appear exactly once (found {})",
                grade.number(),
                count
            ));
        }
    }

    for (gi, grade_rules) in rules.grades.iter().enumerate() {
        let grade = grade_rules.grade;

        if grade_rules.subjects.len() != SUBJECTS_PER_GRADE {
            errors.push(format!(
                "grades[{}].subjects: grade {} must list {} subjects (found {})",
                gi,
                grade.number(),
                SUBJECTS_PER_GRADE,
                grade_rules.subjects.len()
            ));
        }

        let mut seen = HashSet::new();
        for subject in &grade_rules.subjects {
            if !seen.insert(subject.as_str()) {
                errors.push(format!("grades[{}].subjects: duplicate subject '{}'", gi, subject));
            }
        }

        for (fi, formula) in grade_rules.formulas.iter().enumerate() {
            let path = format!("grades[{}].formulas[{}]", gi, fi);

            if formula.subjects.is_empty() {
                errors.push(format!("{}.subjects: must not be empty", path));
            }
            for subject in &formula.subjects {
                if !seen.contains(subject.as_str()) {
                    errors.push(format!(
                        "{}.subjects: '{}' is not a grade {} subject",
                        path,
                        subject,
                        grade.number()
                    ));
                }
            }
            if let Some(halves) = &formula.halves {
                if halves.is_empty() {
                    errors.push(format!("{}.halves: must not be empty", path));
                }
            }

            let terms = formula.weights.terms();
            if terms.is_empty() {
                errors.push(format!("{}.weights: at least one component is required", path));
            }
            for (field, weight) in &terms {
                if field.layout() != grade.layout() {
                    errors.push(format!(
                        "{}.weights.{}: not part of the {} layout",
                        path,
                        field,
                        grade.layout()
                    ));
                }
                if !weight.is_finite() || *weight <= 0.0 {
                    errors.push(format!("{}.weights.{}: must be positive", path, field));
                }
            }
            let sum: f64 = terms.iter().map(|(_, w)| w).sum();
            if !terms.is_empty() && (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                errors.push(format!("{}.weights: must sum to 1.0 (sum is {})", path, sum));
            }
        }

        // Every (half, subject) pair must resolve to exactly one formula, and a
        // subject's applicable fields must not depend on the half.
        for subject in &grade_rules.subjects {
            let mut field_sets: Vec<BTreeSet<ComponentField>> = Vec::new();
            for half in SemesterHalf::ALL {
                let matches: Vec<_> = grade_rules
                    .formulas
                    .iter()
                    .filter(|f| f.applies_to(half) && f.subjects.contains(subject))
                    .collect();
                match matches.len() {
                    0 => errors.push(format!(
                        "grades[{}]: no formula for '{}' in {} {}",
                        gi, subject, grade, half
                    )),
                    1 => field_sets.push(
                        matches[0]
                            .weights
                            .terms()
                            .into_iter()
                            .map(|(field, _)| field)
                            .collect(),
                    ),
                    n => errors.push(format!(
                        "grades[{}]: {} formulas match '{}' in {} {}",
                        gi, n, subject, grade, half
                    )),
                }
            }
            if field_sets.len() == 2 && field_sets[0] != field_sets[1] {
                errors.push(format!(
                    "grades[{}]: applicable components of '{}' differ between halves",
                    gi, subject
                ));
            }
        }
    }
}

fn validate_performance(rules: &RuleSet, errors: &mut Vec<String>) {
    let scale = &rules.performance;
    if scale.max_tally == 0 {
        errors.push("performance.maxTally: must be at least 1".to_string());
    }
    if let Some(levels) = &scale.levels {
        if levels.len() != scale.max_tally as usize + 1 {
            errors.push(format!(
                "performance.levels: expected {} entries (maxTally + 1), found {}",
                scale.max_tally as usize + 1,
                levels.len()
            ));
        }
        if levels.first() != Some(&0.0) {
            errors.push("performance.levels: first level must be 0".to_string());
        }
        if levels.last() != Some(&100.0) {
            errors.push("performance.levels: last level must be 100".to_string());
        }
        if levels.windows(2).any(|pair| pair[1] < pair[0]) {
            errors.push("performance.levels: must be non-decreasing".to_string());
        }
    }
}

fn validate_cutoffs(path: &str, cutoffs: &[BandCutoff], errors: &mut Vec<String>) {
    if cutoffs.is_empty() {
        errors.push(format!("{}: at least one band is required", path));
        return;
    }

    for (i, cutoff) in cutoffs.iter().enumerate() {
        if cutoff.band.rank().is_none() {
            errors.push(format!("{}[{}].band: P is not a scored band", path, i));
        }
        if !(0.0..=100.0).contains(&cutoff.min) {
            errors.push(format!("{}[{}].min: must be within 0..=100", path, i));
        }
    }

    for (i, pair) in cutoffs.windows(2).enumerate() {
        if pair[1].min >= pair[0].min {
            errors.push(format!(
                "{}[{}].min: cutoffs must strictly descend ({} after {})",
                path,
                i + 1,
                pair[1].min,
                pair[0].min
            ));
        }
        if pair[1].band.rank() >= pair[0].band.rank() {
            errors.push(format!(
                "{}[{}].band: {} must rank below {}",
                path,
                i + 1,
                pair[1].band,
                pair[0].band
            ));
        }
    }

    if let Some(last) = cutoffs.last() {
        if last.min != 0.0 {
            errors.push(format!("{}: lowest band must start at 0 to cover 0..=100", path));
        }
    }
}

fn validate_bands(rules: &RuleSet, errors: &mut Vec<String>) {
    validate_cutoffs("bands.standard", &rules.bands.standard, errors);
    validate_cutoffs("bands.practical", &rules.bands.practical, errors);

    for subject in &rules.bands.practical_subjects {
        let known = rules.grades.iter().any(|g| g.subjects.contains(subject));
        if !known {
            errors.push(format!(
                "bands.practicalSubjects: '{}' is not taught in any grade",
                subject
            ));
        }
    }
}

fn validate_ceilings(rules: &RuleSet, errors: &mut Vec<String>) {
    if (rules.academic.ceiling - ACADEMIC_CEILING).abs() > WEIGHT_TOLERANCE {
        errors.push(format!(
            "academic.ceiling: must be {} (found {})",
            ACADEMIC_CEILING, rules.academic.ceiling
        ));
    }

    let policy = &rules.non_academic;
    let parts = [
        ("nonAcademic.attendance.pointsPerGrade", policy.attendance.points_per_grade),
        ("nonAcademic.attendance.absenceDeduction", policy.attendance.absence_deduction),
        ("nonAcademic.volunteer.points", policy.volunteer.points),
        ("nonAcademic.volunteer.defaultHours", policy.volunteer.default_hours),
        ("nonAcademic.volunteer.thirtyHourTier", policy.volunteer.thirty_hour_tier),
        ("nonAcademic.volunteer.twentyHourTier", policy.volunteer.twenty_hour_tier),
        ("nonAcademic.behavior.points", policy.behavior.points),
        ("nonAcademic.behavior.baseMax", policy.behavior.base_max),
        ("nonAcademic.behavior.extraMax", policy.behavior.extra_max),
        ("nonAcademic.behavior.extraStep", policy.behavior.extra_step),
    ];
    for (path, value) in parts {
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{}: must be positive", path));
        }
    }
    if policy.attendance.minor_events_per_absence == 0 {
        errors.push("nonAcademic.attendance.minorEventsPerAbsence: must be at least 1".to_string());
    }

    let ceiling = policy.ceiling();
    if (ceiling - NON_ACADEMIC_CEILING).abs() > WEIGHT_TOLERANCE {
        errors.push(format!(
            "nonAcademic: attendance, volunteer and behavior must partition {} points (sum is {})",
            NON_ACADEMIC_CEILING, ceiling
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Achievement, FormulaRule, FormulaWeights};

    fn errors_of(rules: &RuleSet) -> Vec<String> {
        validate_rules(rules).unwrap_err()
    }

    #[test]
    fn test_valid_default_rules() {
        assert!(validate_rules(&RuleSet::default()).is_ok());
    }

    #[test]
    fn test_missing_formula_detected() {
        let mut rules = RuleSet::default();
        // Drop the 미술/음악/체육 rule of grade 1
        rules.grades[0].formulas.pop();
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("no formula for '미술'")));
        assert!(errors.iter().any(|e| e.contains("no formula for '체육'")));
    }

    #[test]
    fn test_overlapping_formulas_detected() {
        let mut rules = RuleSet::default();
        rules.grades[0].formulas.push(FormulaRule {
            subjects: vec!["국어".to_string()],
            halves: Some(vec![SemesterHalf::Second]),
            weights: FormulaWeights::grade1(None, None, 1.0),
        });
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("2 formulas match '국어'")));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut rules = RuleSet::default();
        rules.grades[0].formulas[0].weights = FormulaWeights::grade1(Some(0.3), Some(0.3), 0.3);
        let errors = errors_of(&rules);
        assert!(errors
            .iter()
            .any(|e| e.starts_with("grades[0].formulas[0].weights: must sum to 1.0")));
    }

    #[test]
    fn test_field_outside_layout_rejected() {
        let mut rules = RuleSet::default();
        rules.grades[0].formulas[2].weights = FormulaWeights::upper([0.25, 0.25, 0.25, 0.25], None);
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("weights.perfA: not part of")));
    }

    #[test]
    fn test_applicability_must_not_vary_by_half() {
        let mut rules = RuleSet::default();
        // Grade-2 English second half loses its paper test
        let english_second = rules.grades[1]
            .formulas
            .iter_mut()
            .find(|f| f.subjects == ["영어"] && f.halves == Some(vec![SemesterHalf::Second]))
            .unwrap();
        english_second.weights = FormulaWeights::upper([0.25, 0.25, 0.25, 0.25], None);
        let errors = errors_of(&rules);
        assert!(errors
            .iter()
            .any(|e| e.contains("applicable components of '영어' differ between halves")));
    }

    #[test]
    fn test_unknown_formula_subject() {
        let mut rules = RuleSet::default();
        rules.grades[1].formulas[0].subjects.push("한문".to_string());
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("'한문' is not a grade 2 subject")));
    }

    #[test]
    fn test_wrong_subject_count() {
        let mut rules = RuleSet::default();
        rules.grades[2].subjects.pop();
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("must list 11 subjects (found 10)")));
    }

    #[test]
    fn test_overlapping_bands_rejected() {
        let mut rules = RuleSet::default();
        rules.bands.standard[1].min = 95.0;
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("bands.standard[1].min")));
    }

    #[test]
    fn test_band_gap_at_zero_rejected() {
        let mut rules = RuleSet::default();
        rules.bands.practical.last_mut().unwrap().min = 10.0;
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("bands.practical: lowest band must start at 0")));
    }

    #[test]
    fn test_pass_band_rejected() {
        let mut rules = RuleSet::default();
        rules.bands.practical[0].band = Achievement::P;
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("P is not a scored band")));
    }

    #[test]
    fn test_bad_performance_levels() {
        let mut rules = RuleSet::default();
        rules.performance.levels = Some(vec![0.0, 50.0, 40.0, 100.0]);
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("expected 9 entries")));
        assert!(errors.iter().any(|e| e.contains("non-decreasing")));
    }

    #[test]
    fn test_non_academic_partition_must_be_sixty() {
        let mut rules = RuleSet::default();
        rules.non_academic.volunteer.points = 20.0;
        let errors = errors_of(&rules);
        assert!(errors.iter().any(|e| e.contains("must partition 60 points (sum is 65)")));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut rules = RuleSet::default();
        rules.name = String::new(); // Error 1
        rules.performance.max_tally = 0; // Error 2
        rules.academic.ceiling = 200.0; // Error 3
        let errors = errors_of(&rules);
        assert_eq!(errors.len(), 3);
    }
}
