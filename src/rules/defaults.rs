use super::config::{
    AcademicPolicy, BandConfig, BandCutoff, FormulaRule, FormulaWeights, GradeRules,
    NonAcademicPolicy, PerformanceScale, RuleSet,
};
use super::types::{Achievement, GradeLevel, SemesterHalf};

pub const GRADE_1_SUBJECTS: [&str; 11] = [
    "국어", "수학", "영어", "과학", "사회", "기가", "도덕", "한문", "미술", "음악", "체육",
];
pub const GRADE_2_SUBJECTS: [&str; 11] = [
    "국어", "수학", "영어", "과학", "역사", "기가", "도덕", "정보", "미술", "음악", "체육",
];
pub const GRADE_3_SUBJECTS: [&str; 11] = [
    "국어", "수학", "영어", "과학", "역사", "사회", "기가", "한문", "미술", "음악", "체육",
];

pub const PRACTICAL_SUBJECTS: [&str; 3] = ["미술", "음악", "체육"];

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn rule(subjects: &[&str], halves: Option<Vec<SemesterHalf>>, weights: FormulaWeights) -> FormulaRule {
    FormulaRule {
        subjects: names(subjects),
        halves,
        weights,
    }
}

fn grade1_rules() -> GradeRules {
    GradeRules {
        grade: GradeLevel::One,
        subjects: names(&GRADE_1_SUBJECTS),
        formulas: vec![
            rule(
                &["국어", "수학", "영어", "과학", "사회", "기가", "도덕"],
                None,
                FormulaWeights::grade1(Some(0.3), Some(0.3), 0.4),
            ),
            // no midterm
            rule(&["한문"], None, FormulaWeights::grade1(None, Some(0.3), 0.7)),
            rule(&["미술", "음악", "체육"], None, FormulaWeights::grade1(None, None, 1.0)),
        ],
    }
}

/// Formulas shared by grades 2 and 3.
fn upper_common() -> Vec<FormulaRule> {
    vec![
        rule(
            &["영어"],
            Some(vec![SemesterHalf::First]),
            FormulaWeights::upper([0.1, 0.1, 0.25, 0.25], Some(0.3)),
        ),
        rule(
            &["영어"],
            Some(vec![SemesterHalf::Second]),
            FormulaWeights::upper([0.1, 0.2, 0.2, 0.2], Some(0.3)),
        ),
        rule(&["기가"], None, FormulaWeights::upper([0.2, 0.1, 0.1, 0.3], Some(0.3))),
        rule(&["음악"], None, FormulaWeights::upper([0.2, 0.3, 0.2, 0.3], None)),
    ]
}

fn grade2_rules() -> GradeRules {
    let mut formulas = vec![
        rule(
            &["국어", "수학", "역사"],
            None,
            FormulaWeights::upper([0.2, 0.2, 0.2, 0.2], Some(0.2)),
        ),
        rule(
            &["과학"],
            Some(vec![SemesterHalf::First]),
            FormulaWeights::upper([0.2, 0.2, 0.2, 0.2], Some(0.2)),
        ),
        rule(
            &["과학"],
            Some(vec![SemesterHalf::Second]),
            FormulaWeights::upper([0.18, 0.17, 0.18, 0.17], Some(0.3)),
        ),
    ];
    formulas.extend(upper_common());
    formulas.push(rule(
        &["도덕", "정보", "미술", "체육"],
        None,
        FormulaWeights::upper([0.25, 0.25, 0.25, 0.25], None),
    ));

    GradeRules {
        grade: GradeLevel::Two,
        subjects: names(&GRADE_2_SUBJECTS),
        formulas,
    }
}

fn grade3_rules() -> GradeRules {
    let mut formulas = vec![
        rule(
            &["국어", "수학", "역사"],
            None,
            FormulaWeights::upper([0.2, 0.2, 0.2, 0.2], Some(0.2)),
        ),
        rule(
            &["과학"],
            None,
            FormulaWeights::upper([0.18, 0.17, 0.18, 0.17], Some(0.3)),
        ),
        // 한문 and 사회 sit no paper test in grade 3; its 0.3 is spread evenly
        // over the four tallies.
        rule(&["한문"], None, FormulaWeights::upper([0.275, 0.175, 0.175, 0.375], None)),
        rule(&["사회"], None, FormulaWeights::upper([0.225, 0.225, 0.275, 0.275], None)),
    ];
    formulas.extend(upper_common());
    formulas.push(rule(
        &["미술", "체육"],
        None,
        FormulaWeights::upper([0.25, 0.25, 0.25, 0.25], None),
    ));

    GradeRules {
        grade: GradeLevel::Three,
        subjects: names(&GRADE_3_SUBJECTS),
        formulas,
    }
}

fn cutoffs(list: &[(Achievement, f64)]) -> Vec<BandCutoff> {
    list.iter()
        .map(|&(band, min)| BandCutoff { band, min })
        .collect()
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            name: "화산중학교".to_string(),
            grades: vec![grade1_rules(), grade2_rules(), grade3_rules()],
            performance: PerformanceScale::default(),
            bands: BandConfig {
                standard: cutoffs(&[
                    (Achievement::A, 90.0),
                    (Achievement::B, 80.0),
                    (Achievement::C, 70.0),
                    (Achievement::D, 60.0),
                    (Achievement::E, 0.0),
                ]),
                practical: cutoffs(&[
                    (Achievement::A, 80.0),
                    (Achievement::B, 60.0),
                    (Achievement::C, 0.0),
                ]),
                practical_subjects: names(&PRACTICAL_SUBJECTS),
            },
            academic: AcademicPolicy::default(),
            non_academic: NonAcademicPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::validate_rules;

    #[test]
    fn test_default_rules_validate() {
        let rules = RuleSet::default();
        assert_eq!(validate_rules(&rules), Ok(()));
    }

    #[test]
    fn test_default_rules_yaml_roundtrip() {
        let rules = RuleSet::default();
        let yaml = serde_saphyr::to_string(&rules).unwrap();
        let parsed: RuleSet = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(rules, parsed);
    }

    #[test]
    fn test_each_grade_lists_eleven_subjects() {
        let rules = RuleSet::default();
        for grade in &rules.grades {
            assert_eq!(grade.subjects.len(), 11, "grade {}", grade.grade);
        }
    }
}
