use serde::{Deserialize, Serialize};

use super::types::{Achievement, ComponentField, GradeLevel, SemesterHalf};

/// Complete scoring policy of one school.
///
/// This is plain data: it can be loaded from YAML, compared and serialized,
/// but it is never scored against directly. [`crate::rules::RuleBook::new`]
/// validates it and builds the lookup tables the scorer uses.
///
/// Example YAML (abridged):
/// ```yaml
/// name: 화산중학교
/// grades:
///   - grade: 1
///     subjects: [국어, 수학, 음악]
///     formulas:
///       - subjects: [국어, 수학]
///         weights: { midterm: 0.3, final: 0.3, performance: 0.4 }
///       - subjects: [음악]
///         weights: { performance: 1.0 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RuleSet {
    /// Human-readable name of the policy (school, year).
    pub name: String,

    /// Subject lists and weight formulas, one entry per grade.
    pub grades: Vec<GradeRules>,

    /// How perfA..perfD tallies map onto 0..100.
    pub performance: PerformanceScale,

    /// Achievement band cutoffs.
    pub bands: BandConfig,

    /// Academic ceiling and free-semester treatment.
    #[serde(default)]
    pub academic: AcademicPolicy,

    /// Attendance / volunteer / behavior partition of the 60 points.
    #[serde(default)]
    pub non_academic: NonAcademicPolicy,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct GradeRules {
    pub grade: GradeLevel,

    /// Fixed, ordered subject list of the grade.
    pub subjects: Vec<String>,

    pub formulas: Vec<FormulaRule>,
}

/// One weight formula and the subjects (and optionally halves) it covers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FormulaRule {
    pub subjects: Vec<String>,

    /// Halves the rule applies to. Omitted means both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halves: Option<Vec<SemesterHalf>>,

    pub weights: FormulaWeights,
}

impl FormulaRule {
    pub fn applies_to(&self, half: SemesterHalf) -> bool {
        self.halves
            .as_ref()
            .map(|halves| halves.contains(&half))
            .unwrap_or(true)
    }
}

/// Weight fractions per component. An omitted component is not applicable
/// to the subjects of the rule.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct FormulaWeights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midterm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "final")]
    pub final_exam: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_a: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_b: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_d: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_test: Option<f64>,
}

impl FormulaWeights {
    /// Grade-1 weights.
    pub fn grade1(midterm: Option<f64>, final_exam: Option<f64>, performance: f64) -> Self {
        Self {
            midterm,
            final_exam,
            performance: Some(performance),
            ..Self::default()
        }
    }

    /// Grade-2/3 weights: four tallies and an optional paper test.
    pub fn upper(perf: [f64; 4], paper_test: Option<f64>) -> Self {
        Self {
            perf_a: Some(perf[0]),
            perf_b: Some(perf[1]),
            perf_c: Some(perf[2]),
            perf_d: Some(perf[3]),
            paper_test,
            ..Self::default()
        }
    }

    /// Present terms in canonical field order.
    pub fn terms(&self) -> Vec<(ComponentField, f64)> {
        [
            (ComponentField::Midterm, self.midterm),
            (ComponentField::Final, self.final_exam),
            (ComponentField::Performance, self.performance),
            (ComponentField::PerfA, self.perf_a),
            (ComponentField::PerfB, self.perf_b),
            (ComponentField::PerfC, self.perf_c),
            (ComponentField::PerfD, self.perf_d),
            (ComponentField::PaperTest, self.paper_test),
        ]
        .into_iter()
        .filter_map(|(field, weight)| weight.map(|w| (field, w)))
        .collect()
    }
}

/// Mapping of a perfA..perfD tally onto 0..100.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PerformanceScale {
    /// Highest tally an assessment slot can record.
    pub max_tally: u32,

    /// Optional banded table: `levels[t]` is the score for tally `t`.
    /// Omitted means linear interpolation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<f64>>,
}

impl Default for PerformanceScale {
    fn default() -> Self {
        Self {
            max_tally: 8,
            levels: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BandConfig {
    /// Cutoffs of the national five-band scale, highest band first.
    pub standard: Vec<BandCutoff>,

    /// Cutoffs of the compressed arts/PE scale, highest band first.
    pub practical: Vec<BandCutoff>,

    /// Subjects graded on the practical scale.
    pub practical_subjects: Vec<String>,
}

/// Lowest raw score (inclusive) that earns `band`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BandCutoff {
    pub band: Achievement,
    pub min: f64,
}

/// What a free semester is worth toward the academic ceiling.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FreeSemesterPolicy {
    /// Free semesters earn nothing; their share of the ceiling is lost.
    #[default]
    Zero,
    /// The ceiling is spread over the scored semesters only.
    Prorate,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AcademicPolicy {
    pub ceiling: f64,
    #[serde(default)]
    pub free_semester: FreeSemesterPolicy,
}

impl Default for AcademicPolicy {
    fn default() -> Self {
        Self {
            ceiling: 240.0,
            free_semester: FreeSemesterPolicy::Zero,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct NonAcademicPolicy {
    #[serde(default)]
    pub attendance: AttendancePolicy,
    #[serde(default)]
    pub volunteer: VolunteerPolicy,
    #[serde(default)]
    pub behavior: BehaviorPolicy,
}

impl NonAcademicPolicy {
    /// Points available at maximal marks across the three parts.
    pub fn ceiling(&self) -> f64 {
        self.attendance.points_per_grade * 3.0 + self.volunteer.points + self.behavior.points
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct AttendancePolicy {
    /// Ceiling of each grade's attendance score.
    pub points_per_grade: f64,
    /// Deduction per (equivalent) absence.
    pub absence_deduction: f64,
    /// Tardies, early leaves and partial absences that add up to one absence.
    pub minor_events_per_absence: u32,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            points_per_grade: 10.0,
            absence_deduction: 1.0,
            minor_events_per_absence: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct VolunteerPolicy {
    pub points: f64,
    /// Hours for full marks when no tier is chosen.
    pub default_hours: f64,
    /// Hours for full marks under the `30h` tier.
    pub thirty_hour_tier: f64,
    /// Hours for full marks under the `20h` tier.
    pub twenty_hour_tier: f64,
}

impl Default for VolunteerPolicy {
    fn default() -> Self {
        Self {
            points: 15.0,
            default_hours: 30.0,
            thirty_hour_tier: 30.0,
            twenty_hour_tier: 20.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct BehaviorPolicy {
    pub points: f64,
    pub base_max: f64,
    pub extra_max: f64,
    pub extra_step: f64,
}

impl Default for BehaviorPolicy {
    fn default() -> Self {
        Self {
            points: 15.0,
            base_max: 3.0,
            extra_max: 2.0,
            extra_step: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_non_academic_ceiling_is_sixty() {
        assert_eq!(NonAcademicPolicy::default().ceiling(), 60.0);
    }

    #[test]
    fn test_formula_terms_in_field_order() {
        let weights = FormulaWeights::grade1(Some(0.3), Some(0.3), 0.4);
        let terms = weights.terms();
        assert_eq!(
            terms,
            vec![
                (ComponentField::Midterm, 0.3),
                (ComponentField::Final, 0.3),
                (ComponentField::Performance, 0.4),
            ]
        );
    }

    #[test]
    fn test_rule_without_halves_applies_to_both() {
        let rule = FormulaRule {
            subjects: vec!["국어".to_string()],
            halves: None,
            weights: FormulaWeights::grade1(None, None, 1.0),
        };
        assert!(rule.applies_to(SemesterHalf::First));
        assert!(rule.applies_to(SemesterHalf::Second));

        let first_only = FormulaRule {
            halves: Some(vec![SemesterHalf::First]),
            ..rule
        };
        assert!(first_only.applies_to(SemesterHalf::First));
        assert!(!first_only.applies_to(SemesterHalf::Second));
    }

    #[test]
    fn test_partial_policy_parse_uses_defaults() {
        let yaml = r#"
attendance:
  pointsPerGrade: 8
  absenceDeduction: 2
  minorEventsPerAbsence: 3
"#;
        let policy: NonAcademicPolicy = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(policy.attendance.points_per_grade, 8.0);
        assert_eq!(policy.volunteer, VolunteerPolicy::default());
        assert_eq!(policy.behavior, BehaviorPolicy::default());
    }

    #[test]
    fn test_formula_weights_parse_final_key() {
        let yaml = "{ final: 0.3, performance: 0.7 }";
        let weights: FormulaWeights = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(weights.final_exam, Some(0.3));
        assert_eq!(weights.performance, Some(0.7));
        assert!(weights.midterm.is_none());
    }

    #[test]
    fn test_unknown_weight_key_rejected() {
        let yaml = "{ essay: 0.5 }";
        let result: Result<FormulaWeights, _> = serde_saphyr::from_str(yaml);
        assert!(result.is_err());
    }
}
