pub mod achievement;
pub mod non_academic;
pub mod normalize;
pub mod semester;
pub mod subject;
pub mod total;

pub use achievement::classify_subject;
pub use non_academic::{non_academic_score, validate_non_academic, NonAcademicScore};
pub use semester::{new_semester, rescore_semester, set_component, toggle_free_semester};
pub use subject::{score_subject, score_subject_detailed, validate_component, SubjectScore, TermContribution};
pub use total::{total_score, SemesterContribution, TotalScore};

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(70.46, 1), 70.5);
        assert_eq!(round_to(70.44, 1), 70.4);
        assert_eq!(round_to(1.2109, 2), 1.21);
        assert_eq!(round_to(27.000000000000004, 1), 27.0);
    }
}
