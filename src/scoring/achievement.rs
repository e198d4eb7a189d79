use crate::error::EngineError;
use crate::rules::{Achievement, Category, GradeLevel, RuleBook};

impl RuleBook {
    /// Band for a raw score on the given scale.
    pub fn classify(&self, raw_score: f64, category: Category) -> Achievement {
        self.thresholds(category).classify(raw_score)
    }
}

/// Band for a subject's raw score, picking the subject's scale.
pub fn classify_subject(
    rules: &RuleBook,
    grade: GradeLevel,
    subject: &str,
    raw_score: f64,
) -> Result<Achievement, EngineError> {
    rules
        .band_thresholds_for(subject, grade)
        .map(|thresholds| thresholds.classify(raw_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{BandCutoff, RuleSet};

    fn assert_monotonic(book: &RuleBook, category: Category) {
        let mut previous = book.classify(0.0, category).rank();
        for tenths in 1..=1000 {
            let score = tenths as f64 / 10.0;
            let rank = book.classify(score, category).rank();
            assert!(rank.is_some());
            assert!(rank >= previous, "{:?} dropped at {}", category, score);
            previous = rank;
        }
    }

    #[test]
    fn test_standard_monotonic() {
        assert_monotonic(&RuleBook::default(), Category::Standard);
    }

    #[test]
    fn test_practical_monotonic() {
        assert_monotonic(&RuleBook::default(), Category::Practical);
    }

    #[test]
    fn test_monotonic_under_custom_cutoffs() {
        let mut rules = RuleSet::default();
        rules.bands.standard = vec![
            BandCutoff { band: Achievement::A, min: 95.5 },
            BandCutoff { band: Achievement::B, min: 85.0 },
            BandCutoff { band: Achievement::C, min: 72.5 },
            BandCutoff { band: Achievement::D, min: 40.0 },
            BandCutoff { band: Achievement::E, min: 0.0 },
        ];
        let book = RuleBook::new(rules).unwrap();
        assert_monotonic(&book, Category::Standard);
        assert_eq!(book.classify(95.4, Category::Standard), Achievement::B);
        assert_eq!(book.classify(95.5, Category::Standard), Achievement::A);
    }

    #[test]
    fn test_bounds_covered() {
        let book = RuleBook::default();
        assert_eq!(book.classify(0.0, Category::Standard), Achievement::E);
        assert_eq!(book.classify(100.0, Category::Standard), Achievement::A);
        assert_eq!(book.classify(0.0, Category::Practical), Achievement::C);
        assert_eq!(book.classify(100.0, Category::Practical), Achievement::A);
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let book = RuleBook::default();
        assert_eq!(book.classify(89.9, Category::Standard), Achievement::B);
        assert_eq!(book.classify(90.0, Category::Standard), Achievement::A);
    }

    #[test]
    fn test_subject_picks_its_scale() {
        let book = RuleBook::default();
        let pe = classify_subject(&book, GradeLevel::One, "체육", 75.0).unwrap();
        let korean = classify_subject(&book, GradeLevel::One, "국어", 75.0).unwrap();
        assert_eq!(pe, Achievement::B);
        assert_eq!(korean, Achievement::C);
        assert!(classify_subject(&book, GradeLevel::Three, "도덕", 75.0).is_err());
    }
}
