pub mod config;
pub mod defaults;
pub mod types;
pub mod validation;

pub use config::*;
pub use types::{Achievement, Category, ComponentField, ComponentLayout, GradeLevel, SemesterHalf};
pub use validation::{validate_rules, ACADEMIC_CEILING, NON_ACADEMIC_CEILING, SUBJECTS_PER_GRADE};

use std::collections::HashMap;

use crate::error::EngineError;

/// A resolved weight formula: component fields and their weight fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightFormula {
    pub terms: Vec<(ComponentField, f64)>,
}

impl WeightFormula {
    pub fn weight_of(&self, field: ComponentField) -> Option<f64> {
        self.terms
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, w)| *w)
    }

    pub fn fields(&self) -> impl Iterator<Item = ComponentField> + '_ {
        self.terms.iter().map(|(f, _)| *f)
    }
}

/// Band cutoffs of one category, highest band first.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    pub category: Category,
    pub cutoffs: Vec<BandCutoff>,
}

impl Thresholds {
    /// First band whose minimum the score reaches. Cutoffs are validated to
    /// end at 0, so any score in 0..=100 lands in a band.
    pub fn classify(&self, raw_score: f64) -> Achievement {
        self.cutoffs
            .iter()
            .find(|cutoff| raw_score >= cutoff.min)
            .or_else(|| self.cutoffs.last())
            .map(|cutoff| cutoff.band)
            .unwrap_or(Achievement::E)
    }
}

#[derive(Debug, Clone)]
struct GradeTable {
    subjects: Vec<String>,
    formulas: HashMap<(SemesterHalf, String), WeightFormula>,
}

/// Validated, indexed rule set. The only way to score anything.
///
/// Construction fails fast with every configuration problem at once; after
/// that every listed (grade, half, subject) triple is guaranteed to resolve.
#[derive(Debug, Clone)]
pub struct RuleBook {
    source: RuleSet,
    grades: HashMap<GradeLevel, GradeTable>,
    standard: Thresholds,
    practical: Thresholds,
}

impl RuleBook {
    pub fn new(rules: RuleSet) -> Result<Self, EngineError> {
        validate_rules(&rules).map_err(EngineError::InvalidRules)?;

        let mut grades = HashMap::new();
        for grade_rules in &rules.grades {
            let mut formulas = HashMap::new();
            for subject in &grade_rules.subjects {
                for half in SemesterHalf::ALL {
                    // Validation guarantees exactly one match
                    if let Some(rule) = grade_rules
                        .formulas
                        .iter()
                        .find(|f| f.applies_to(half) && f.subjects.contains(subject))
                    {
                        formulas.insert(
                            (half, subject.clone()),
                            WeightFormula {
                                terms: rule.weights.terms(),
                            },
                        );
                    }
                }
            }
            grades.insert(
                grade_rules.grade,
                GradeTable {
                    subjects: grade_rules.subjects.clone(),
                    formulas,
                },
            );
        }

        tracing::debug!(
            name = %rules.name,
            grades = grades.len(),
            "rule book loaded"
        );

        Ok(Self {
            standard: Thresholds {
                category: Category::Standard,
                cutoffs: rules.bands.standard.clone(),
            },
            practical: Thresholds {
                category: Category::Practical,
                cutoffs: rules.bands.practical.clone(),
            },
            grades,
            source: rules,
        })
    }

    /// The rule set this book was built from.
    pub fn rules(&self) -> &RuleSet {
        &self.source
    }

    /// Fixed, ordered subject list of a grade.
    pub fn subjects(&self, grade: GradeLevel) -> &[String] {
        self.grades
            .get(&grade)
            .map(|table| table.subjects.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_subject(&self, grade: GradeLevel, subject: &str) -> bool {
        self.subjects(grade).iter().any(|s| s == subject)
    }

    /// Weight formula for a subject in a given grade and half.
    pub fn weights_for(
        &self,
        grade: GradeLevel,
        half: SemesterHalf,
        subject: &str,
    ) -> Result<&WeightFormula, EngineError> {
        if !self.has_subject(grade, subject) {
            return Err(EngineError::UnknownSubject {
                grade,
                subject: subject.to_string(),
            });
        }
        self.grades
            .get(&grade)
            .and_then(|table| table.formulas.get(&(half, subject.to_string())))
            .ok_or_else(|| EngineError::NoFormula {
                grade,
                half,
                subject: subject.to_string(),
            })
    }

    /// Whether the school holds the given component for the subject at all.
    ///
    /// Derived from the weight table: validation guarantees a subject uses the
    /// same fields in both halves, so the first-half formula is authoritative.
    pub fn is_component_applicable(
        &self,
        grade: GradeLevel,
        subject: &str,
        field: ComponentField,
    ) -> bool {
        self.weights_for(grade, SemesterHalf::First, subject)
            .map(|formula| formula.weight_of(field).is_some())
            .unwrap_or(false)
    }

    pub fn category_of(&self, subject: &str) -> Category {
        if self
            .source
            .bands
            .practical_subjects
            .iter()
            .any(|s| s == subject)
        {
            Category::Practical
        } else {
            Category::Standard
        }
    }

    pub fn thresholds(&self, category: Category) -> &Thresholds {
        match category {
            Category::Standard => &self.standard,
            Category::Practical => &self.practical,
        }
    }

    /// Band cutoffs that apply to a subject taught in `grade`.
    pub fn band_thresholds_for(
        &self,
        subject: &str,
        grade: GradeLevel,
    ) -> Result<&Thresholds, EngineError> {
        if !self.has_subject(grade, subject) {
            return Err(EngineError::UnknownSubject {
                grade,
                subject: subject.to_string(),
            });
        }
        Ok(self.thresholds(self.category_of(subject)))
    }

    pub fn performance(&self) -> &PerformanceScale {
        &self.source.performance
    }

    pub fn academic(&self) -> &AcademicPolicy {
        &self.source.academic
    }

    pub fn non_academic(&self) -> &NonAcademicPolicy {
        &self.source.non_academic
    }
}

/// Book built from the built-in rules. Those rules are checked by
/// `test_default_rules_validate`, so this never panics in practice.
impl Default for RuleBook {
    fn default() -> Self {
        match RuleBook::new(RuleSet::default()) {
            Ok(book) => book,
            Err(e) => panic!("built-in rule set is invalid: {}", e),
        }
    }
}
