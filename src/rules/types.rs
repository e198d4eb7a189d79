use serde::{Deserialize, Serialize};
use std::fmt;

/// School year. Serialized as `1`, `2` or `3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GradeLevel {
    One,
    Two,
    Three,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 3] = [GradeLevel::One, GradeLevel::Two, GradeLevel::Three];

    pub fn number(self) -> u8 {
        match self {
            GradeLevel::One => 1,
            GradeLevel::Two => 2,
            GradeLevel::Three => 3,
        }
    }

    /// Zero-based slot used by the per-grade arrays of the non-academic record.
    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    /// Which component layout this grade records.
    pub fn layout(self) -> ComponentLayout {
        match self {
            GradeLevel::One => ComponentLayout::Grade1,
            GradeLevel::Two | GradeLevel::Three => ComponentLayout::Upper,
        }
    }
}

impl TryFrom<u8> for GradeLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(GradeLevel::One),
            2 => Ok(GradeLevel::Two),
            3 => Ok(GradeLevel::Three),
            other => Err(format!("grade must be 1, 2 or 3 (got {})", other)),
        }
    }
}

impl From<GradeLevel> for u8 {
    fn from(value: GradeLevel) -> Self {
        value.number()
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}학년", self.number())
    }
}

/// First or second half of the school year. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SemesterHalf {
    First,
    Second,
}

impl SemesterHalf {
    pub const ALL: [SemesterHalf; 2] = [SemesterHalf::First, SemesterHalf::Second];

    pub fn number(self) -> u8 {
        match self {
            SemesterHalf::First => 1,
            SemesterHalf::Second => 2,
        }
    }
}

impl TryFrom<u8> for SemesterHalf {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SemesterHalf::First),
            2 => Ok(SemesterHalf::Second),
            other => Err(format!("semester half must be 1 or 2 (got {})", other)),
        }
    }
}

impl From<SemesterHalf> for u8 {
    fn from(value: SemesterHalf) -> Self {
        value.number()
    }
}

impl fmt::Display for SemesterHalf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}학기", self.number())
    }
}

/// The two component layouts a subject can be recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentLayout {
    /// midterm / final / performance
    Grade1,
    /// perfA..perfD tallies plus the paper test
    Upper,
}

impl fmt::Display for ComponentLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentLayout::Grade1 => write!(f, "grade-1 (midterm/final/performance)"),
            ComponentLayout::Upper => write!(f, "grade-2/3 (perfA-D/paperTest)"),
        }
    }
}

/// Identifier of a single raw input of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentField {
    Midterm,
    Final,
    Performance,
    PerfA,
    PerfB,
    PerfC,
    PerfD,
    PaperTest,
}

impl ComponentField {
    pub const GRADE1: [ComponentField; 3] = [
        ComponentField::Midterm,
        ComponentField::Final,
        ComponentField::Performance,
    ];

    pub const UPPER: [ComponentField; 5] = [
        ComponentField::PerfA,
        ComponentField::PerfB,
        ComponentField::PerfC,
        ComponentField::PerfD,
        ComponentField::PaperTest,
    ];

    pub fn layout(self) -> ComponentLayout {
        match self {
            ComponentField::Midterm | ComponentField::Final | ComponentField::Performance => {
                ComponentLayout::Grade1
            }
            _ => ComponentLayout::Upper,
        }
    }

    /// True for the bounded achievement-level tallies that go through the
    /// performance scale.
    pub fn is_tally(self) -> bool {
        matches!(
            self,
            ComponentField::PerfA | ComponentField::PerfB | ComponentField::PerfC | ComponentField::PerfD
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ComponentField::Midterm => "midterm",
            ComponentField::Final => "final",
            ComponentField::Performance => "performance",
            ComponentField::PerfA => "perfA",
            ComponentField::PerfB => "perfB",
            ComponentField::PerfC => "perfC",
            ComponentField::PerfD => "perfD",
            ComponentField::PaperTest => "paperTest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let all = ComponentField::GRADE1.iter().chain(ComponentField::UPPER.iter());
        all.copied().find(|f| f.name().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for ComponentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification scale a subject is graded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// National five-band scale.
    Standard,
    /// Arts / music / PE on the compressed band set.
    Practical,
}

/// Letter grade of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    A,
    B,
    C,
    D,
    E,
    /// Pass. Only used while a semester is free.
    P,
}

impl Achievement {
    /// Ordering rank with `E < D < C < B < A`. `P` is not ranked.
    pub fn rank(self) -> Option<u8> {
        match self {
            Achievement::E => Some(0),
            Achievement::D => Some(1),
            Achievement::C => Some(2),
            Achievement::B => Some(3),
            Achievement::A => Some(4),
            Achievement::P => None,
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Achievement::A => "A",
            Achievement::B => "B",
            Achievement::C => "C",
            Achievement::D => "D",
            Achievement::E => "E",
            Achievement::P => "P",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_level_from_number() {
        assert_eq!(GradeLevel::try_from(2).unwrap(), GradeLevel::Two);
        assert!(GradeLevel::try_from(4).is_err());
        assert_eq!(GradeLevel::Three.index(), 2);
    }

    #[test]
    fn test_grade_layout() {
        assert_eq!(GradeLevel::One.layout(), ComponentLayout::Grade1);
        assert_eq!(GradeLevel::Two.layout(), ComponentLayout::Upper);
        assert_eq!(GradeLevel::Three.layout(), ComponentLayout::Upper);
    }

    #[test]
    fn test_component_field_parse() {
        assert_eq!(ComponentField::parse("paperTest"), Some(ComponentField::PaperTest));
        assert_eq!(ComponentField::parse("PERFA"), Some(ComponentField::PerfA));
        assert_eq!(ComponentField::parse("final"), Some(ComponentField::Final));
        assert_eq!(ComponentField::parse("essay"), None);
    }

    #[test]
    fn test_achievement_rank_order() {
        let ordered = [
            Achievement::E,
            Achievement::D,
            Achievement::C,
            Achievement::B,
            Achievement::A,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
        assert_eq!(Achievement::P.rank(), None);
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(GradeLevel::One.to_string(), "1학년");
        assert_eq!(SemesterHalf::Second.to_string(), "2학기");
    }
}
