//! Student transcript data: six semesters of subject grades plus the
//! non-academic record.
//!
//! Every value here is plain data. Derived fields (`raw_score`,
//! `achievement`) are only ever written by the scoring functions; edits go
//! through [`edit::apply_edit`], which returns a new record.

pub mod edit;
pub mod storage;

pub use edit::{apply_edit, recompute, AttendanceKind, BehaviorEdit, RecordEdit};
pub use storage::{load_record_file, save_record_file, RecordFile};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::rules::{Achievement, ComponentField, ComponentLayout, GradeLevel, SemesterHalf};

/// Identifies one of the six semesters, rendered as `"1학년 1학기"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemesterKey {
    pub grade: GradeLevel,
    pub half: SemesterHalf,
}

impl SemesterKey {
    pub fn new(grade: GradeLevel, half: SemesterHalf) -> Self {
        Self { grade, half }
    }

    /// All six keys in chronological order.
    pub fn all() -> Vec<SemesterKey> {
        GradeLevel::ALL
            .iter()
            .flat_map(|&grade| SemesterHalf::ALL.iter().map(move |&half| SemesterKey::new(grade, half)))
            .collect()
    }
}

impl fmt::Display for SemesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.grade, self.half)
    }
}

impl FromStr for SemesterKey {
    type Err = String;

    /// Accepts `"1학년 1학기"` as well as the shorthand `"1-1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<u8> = s
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as u8)
            .collect();
        if digits.len() != 2 {
            return Err(format!("invalid semester '{}': expected e.g. '1학년 1학기' or '1-1'", s));
        }
        let grade = GradeLevel::try_from(digits[0])?;
        let half = SemesterHalf::try_from(digits[1])?;
        Ok(SemesterKey::new(grade, half))
    }
}

impl Serialize for SemesterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemesterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Marker written in place of a number while a semester is free.
pub const NOT_APPLICABLE: &str = "-";

/// A subject's computed score, or nothing while the semester is free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawScore {
    Scored(f64),
    NotApplicable,
}

impl RawScore {
    pub fn value(self) -> Option<f64> {
        match self {
            RawScore::Scored(v) => Some(v),
            RawScore::NotApplicable => None,
        }
    }
}

impl fmt::Display for RawScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScore::Scored(v) => write!(f, "{:.1}", v),
            RawScore::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl Serialize for RawScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RawScore::Scored(v) => serializer.serialize_f64(*v),
            RawScore::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de> Deserialize<'de> for RawScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(RawScore::Scored(v)),
            Repr::Text(s) if s == NOT_APPLICABLE || s == "not-applicable" => {
                Ok(RawScore::NotApplicable)
            }
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "raw score must be a number or '{}' (got '{}')",
                NOT_APPLICABLE, s
            ))),
        }
    }
}

/// Grade-1 inputs. All values are on their final scale: exams out of 100,
/// performance as points out of `weight * 100`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade1Components {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midterm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "final")]
    pub final_exam: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<f64>,
}

/// Grade-2/3 inputs: four achievement-level tallies and the paper test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpperComponents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_a: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_b: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_c: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf_d: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_test: Option<f64>,
}

/// Raw inputs of one subject, in the layout of its grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "camelCase")]
pub enum Components {
    Grade1(Grade1Components),
    Upper(UpperComponents),
}

impl Components {
    pub fn empty(layout: ComponentLayout) -> Self {
        match layout {
            ComponentLayout::Grade1 => Components::Grade1(Grade1Components::default()),
            ComponentLayout::Upper => Components::Upper(UpperComponents::default()),
        }
    }

    pub fn layout(&self) -> ComponentLayout {
        match self {
            Components::Grade1(_) => ComponentLayout::Grade1,
            Components::Upper(_) => ComponentLayout::Upper,
        }
    }

    /// Value of a field, `None` when unset or not part of this layout.
    pub fn get(&self, field: ComponentField) -> Option<f64> {
        match (self, field) {
            (Components::Grade1(c), ComponentField::Midterm) => c.midterm,
            (Components::Grade1(c), ComponentField::Final) => c.final_exam,
            (Components::Grade1(c), ComponentField::Performance) => c.performance,
            (Components::Upper(c), ComponentField::PerfA) => c.perf_a.map(f64::from),
            (Components::Upper(c), ComponentField::PerfB) => c.perf_b.map(f64::from),
            (Components::Upper(c), ComponentField::PerfC) => c.perf_c.map(f64::from),
            (Components::Upper(c), ComponentField::PerfD) => c.perf_d.map(f64::from),
            (Components::Upper(c), ComponentField::PaperTest) => c.paper_test,
            _ => None,
        }
    }

    /// Set a field. Tallies are truncated to whole numbers; callers validate
    /// ranges first. Returns false if the field is not part of this layout.
    pub fn set(&mut self, field: ComponentField, value: f64) -> bool {
        let tally = value as u32;
        match (self, field) {
            (Components::Grade1(c), ComponentField::Midterm) => c.midterm = Some(value),
            (Components::Grade1(c), ComponentField::Final) => c.final_exam = Some(value),
            (Components::Grade1(c), ComponentField::Performance) => c.performance = Some(value),
            (Components::Upper(c), ComponentField::PerfA) => c.perf_a = Some(tally),
            (Components::Upper(c), ComponentField::PerfB) => c.perf_b = Some(tally),
            (Components::Upper(c), ComponentField::PerfC) => c.perf_c = Some(tally),
            (Components::Upper(c), ComponentField::PerfD) => c.perf_d = Some(tally),
            (Components::Upper(c), ComponentField::PaperTest) => c.paper_test = Some(value),
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectGrade {
    pub name: String,
    pub raw_score: RawScore,
    pub achievement: Achievement,
    pub components: Components,
}

impl SubjectGrade {
    /// Neutral scored entry: band A, score 0, no inputs.
    pub fn blank(name: impl Into<String>, layout: ComponentLayout) -> Self {
        Self {
            name: name.into(),
            raw_score: RawScore::Scored(0.0),
            achievement: Achievement::A,
            components: Components::empty(layout),
        }
    }
}

/// The two states a semester can be in. Starts `Scored`; only an explicit
/// toggle moves between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemesterState {
    Scored,
    Free,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterData {
    pub is_free_semester: bool,
    pub subjects: Vec<SubjectGrade>,
}

impl SemesterData {
    pub fn state(&self) -> SemesterState {
        if self.is_free_semester {
            SemesterState::Free
        } else {
            SemesterState::Scored
        }
    }

    pub fn subject(&self, name: &str) -> Option<&SubjectGrade> {
        self.subjects.iter().find(|s| s.name == name)
    }
}

/// Per-grade attendance counts, one slot per grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub absences: [u32; 3],
    pub tardies: [u32; 3],
    pub early_leaves: [u32; 3],
    /// 결과: partial absences from individual classes.
    pub results: [u32; 3],
}

/// Which full-marks rule volunteer hours are scored against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolunteerTier {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "30h")]
    ThirtyHours,
    #[serde(rename = "20h")]
    TwentyHours,
    /// Accommodation: full marks regardless of hours.
    #[serde(rename = "disabled")]
    Disabled,
}

impl FromStr for VolunteerTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(VolunteerTier::None),
            "30h" => Ok(VolunteerTier::ThirtyHours),
            "20h" => Ok(VolunteerTier::TwentyHours),
            "disabled" => Ok(VolunteerTier::Disabled),
            other => Err(format!(
                "unknown volunteer tier '{}' (expected none, 30h, 20h or disabled)",
                other
            )),
        }
    }
}

impl fmt::Display for VolunteerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolunteerTier::None => "none",
            VolunteerTier::ThirtyHours => "30h",
            VolunteerTier::TwentyHours => "20h",
            VolunteerTier::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub hours: f64,
    pub tier: VolunteerTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorPoints {
    pub base: f64,
    /// 0..=2 in 0.5 steps.
    pub extra: f64,
}

impl Default for BehaviorPoints {
    fn default() -> Self {
        Self {
            base: 3.0,
            extra: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Behavior {
    pub grade1: BehaviorPoints,
    pub grade2: BehaviorPoints,
    pub grade3: BehaviorPoints,
}

impl Behavior {
    pub fn for_grade(&self, grade: GradeLevel) -> BehaviorPoints {
        match grade {
            GradeLevel::One => self.grade1,
            GradeLevel::Two => self.grade2,
            GradeLevel::Three => self.grade3,
        }
    }

    pub fn for_grade_mut(&mut self, grade: GradeLevel) -> &mut BehaviorPoints {
        match grade {
            GradeLevel::One => &mut self.grade1,
            GradeLevel::Two => &mut self.grade2,
            GradeLevel::Three => &mut self.grade3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonAcademicData {
    pub attendance: Attendance,
    pub volunteer: Volunteer,
    pub behavior: Behavior,
}

/// Everything scored for one student. Replaced wholesale on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicRecord {
    #[serde(default)]
    pub semesters: BTreeMap<SemesterKey, SemesterData>,
    #[serde(default)]
    pub non_academic: NonAcademicData,
}

impl AcademicRecord {
    pub fn semester(&self, key: &SemesterKey) -> Option<&SemesterData> {
        self.semesters.get(key)
    }

    /// Copy of the record with one semester replaced.
    pub fn with_semester(&self, key: SemesterKey, data: SemesterData) -> Self {
        let mut next = self.clone();
        next.semesters.insert(key, data);
        next
    }

    /// Copy of the record with new non-academic data.
    pub fn with_non_academic(&self, data: NonAcademicData) -> Self {
        Self {
            semesters: self.semesters.clone(),
            non_academic: data,
        }
    }
}
