use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::record::{RawScore, SemesterData, SemesterKey, SemesterState, SubjectGrade};
use crate::rules::Achievement;
use crate::scoring::{SemesterContribution, SubjectScore, TotalScore};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Whether `c` renders two columns wide: Hangul, CJK and full-width forms.
fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA960..=0xA97F
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
    )
}

/// Terminal columns taken by `s`.
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

/// Left-align `s` in a column `width` cells wide.
fn pad(s: &str, width: usize) -> String {
    let used = display_width(s);
    format!("{}{}", s, " ".repeat(width.saturating_sub(used)))
}

/// Raw score with one decimal, or `-` while not applicable.
pub fn format_raw_score(score: RawScore) -> String {
    match score {
        RawScore::Scored(v) => format!("{:.1}", v),
        RawScore::NotApplicable => "-".to_string(),
    }
}

fn format_achievement(achievement: Achievement, use_colors: bool) -> String {
    let letter = achievement.to_string();
    if !use_colors {
        return letter;
    }
    match achievement {
        Achievement::A => letter.green().bold().to_string(),
        Achievement::B => letter.cyan().to_string(),
        Achievement::C => letter.yellow().to_string(),
        Achievement::D | Achievement::E => letter.red().to_string(),
        Achievement::P => letter.dimmed().to_string(),
    }
}

fn format_subject_line(subject: &SubjectGrade, use_colors: bool) -> String {
    format!(
        "  {}{:>6}  {}",
        pad(&subject.name, 12),
        format_raw_score(subject.raw_score),
        format_achievement(subject.achievement, use_colors)
    )
}

/// One semester as a table: heading, then one line per subject with its raw
/// score and achievement band.
pub fn format_semester(key: SemesterKey, semester: Option<&SemesterData>, use_colors: bool) -> String {
    let mut heading = key.to_string();
    if semester.map(|s| s.state()) == Some(SemesterState::Free) {
        heading.push_str(" (자유학기)");
    }
    let heading = if use_colors {
        heading.bold().to_string()
    } else {
        heading
    };

    match semester {
        None => format!("{}\n  (no scores entered)", heading),
        Some(semester) => {
            let mut lines = vec![heading];
            lines.extend(semester.subjects.iter().map(|s| format_subject_line(s, use_colors)));
            lines.join("\n")
        }
    }
}

fn format_contribution(contribution: &SemesterContribution) -> String {
    let detail = match (contribution.state, contribution.average) {
        (Some(SemesterState::Free), _) => "free semester".to_string(),
        (_, Some(average)) => format!("avg {:.1}", average),
        (_, None) => "not entered".to_string(),
    };
    format!(
        "  {}{:>6.2} / {:>5.2}  {}",
        pad(&contribution.key.to_string(), 14),
        contribution.points,
        contribution.share,
        detail
    )
}

/// Full breakdown of a composite score.
pub fn format_total(total: &TotalScore, academic_ceiling: f64, non_academic_ceiling: f64, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let section = |title: &str| {
        if use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    };

    lines.push(section("교과 (academic)"));
    lines.extend(total.semesters.iter().map(format_contribution));
    lines.push(format!("  {}{:>6.2} / {:.0}", pad("소계", 14), total.academic, academic_ceiling));
    lines.push(String::new());

    let non_academic = &total.non_academic;
    lines.push(section("비교과 (non-academic)"));
    let by_grade = non_academic
        .attendance_by_grade
        .iter()
        .map(|v| format!("{:.1}", v))
        .collect::<Vec<_>>()
        .join(" + ");
    lines.push(format!("  {}{:>6.2}  ({})", pad("출결", 14), non_academic.attendance, by_grade));
    lines.push(format!("  {}{:>6.2}", pad("봉사", 14), non_academic.volunteer));
    lines.push(format!("  {}{:>6.2}", pad("행동발달", 14), non_academic.behavior));
    lines.push(format!(
        "  {}{:>6.2} / {:.0}",
        pad("소계", 14),
        non_academic.total,
        non_academic_ceiling
    ));
    lines.push(String::new());

    let total_line = format!(
        "{}{:>8.2} / {:.0}",
        pad("총점", 16),
        total.total,
        academic_ceiling + non_academic_ceiling
    );
    lines.push(if use_colors {
        total_line.bold().green().to_string()
    } else {
        total_line
    });

    lines.join("\n")
}

/// Per-term breakdown of one subject's raw score.
pub fn format_subject_detail(
    name: &str,
    score: &SubjectScore,
    achievement: Achievement,
    use_colors: bool,
) -> String {
    let mut lines = vec![format!(
        "{}  {:.1}  {}",
        if use_colors {
            name.bold().to_string()
        } else {
            name.to_string()
        },
        score.raw_score,
        format_achievement(achievement, use_colors)
    )];

    for term in &score.terms {
        let input = term
            .input
            .map(|v| format!("{}", v))
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "  {:<12}{:>7}  x {:<5}  = {:.2}",
            term.field.name(),
            input,
            term.weight,
            term.points
        ));
    }

    lines.join("\n")
}
