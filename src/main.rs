use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use naesin::record::{
    apply_edit, load_record_file, recompute, save_record_file, AttendanceKind, BehaviorEdit, Components, RecordEdit,
    RecordFile, SemesterKey, VolunteerTier,
};
use naesin::rules::{ComponentField, GradeLevel, RuleBook, SemesterHalf};
use naesin::scoring::{classify_subject, score_subject_detailed, total_score, validate_component};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 1;
const EXIT_CONFIG: i32 = 4;

fn parse_grade(s: &str) -> Result<GradeLevel, String> {
    let n: u8 = s.trim().parse().map_err(|_| format!("invalid grade '{}'", s))?;
    GradeLevel::try_from(n)
}

fn parse_half(s: &str) -> Result<SemesterHalf, String> {
    let n: u8 = s.trim().parse().map_err(|_| format!("invalid semester half '{}'", s))?;
    SemesterHalf::try_from(n)
}

fn parse_field(s: &str) -> Result<ComponentField, String> {
    ComponentField::parse(s).ok_or_else(|| {
        format!(
            "unknown field '{}' (expected midterm, final, performance, perfA..perfD or paperTest)",
            s
        )
    })
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Write the built-in rules to the rules file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the rules file and report every problem
    Check,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the composite score breakdown (default if no subcommand)
    Total,
    /// Show one semester's subjects, e.g. `show 2-1`
    Show { semester: SemesterKey },
    /// Set one component of a subject, e.g. `set 1-1 국어 midterm 90`
    Set {
        semester: SemesterKey,
        subject: String,
        #[arg(value_parser = parse_field)]
        field: ComponentField,
        value: f64,
    },
    /// Turn a semester's free-semester status on or off
    Free {
        semester: SemesterKey,
        #[arg(value_enum)]
        state: Switch,
    },
    /// Record an attendance count for a grade
    Attendance {
        /// absences, tardies, early-leaves or results
        kind: AttendanceKind,
        #[arg(value_parser = parse_grade)]
        grade: GradeLevel,
        count: u32,
    },
    /// Update volunteer hours and/or the volunteer option
    Volunteer {
        #[arg(long)]
        hours: Option<f64>,
        /// none, 30h, 20h or disabled
        #[arg(long)]
        tier: Option<VolunteerTier>,
    },
    /// Update a grade's behavior points
    Behavior {
        #[arg(value_parser = parse_grade)]
        grade: GradeLevel,
        #[arg(long)]
        base: Option<f64>,
        #[arg(long)]
        extra: Option<f64>,
    },
    /// Score a single subject without touching the record
    Subject {
        #[arg(long, value_parser = parse_grade)]
        grade: GradeLevel,
        #[arg(long, value_parser = parse_half)]
        half: SemesterHalf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        midterm: Option<f64>,
        #[arg(long = "final")]
        final_exam: Option<f64>,
        #[arg(long)]
        performance: Option<f64>,
        #[arg(long)]
        perf_a: Option<f64>,
        #[arg(long)]
        perf_b: Option<f64>,
        #[arg(long)]
        perf_c: Option<f64>,
        #[arg(long)]
        perf_d: Option<f64>,
        #[arg(long)]
        paper_test: Option<f64>,
    },
    /// Manage the rules file
    Rules {
        #[command(subcommand)]
        action: RulesCommand,
    },
}

#[derive(Parser, Debug)]
#[command(name = "naesin")]
#[command(about = "Middle-school transcript scoring for high-school admission", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to rules file (defaults to ~/.config/naesin/rules.yaml, built-in rules if absent)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Path to record file (defaults to ~/.config/naesin/record.json)
    #[arg(long, global = true)]
    record: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = naesin::telemetry::init(cli.verbose) {
        eprintln!("Logging disabled: {}", e);
    }

    let command = cli.command.unwrap_or(Commands::Total);

    if let Commands::Rules {
        action: RulesCommand::Init { force },
    } = &command
    {
        let path = cli.rules.clone().unwrap_or_else(naesin::config::get_rules_path);
        if let Err(e) = naesin::config::write_default_rules(&path, *force) {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Rules written to {}", path.display());
        std::process::exit(EXIT_SUCCESS);
    }

    let rules = match naesin::config::load_rules(cli.rules.clone()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let book = match RuleBook::new(rules) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Rules error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Commands::Rules {
        action: RulesCommand::Check,
    } = &command
    {
        println!("Rules OK: {}", book.rules().name);
        std::process::exit(EXIT_SUCCESS);
    }

    let use_colors = naesin::output::should_use_colors();

    // Ad-hoc scoring needs no record
    if let Commands::Subject {
        grade,
        half,
        name,
        midterm,
        final_exam,
        performance,
        perf_a,
        perf_b,
        perf_c,
        perf_d,
        paper_test,
    } = &command
    {
        let given = [
            (ComponentField::Midterm, *midterm),
            (ComponentField::Final, *final_exam),
            (ComponentField::Performance, *performance),
            (ComponentField::PerfA, *perf_a),
            (ComponentField::PerfB, *perf_b),
            (ComponentField::PerfC, *perf_c),
            (ComponentField::PerfD, *perf_d),
            (ComponentField::PaperTest, *paper_test),
        ];
        let mut components = Components::empty(grade.layout());
        for (field, value) in given {
            let Some(value) = value else { continue };
            if let Err(e) = validate_component(&book, *grade, *half, name, field, value) {
                eprintln!("Input error: {}", e);
                std::process::exit(EXIT_INPUT);
            }
            components.set(field, value);
        }

        let detail = score_subject_detailed(&book, &components, *grade, *half, name)
            .and_then(|score| classify_subject(&book, *grade, name, score.raw_score).map(|a| (score, a)));
        match detail {
            Ok((score, achievement)) => {
                println!(
                    "{}",
                    naesin::output::format_subject_detail(name, &score, achievement, use_colors)
                );
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Input error: {}", e);
                std::process::exit(EXIT_INPUT);
            }
        }
    }

    let record_path = cli.record.clone().unwrap_or_else(naesin::record::storage::get_record_path);
    let stored = match load_record_file(&record_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Record error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };
    let record = match recompute(&book, &stored.record) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Record error in {}: {}", record_path.display(), e);
            std::process::exit(EXIT_INPUT);
        }
    };

    if cli.verbose {
        eprintln!(
            "Loaded record for '{}' ({} semesters) from {}",
            stored.owner,
            record.semesters.len(),
            record_path.display()
        );
    }

    let edit = match command {
        Commands::Total => None,
        Commands::Show { semester } => {
            println!(
                "{}",
                naesin::output::format_semester(semester, record.semester(&semester), use_colors)
            );
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Set {
            semester,
            subject,
            field,
            value,
        } => Some(vec![RecordEdit::Component {
            semester,
            subject,
            field,
            value,
        }]),
        Commands::Free { semester, state } => Some(vec![RecordEdit::FreeSemester {
            semester,
            enabled: matches!(state, Switch::On),
        }]),
        Commands::Attendance { kind, grade, count } => Some(vec![RecordEdit::Attendance { kind, grade, count }]),
        Commands::Volunteer { hours, tier } => {
            let mut edits = Vec::new();
            if let Some(hours) = hours {
                edits.push(RecordEdit::VolunteerHours(hours));
            }
            if let Some(tier) = tier {
                edits.push(RecordEdit::VolunteerTier(tier));
            }
            Some(edits)
        }
        Commands::Behavior { grade, base, extra } => Some(vec![RecordEdit::Behavior {
            grade,
            edit: BehaviorEdit { base, extra },
        }]),
        Commands::Subject { .. } | Commands::Rules { .. } => None,
    };

    let record = match edit {
        None => record,
        Some(edits) => {
            let mut next = record;
            for edit in &edits {
                next = match apply_edit(&book, &next, edit) {
                    Ok(r) => r,
                    Err(e) => {
                        eprintln!("Input error: {}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                };
            }
            let updated = RecordFile {
                record: next.clone(),
                ..stored
            };
            if let Err(e) = save_record_file(&record_path, &updated) {
                eprintln!("Record error: {:#}", e);
                std::process::exit(EXIT_INPUT);
            }
            if cli.verbose {
                eprintln!("Saved {} edit(s) to {}", edits.len(), record_path.display());
            }
            next
        }
    };

    let total = total_score(&book, &record);
    println!(
        "{}",
        naesin::output::format_total(
            &total,
            book.academic().ceiling,
            book.non_academic().ceiling(),
            use_colors
        )
    );

    std::process::exit(EXIT_SUCCESS);
}
