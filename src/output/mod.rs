pub mod formatter;

pub use formatter::{format_raw_score, format_semester, format_subject_detail, format_total, should_use_colors};
