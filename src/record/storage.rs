use super::AcademicRecord;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

pub const RECORD_FILE_VERSION: u32 = 1;

/// On-disk wrapper around a student's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFile {
    pub version: u32,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub record: AcademicRecord,
}

impl Default for RecordFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFile {
    pub fn new() -> Self {
        Self {
            version: RECORD_FILE_VERSION,
            owner: String::new(),
            record: AcademicRecord::default(),
        }
    }
}

/// Get the default record file path (~/.config/naesin/record.json)
pub fn get_record_path() -> PathBuf {
    crate::config::get_config_dir().join("record.json")
}

/// Load a record file from JSON
///
/// If the file doesn't exist, returns an empty record.
/// If the file exists but has an unsupported version, returns an error.
/// Derived scores are taken as written; run [`super::recompute`] before
/// trusting them.
pub fn load_record_file(path: &Path) -> Result<RecordFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no record file, starting empty");
        return Ok(RecordFile::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open record file at {}", path.display()))?;

    let stored: RecordFile = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse record file at {}", path.display()))?;

    if stored.version != RECORD_FILE_VERSION {
        anyhow::bail!("Unsupported record file version: {}", stored.version);
    }

    Ok(stored)
}

/// Save a record file atomically, creating the parent directory if needed.
pub fn save_record_file(path: &Path, stored: &RecordFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, stored).context("Failed to serialize record")?;

    file.commit().context("Failed to save record")?;

    tracing::info!(path = %path.display(), "record saved");
    Ok(())
}
