mod init;

pub use init::write_default_rules;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::rules::RuleSet;

/// Get the config directory path (~/.config/naesin/)
///
/// Falls back to the working directory when no home directory is known.
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("naesin")
}

/// Get the default rules file path (~/.config/naesin/rules.yaml)
pub fn get_rules_path() -> PathBuf {
    get_config_dir().join("rules.yaml")
}

/// Load a rule set from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to a rules file. If None, uses the default path
///   (~/.config/naesin/rules.yaml), and falls back to the built-in rules when
///   that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given rules file does not exist
/// - The rules file cannot be read
/// - The YAML cannot be parsed
///
/// The returned rule set is not validated; build a [`crate::rules::RuleBook`]
/// from it to do that.
pub fn load_rules(path: Option<PathBuf>) -> Result<RuleSet> {
    let rules_path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Rules file not found at {}", path.display());
            }
            path
        }
        None => {
            let default_path = get_rules_path();
            if !default_path.exists() {
                tracing::debug!(path = %default_path.display(), "no rules file, using built-in rules");
                return Ok(RuleSet::default());
            }
            default_path
        }
    };

    let content = fs::read_to_string(&rules_path)
        .with_context(|| format!("Failed to read rules file at {}", rules_path.display()))?;

    let rules: RuleSet = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse rules: invalid YAML in {}", rules_path.display()))?;

    tracing::debug!(path = %rules_path.display(), name = %rules.name, "rules loaded");
    Ok(rules)
}
