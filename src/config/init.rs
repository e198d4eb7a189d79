use anyhow::{Context, Result};
use std::path::Path;

use crate::rules::RuleSet;

const HEADER: &str = "\
# Admission scoring rules.
#
# Edit subject lists, weights, achievement cutoffs and the non-academic
# point split here. Run `naesin rules check` after editing.
";

/// Write the built-in rule set to `path` as YAML.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_rules(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Rules file already exists at {}. Use --force to overwrite",
            path.display()
        );
    }

    let yaml = serde_saphyr::to_string(&RuleSet::default())
        .map_err(|e| anyhow::anyhow!("Failed to serialize rules: {}", e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    std::fs::write(path, format!("{}{}", HEADER, yaml))
        .with_context(|| format!("Failed to write rules to {}", path.display()))?;

    tracing::info!(path = %path.display(), "default rules written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_refuses_overwrite_without_force() {
        let path = env::temp_dir().join("naesin_test_init_force.yaml");
        std::fs::write(&path, "keep me").unwrap();

        assert!(write_default_rules(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");

        write_default_rules(&path, true).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Admission scoring rules."));

        let _ = std::fs::remove_file(&path);
    }
}
