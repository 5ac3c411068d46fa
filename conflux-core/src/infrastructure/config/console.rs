// conflux-core/src/infrastructure/config/console.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::policy::{ModePolicy, SystemAliases};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::read_yaml;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConsoleConfig {
    #[validate(length(min = 1, message = "Console name cannot be empty"))]
    pub name: String,

    /// Metadata catalog YAML, relative to the project directory.
    #[serde(default = "default_catalog")]
    #[validate(length(min = 1, message = "Catalog path cannot be empty"))]
    pub catalog: String,

    /// Record store YAML, relative to the project directory.
    #[serde(default = "default_store")]
    #[validate(length(min = 1, message = "Store path cannot be empty"))]
    pub store: String,

    /// Extra System Alias entries: system label -> connection types.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Case-insensitive patterns classifying a column type as date-like.
    #[serde(default = "default_date_types")]
    #[validate(custom(function = "validate_patterns"))]
    pub date_types: Vec<String>,
}

fn default_catalog() -> String {
    "catalog.yaml".to_string()
}
fn default_store() -> String {
    "records.yaml".to_string()
}
fn default_date_types() -> Vec<String> {
    vec![
        "^date$".to_string(),
        "^datetime".to_string(),
        "^timestamp".to_string(),
    ]
}

fn validate_patterns(patterns: &[String]) -> Result<(), validator::ValidationError> {
    for p in patterns {
        if Regex::new(p).is_err() {
            let mut err = validator::ValidationError::new("invalid_regex");
            err.message = Some(format!("'{}' is not a valid regular expression", p).into());
            return Err(err);
        }
    }
    Ok(())
}

impl ConsoleConfig {
    /// Built-in aliases plus the ones declared in the config.
    pub fn mode_policy(&self) -> ModePolicy {
        let mut aliases = SystemAliases::default();
        for (system, types) in &self.aliases {
            aliases.insert(system, types);
        }
        ModePolicy::new(aliases)
    }

    pub fn catalog_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.catalog)
    }

    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.store)
    }
}

#[instrument(skip(project_dir))]
pub fn load_console_config(project_dir: &Path) -> Result<ConsoleConfig, InfrastructureError> {
    // 1. Découverte du fichier principal
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading console configuration");

    // 2. Chargement YAML
    let mut config: ConsoleConfig = read_yaml(&config_path)?;

    // 3. Override via Variables d'Environnement
    apply_env_overrides(&mut config);

    // 4. Validation
    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["conflux.yaml", "conflux.yml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

fn apply_env_overrides(config: &mut ConsoleConfig) {
    if let Ok(val) = std::env::var("CONFLUX_CATALOG") {
        info!(old = ?config.catalog, new = ?val, "Overriding catalog path via ENV");
        config.catalog = val;
    }
    if let Ok(val) = std::env::var("CONFLUX_STORE") {
        info!(old = ?config.store, new = ?val, "Overriding store path via ENV");
        config.store = val;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_applies_defaults_and_aliases() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("conflux.yml"),
            "name: ops_console\naliases:\n  Snowflake: [SNOW]\n",
        )?;

        let config = load_console_config(dir.path())?;
        assert_eq!(config.name, "ops_console");
        assert_eq!(config.date_types.len(), 3);

        let policy = config.mode_policy();
        assert!(policy.aliases().matches("Snowflake", "snow"));
        assert!(policy.aliases().matches("BigQuery", "GCP"));
        Ok(())
    }

    #[test]
    fn test_missing_config_is_reported() {
        let dir = tempdir().unwrap();
        let err = load_console_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
    }

    #[test]
    fn test_invalid_date_pattern_fails_validation() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("conflux.yaml"),
            "name: ops\ndate_types: ['(unclosed']\n",
        )?;
        let err = load_console_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigError(_)));
        Ok(())
    }
}
