//! Top-level Vigil configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{RefinementConfig, ReportConfig, ValidationConfig};
use crate::errors::ConfigError;

/// Name of the project-level config file.
pub const PROJECT_CONFIG_FILE: &str = "vigil.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`VIGIL_*`)
/// 3. Project config (`vigil.toml` in project root)
/// 4. User config (`~/.vigil/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VigilConfig {
    pub validation: ValidationConfig,
    pub refinement: RefinementConfig,
    pub report: ReportConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub min_score: Option<u32>,
    pub format: Option<String>,
    pub color: Option<bool>,
}

impl VigilConfig {
    /// Load configuration for the project rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config. Only a parse error is fatal.
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(err @ ConfigError::ParseError { .. }) => return Err(err),
                    Err(err) => {
                        ::tracing::warn!(path = %user_config_path.display(), error = %err, "ignoring user config");
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &VigilConfig) -> Result<(), ConfigError> {
        if let Some(score) = config.validation.min_score {
            if score > 100 {
                return Err(ConfigError::ValidationFailed {
                    field: "validation.min_score".to_string(),
                    message: "must be between 0 and 100".to_string(),
                });
            }
        }
        if config.validation.context_window == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "validation.context_window".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.refinement.attempt_budget == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "refinement.attempt_budget".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(format) = config.report.format.as_deref() {
            if !matches!(format, "console" | "json") {
                return Err(ConfigError::InvalidValue {
                    field: "report.format".to_string(),
                    message: format!("unknown format '{format}', expected console or json"),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.vigil/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".vigil").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut VigilConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: VigilConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins wherever it sets a value.
    fn merge(base: &mut VigilConfig, other: &VigilConfig) {
        // Validation
        if other.validation.min_score.is_some() {
            base.validation.min_score = other.validation.min_score;
        }
        if !other.validation.disabled_rules.is_empty() {
            base.validation.disabled_rules = other.validation.disabled_rules.clone();
        }
        if !other.validation.ownership_fields.is_empty() {
            base.validation.ownership_fields = other.validation.ownership_fields.clone();
        }
        if !other.validation.architecture_triad.is_empty() {
            base.validation.architecture_triad = other.validation.architecture_triad.clone();
        }
        if other.validation.context_window.is_some() {
            base.validation.context_window = other.validation.context_window;
        }
        if other.validation.rules_file.is_some() {
            base.validation.rules_file = other.validation.rules_file.clone();
        }

        // Refinement
        if other.refinement.attempt_budget.is_some() {
            base.refinement.attempt_budget = other.refinement.attempt_budget;
        }
        if other.refinement.excerpt_chars.is_some() {
            base.refinement.excerpt_chars = other.refinement.excerpt_chars;
        }
        if other.refinement.deadline_secs.is_some() {
            base.refinement.deadline_secs = other.refinement.deadline_secs;
        }
        if other.refinement.system_context.is_some() {
            base.refinement.system_context = other.refinement.system_context.clone();
        }

        // Report
        if other.report.format.is_some() {
            base.report.format = other.report.format.clone();
        }
        if other.report.color.is_some() {
            base.report.color = other.report.color;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `VIGIL_MIN_SCORE`, `VIGIL_ATTEMPT_BUDGET`, etc.
    fn apply_env_overrides(config: &mut VigilConfig) {
        if let Some(v) = env_parse::<u32>("VIGIL_MIN_SCORE") {
            config.validation.min_score = Some(v);
        }
        if let Ok(val) = std::env::var("VIGIL_DISABLED_RULES") {
            config.validation.disabled_rules = split_list(&val);
        }
        if let Ok(val) = std::env::var("VIGIL_OWNERSHIP_FIELDS") {
            config.validation.ownership_fields = split_list(&val);
        }
        if let Some(v) = env_parse::<usize>("VIGIL_CONTEXT_WINDOW") {
            config.validation.context_window = Some(v);
        }
        if let Some(v) = env_parse::<u32>("VIGIL_ATTEMPT_BUDGET") {
            config.refinement.attempt_budget = Some(v);
        }
        if let Some(v) = env_parse::<usize>("VIGIL_EXCERPT_CHARS") {
            config.refinement.excerpt_chars = Some(v);
        }
        if let Some(v) = env_parse::<u64>("VIGIL_DEADLINE_SECS") {
            config.refinement.deadline_secs = Some(v);
        }
        if let Ok(val) = std::env::var("VIGIL_REPORT_FORMAT") {
            config.report.format = Some(val);
        }
        if let Some(v) = env_parse::<bool>("VIGIL_REPORT_COLOR") {
            config.report.color = Some(v);
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut VigilConfig, cli: &CliOverrides) {
        if let Some(v) = cli.min_score {
            config.validation.min_score = Some(v);
        }
        if let Some(ref v) = cli.format {
            config.report.format = Some(v.clone());
        }
        if let Some(v) = cli.color {
            config.report.color = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let val = std::env::var(key).ok()?;
    match val.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            ::tracing::warn!(key, value = %val, "ignoring unparseable environment override");
            None
        }
    }
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
