pub mod rules;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use vigil_analysis::rules::UnitRole;
use vigil_analysis::{RuleCatalog, Validator};
use vigil_core::config::VigilConfig;

use crate::error::CliError;

/// Text for stdout plus the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub report: String,
    pub exit_code: i32,
}

pub(crate) fn parse_role(role: Option<&str>) -> Result<Option<UnitRole>, CliError> {
    role.map(|r| UnitRole::parse_str(r).ok_or_else(|| CliError::UnknownRole(r.to_string())))
        .transpose()
}

pub(crate) fn build_validator(config: &VigilConfig, root: &Path) -> Result<Validator, CliError> {
    let catalog = RuleCatalog::from_config(&config.validation, root)?;
    tracing::debug!(rules = catalog.len(), "catalog ready");
    Ok(Validator::from_config(Arc::new(catalog), &config.validation))
}
