//! `vigil rules`: list catalog rules.

use std::fmt::Write as _;
use std::path::Path;

use vigil_analysis::rules::Applicability;
use vigil_analysis::RuleCatalog;
use vigil_core::config::VigilConfig;

use super::{parse_role, CommandOutput};
use crate::error::CliError;

pub fn run(role: Option<&str>, config_root: &Path) -> Result<CommandOutput, CliError> {
    let config = VigilConfig::load(config_root, None)?;
    let catalog = RuleCatalog::from_config(&config.validation, config_root)?;
    let role = parse_role(role)?;

    let rules: Vec<_> = match role {
        Some(role) => catalog.applicable_rules(role),
        None => catalog.rules().iter().collect(),
    };

    let mut report = String::new();
    for rule in &rules {
        let roles = match rule.applicability {
            Applicability::Any => "any".to_string(),
            Applicability::Roles(ref roles) => roles
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(","),
        };
        let _ = writeln!(
            report,
            "{:<26} {:<9} {:<16} {}",
            rule.id, rule.severity.as_str(), roles, rule.label
        );
    }
    let _ = writeln!(report, "{} rule(s)", rules.len());
    Ok(CommandOutput {
        report,
        exit_code: 0,
    })
}
