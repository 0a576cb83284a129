//! `vigil validate`: standalone validation with a report and an exit code.

use std::io::Read;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use vigil_analysis::reporters::create_reporter;
use vigil_analysis::rules::{UnitIdentity, UnitRole};
use vigil_analysis::ValidationResult;
use vigil_core::config::{CliOverrides, VigilConfig};

use super::{build_validator, parse_role, CommandOutput};
use crate::error::CliError;

/// Extensions picked up when walking a directory.
const SOURCE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "rs", "go", "java", "kt", "rb", "php", "cs",
];

#[derive(Debug, Clone, Default)]
pub struct ValidateArgs {
    pub files: Vec<PathBuf>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub format: Option<String>,
    pub no_color: bool,
    pub min_score: Option<u32>,
    pub config: PathBuf,
}

pub fn run(args: ValidateArgs, stdin: &mut dyn Read) -> Result<CommandOutput, CliError> {
    let overrides = CliOverrides {
        min_score: args.min_score,
        format: args.format.clone(),
        color: args.no_color.then_some(false),
        ..Default::default()
    };
    let config = VigilConfig::load(&args.config, Some(&overrides))?;
    let role = parse_role(args.role.as_deref())?;
    let validator = build_validator(&config, &args.config)?;

    let reads_stdin = args.files.is_empty() || args.files.iter().all(|f| f.as_os_str() == "-");
    let results: Vec<ValidationResult> = if reads_stdin {
        let mut bytes = Vec::new();
        stdin.read_to_end(&mut bytes).map_err(|source| CliError::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
        let name = args.name.clone().unwrap_or_else(|| "<stdin>".to_string());
        let role = role.unwrap_or_else(|| UnitRole::infer_from_path(&name));
        vec![validator.validate_bytes(&bytes, &UnitIdentity::new(name, role))]
    } else {
        let files = collect_files(&args.files);
        tracing::info!(files = files.len(), "validating");
        files
            .par_iter()
            .map(|path| {
                let bytes = std::fs::read(path).map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;
                let name = path.display().to_string();
                let role = role.unwrap_or_else(|| UnitRole::infer_from_path(&name));
                Ok(validator.validate_bytes(&bytes, &UnitIdentity::new(name, role)))
            })
            .collect::<Result<Vec<_>, CliError>>()?
    };

    let reporter = create_reporter(config.report.effective_format(), config.report.effective_color())?;
    let report = reporter.render_results(&results)?;
    let exit_code = if results.iter().all(|r| r.compliant) { 0 } else { 1 };
    Ok(CommandOutput { report, exit_code })
}

/// Expand directories into their source files, honoring ignore files.
/// Explicit file arguments are kept as given.
fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs.iter().filter(|p| p.as_os_str() != "-") {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkBuilder::new(input)
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| is_source_file(path))
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e))
}
