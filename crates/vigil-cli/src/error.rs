//! CLI errors. Every variant maps to exit code 2.

use std::path::PathBuf;

use vigil_core::errors::{CatalogError, ConfigError, ReportError, VigilErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

impl CliError {
    /// `[CODE] message`, using the subsystem's code where there is one.
    pub fn coded_string(&self) -> String {
        match self {
            Self::Config(e) => e.coded_string(),
            Self::Catalog(e) => e.coded_string(),
            Self::Report(e) => e.coded_string(),
            Self::Io { .. } | Self::UnknownRole(_) => format!("[CLI_ERROR] {self}"),
        }
    }
}
