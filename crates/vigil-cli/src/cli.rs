use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    about = "Vigil: rule-based compliance checks for generated code units",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate files, directories, or stdin against the rule catalog
    Validate {
        /// Files or directories to validate (`-` or nothing reads stdin)
        files: Vec<PathBuf>,

        /// Unit role: backend, frontend, service, agent, utility (inferred from the path when omitted)
        #[arg(long)]
        role: Option<String>,

        /// Unit name used for stdin input
        #[arg(long)]
        name: Option<String>,

        /// Report format: console or json
        #[arg(long)]
        format: Option<String>,

        /// Disable ANSI colors in console output
        #[arg(long)]
        no_color: bool,

        /// Minimum compliance score (0-100)
        #[arg(long)]
        min_score: Option<u32>,

        /// Directory holding vigil.toml
        #[arg(long, default_value = ".")]
        config: PathBuf,
    },

    /// List the rules applicable to a role
    Rules {
        /// Unit role (all rules when omitted)
        #[arg(long)]
        role: Option<String>,

        /// Directory holding vigil.toml
        #[arg(long, default_value = ".")]
        config: PathBuf,
    },
}
