//! Vigil CLI: the `vigil` command.
//!
//! Exit codes: 0 every unit compliant, 1 a unit is not, 2 usage/config/IO error.

use std::process::ExitCode;

use clap::Parser;
use vigil_cli::cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(2) } else { ExitCode::SUCCESS };
        }
    };
    vigil_core::tracing::init_tracing();

    match vigil_cli::run(cli, &mut std::io::stdin().lock()) {
        Ok(output) => {
            print!("{}", output.report);
            ExitCode::from(output.exit_code as u8)
        }
        Err(e) => {
            tracing::error!(error = %e, "vigil failed");
            eprintln!("{}", e.coded_string());
            ExitCode::from(2)
        }
    }
}
