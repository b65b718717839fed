//! CLI module for the packcheck harness
//!
//! ## Usage
//!
//! - `packcheck [PROJECT_DIR]` - run all oracles against the candidate
//!   project (default: `candidate`)
//! - `--baseline <DIR>` - override the baseline compressor project
//!   (default: `reference-gzip`)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros. The command
//! function returns `CliResult<ExitCode>` instead of calling
//! `process::exit`; only the top-level `run()` handles errors and exits.
//! The process exit status is the sole machine-readable signal of the run:
//! `0` if every oracle passed, `1` otherwise.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use crate::builder::build_artifact;
use crate::driver::{HarnessConfig, run_suite};
use crate::workspace::INPUT_FILE;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Self-check harness for log compressor implementations
#[derive(Parser, Debug)]
#[command(name = "packcheck")]
#[command(version = VERSION)]
#[command(
    about = "Self-check harness for log compressor implementations",
    long_about = None
)]
pub struct Cli {
    /// Path to the candidate compressor project
    #[arg(value_name = "PROJECT_DIR", default_value = "candidate")]
    pub candidate: PathBuf,

    /// Path to the baseline compressor project
    #[arg(long, value_name = "DIR", default_value = "reference-gzip")]
    pub baseline: PathBuf,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. The command
/// implementation returns `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Resolve both artifacts and execute the oracle suite.
///
/// Builder failures and a missing seed file are fatal: they surface here
/// before any oracle runs. Per-oracle failures are handled inside the
/// driver and only affect the aggregate exit code.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    if !Path::new(INPUT_FILE).is_file() {
        return Err(CliError::failure(format!(
            "seed file '{INPUT_FILE}' not found in the working directory"
        )));
    }

    println!("Running self checks on project '{}'..", cli.candidate.display());

    let candidate = build_artifact(&cli.candidate).map_err(|e| CliError::failure(e.to_string()))?;
    let baseline = build_artifact(&cli.baseline).map_err(|e| CliError::failure(e.to_string()))?;

    let config = HarnessConfig::new(candidate, baseline);
    if run_suite(&config) {
        Ok(ExitCode::SUCCESS)
    } else {
        // Per-oracle failures were already reported by the driver
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_defaults_to_the_conventional_sibling_path() {
        let cli = Cli::parse_from(["packcheck"]);
        assert_eq!(cli.candidate, PathBuf::from("candidate"));
        assert_eq!(cli.baseline, PathBuf::from("reference-gzip"));
    }

    #[test]
    fn positional_argument_overrides_the_candidate_project() {
        let cli = Cli::parse_from(["packcheck", "../my-packer", "--baseline", "../gzip"]);
        assert_eq!(cli.candidate, PathBuf::from("../my-packer"));
        assert_eq!(cli.baseline, PathBuf::from("../gzip"));
    }
}
