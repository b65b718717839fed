//! Test driver
//!
//! Executes an ordered oracle list, one isolated workspace per oracle. A
//! failing oracle is caught at the single call site here, reported, and
//! recorded; it never prevents later oracles from running. The aggregate
//! verdict is the sole machine-readable signal of the run.

use std::path::PathBuf;

use crate::suite::{CheckContext, OracleFn, ORACLES, Thresholds};
use crate::workspace::{INPUT_FILE, WORKSPACE_DIR, with_workspace};

/// Immutable run configuration, constructed once at startup and passed by
/// reference for the lifetime of the run.
#[derive(Debug)]
pub struct HarnessConfig {
    /// Resolved candidate artifact.
    pub candidate: PathBuf,
    /// Resolved baseline artifact.
    pub baseline: PathBuf,
    /// Seed input copied into every workspace.
    pub seed_file: PathBuf,
    /// Directory reused for every oracle's workspace, one at a time.
    pub workspace_dir: PathBuf,
    pub thresholds: Thresholds,
}

impl HarnessConfig {
    /// Configuration with the conventional seed file, workspace directory,
    /// and default tolerances.
    pub fn new(candidate: PathBuf, baseline: PathBuf) -> Self {
        Self {
            candidate,
            baseline,
            seed_file: PathBuf::from(INPUT_FILE),
            workspace_dir: PathBuf::from(WORKSPACE_DIR),
            thresholds: Thresholds::default(),
        }
    }
}

/// Verdict for one oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
}

/// One oracle's name and verdict; never mutated after creation.
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub name: &'static str,
    pub outcome: Outcome,
}

impl TestRecord {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Deepest message in an error's source chain. Wrapped errors (an oracle
/// I/O failure, for instance) report their root cause rather than the
/// outermost wrapper text.
fn deepest_message(error: &dyn std::error::Error) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

/// Run an ordered oracle list sequentially and return one record per
/// oracle, in order.
pub fn run_oracles(
    config: &HarnessConfig,
    oracles: &[(&'static str, OracleFn)],
) -> Vec<TestRecord> {
    let mut records = Vec::with_capacity(oracles.len());

    for &(name, oracle) in oracles {
        println!("{name}:");

        let result = with_workspace(&config.workspace_dir, &config.seed_file, |workspace| {
            let ctx = CheckContext {
                candidate: &config.candidate,
                baseline: &config.baseline,
                thresholds: &config.thresholds,
                workspace,
            };
            oracle(&ctx)
        });

        let outcome = match result {
            Ok(()) => {
                println!("\tPassed.");
                Outcome::Passed
            }
            Err(error) => {
                let message = deepest_message(&error);
                println!("\tFailed: {message}");
                Outcome::Failed(message)
            }
        };
        println!();

        records.push(TestRecord { name, outcome });
    }

    records
}

/// Run the full fixed suite; `true` iff every oracle passed.
pub fn run_suite(config: &HarnessConfig) -> bool {
    run_oracles(config, ORACLES).iter().all(TestRecord::passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::OracleError;
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};

    static LATER_ORACLE_RAN: AtomicBool = AtomicBool::new(false);

    fn failing(_: &CheckContext<'_>) -> Result<(), OracleError> {
        Err(OracleError::Assertion("expected failure".to_string()))
    }

    fn passing(_: &CheckContext<'_>) -> Result<(), OracleError> {
        LATER_ORACLE_RAN.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn config_in(sandbox: &Path) -> HarnessConfig {
        let seed = sandbox.join("example.log");
        fs::write(&seed, b"2024-01-01 12:00:00 INFO service ready\n").unwrap();
        HarnessConfig {
            candidate: sandbox.join("candidate-binary"),
            baseline: sandbox.join("baseline-binary"),
            seed_file: seed,
            workspace_dir: sandbox.join("scratch"),
            thresholds: Thresholds::default(),
        }
    }

    #[test]
    fn failure_does_not_stop_later_oracles() {
        let sandbox = tempfile::tempdir().unwrap();
        let config = config_in(sandbox.path());

        let records = run_oracles(&config, &[("first", failing), ("second", passing)]);

        assert!(LATER_ORACLE_RAN.load(Ordering::SeqCst));
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].outcome,
            Outcome::Failed("expected failure".to_string())
        );
        assert!(records[1].passed());
        assert!(!records.iter().all(TestRecord::passed));
        assert!(!config.workspace_dir.exists());
    }

    #[test]
    fn records_keep_suite_order() {
        let sandbox = tempfile::tempdir().unwrap();
        let config = config_in(sandbox.path());

        let records = run_oracles(&config, &[("alpha", passing), ("beta", passing)]);

        let names: Vec<&str> = records.iter().map(|r| r.name).collect();
        assert_eq!(names, ["alpha", "beta"]);
        assert!(records.iter().all(TestRecord::passed));
    }

    #[test]
    fn deepest_message_prefers_the_root_cause() {
        let wrapped = OracleError::Io(io::Error::other("root cause"));
        assert_eq!(deepest_message(&wrapped), "root cause");

        let bare = OracleError::Assertion("outer message".to_string());
        assert_eq!(deepest_message(&bare), "outer message");
    }
}
