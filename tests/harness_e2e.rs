//! End-to-end driver runs against stub compressor scripts.
//!
//! The stubs are tiny shell scripts standing in for built artifacts, so
//! these tests exercise the real subprocess path (runner, workspace,
//! driver) without invoking cargo builds.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use packcheck::driver::{HarnessConfig, Outcome, TestRecord, run_oracles};
use packcheck::suite::{ORACLES, OracleFn, Thresholds};

/// A faithful "compressor" that copies bytes in both directions. It
/// round-trips perfectly and leaves nothing behind, but never shrinks.
const COPY_SCRIPT: &str = r#"if [ "$1" = "-d" ]; then cp "$2" "$3"; else cp "$1" "$2"; fi"#;

/// Compress truncates to 10 bytes (an excellent "ratio"); decompress just
/// copies. Only useful for the ratio oracle, which never decompresses.
const SHRINK_SCRIPT: &str =
    r#"if [ "$1" = "-d" ]; then cp "$2" "$3"; else head -c 10 "$1" > "$2"; fi"#;

/// A correct copier that dawdles for 50 ms per invocation. Pitting it
/// against the plain copier keeps the timing oracles' verdicts far from the
/// 2x boundary, so scheduler noise cannot flip them.
const SLOW_COPY_SCRIPT: &str =
    r#"sleep 0.05; if [ "$1" = "-d" ]; then cp "$2" "$3"; else cp "$1" "$2"; fi"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn config(sandbox: &Path, candidate_body: &str, baseline_body: &str) -> HarnessConfig {
    let seed = sandbox.join("example.log");
    let mut log = String::new();
    for i in 0..40 {
        log.push_str(&format!(
            "2024-03-0{} 12:00:{:02} INFO request handled in {} ms\n",
            i % 9 + 1,
            i,
            i * 3
        ));
    }
    fs::write(&seed, log).unwrap();

    HarnessConfig {
        candidate: write_script(sandbox, "candidate", candidate_body),
        baseline: write_script(sandbox, "baseline", baseline_body),
        seed_file: seed,
        workspace_dir: sandbox.join("scratch"),
        thresholds: Thresholds::default(),
    }
}

fn oracle(name: &str) -> (&'static str, OracleFn) {
    ORACLES
        .iter()
        .find(|(n, _)| *n == name)
        .copied()
        .unwrap_or_else(|| panic!("no oracle named {name}"))
}

fn outcome<'a>(records: &'a [TestRecord], name: &str) -> &'a Outcome {
    &records
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no record for {name}"))
        .outcome
}

#[test]
fn faithful_copier_passes_correctness_and_hygiene() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), COPY_SCRIPT, COPY_SCRIPT);

    let records = run_oracles(
        &config,
        &[
            oracle("restores_original_after_round_trip"),
            oracle("leaves_no_temporary_files_after_compression"),
            oracle("leaves_no_temporary_files_after_round_trip"),
        ],
    );

    for record in &records {
        assert!(record.passed(), "{} failed: {:?}", record.name, record.outcome);
    }
    assert!(!config.workspace_dir.exists());
}

#[test]
fn random_binary_data_round_trips_through_the_copier() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), COPY_SCRIPT, COPY_SCRIPT);

    let records = run_oracles(&config, &[oracle("handles_random_binary_data")]);
    assert!(records[0].passed(), "{:?}", records[0].outcome);
}

#[test]
fn ratio_oracle_rejects_an_identity_copier() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), COPY_SCRIPT, COPY_SCRIPT);

    let records = run_oracles(&config, &[oracle("compresses_better_than_baseline")]);

    match outcome(&records, "compresses_better_than_baseline") {
        Outcome::Failed(message) => assert!(message.contains("percentage point")),
        Outcome::Passed => panic!("identity copier must not beat the baseline"),
    }
}

#[test]
fn ratio_oracle_accepts_a_smaller_output() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), SHRINK_SCRIPT, COPY_SCRIPT);

    let records = run_oracles(&config, &[oracle("compresses_better_than_baseline")]);
    assert!(records[0].passed(), "{:?}", records[0].outcome);
}

#[test]
fn fast_candidate_stays_within_the_compression_speed_budget() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), COPY_SCRIPT, SLOW_COPY_SCRIPT);

    let records = run_oracles(&config, &[oracle("compresses_within_time_budget")]);
    assert!(records[0].passed(), "{:?}", records[0].outcome);
}

#[test]
fn slow_candidate_breaches_the_compression_speed_budget() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), SLOW_COPY_SCRIPT, COPY_SCRIPT);

    let records = run_oracles(&config, &[oracle("compresses_within_time_budget")]);

    match outcome(&records, "compresses_within_time_budget") {
        Outcome::Failed(message) => assert!(message.contains("compression took more than")),
        Outcome::Passed => panic!("a 50 ms handicap per run must breach the 2x budget"),
    }
}

#[test]
fn decompression_timing_oracles_accept_a_fast_candidate() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), COPY_SCRIPT, SLOW_COPY_SCRIPT);

    let records = run_oracles(
        &config,
        &[
            oracle("decompresses_within_time_budget"),
            oracle("decompresses_random_data_within_time_budget"),
        ],
    );

    for record in &records {
        assert!(record.passed(), "{} failed: {:?}", record.name, record.outcome);
    }
    assert!(!config.workspace_dir.exists());
}

#[test]
fn slow_candidate_breaches_the_decompression_speed_budget() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), SLOW_COPY_SCRIPT, COPY_SCRIPT);

    let records = run_oracles(&config, &[oracle("decompresses_within_time_budget")]);

    match outcome(&records, "decompresses_within_time_budget") {
        Outcome::Failed(message) => assert!(message.contains("decompression took more than")),
        Outcome::Passed => panic!("a 50 ms handicap per run must breach the 2x budget"),
    }
}

#[test]
fn one_failing_oracle_does_not_abort_the_rest() {
    let sandbox = tempfile::tempdir().unwrap();
    let config = config(sandbox.path(), COPY_SCRIPT, COPY_SCRIPT);

    let records = run_oracles(
        &config,
        &[
            oracle("compresses_better_than_baseline"),
            oracle("restores_original_after_round_trip"),
        ],
    );

    assert!(matches!(records[0].outcome, Outcome::Failed(_)));
    assert!(records[1].passed());
    assert!(!records.iter().all(TestRecord::passed));
    assert!(!config.workspace_dir.exists());
}
