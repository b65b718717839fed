//! The oracle suite
//!
//! Nine named checks with deterministic pass/fail conditions, expressed as
//! plain function pointers in a fixed, ordered list, so there is no runtime
//! name-based dispatch. Each oracle runs inside its own workspace and uses
//! the process runner against the canonical workspace paths.
//!
//! Timing methodology: raw mean of 20 sequential repetitions per measured
//! side, no warm-up discard, no outlier trimming. Changing this would move
//! the pass/fail thresholds, so it is preserved as-is.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::RngCore;
use thiserror::Error;

use crate::runner::run_binary;
use crate::workspace::Workspace;

/// Sequential repetitions per measured side of a timing oracle.
pub const TIMING_ITERATIONS: u32 = 20;

/// Length of the random payload used by the binary-data oracle variants.
pub const RANDOM_INPUT_LEN: usize = 1024 * 1024;

/// Numeric tolerances governing oracle pass/fail boundaries.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// The candidate's compressed percentage of the original must be at
    /// least this many points below the baseline's.
    pub ratio_margin_pct: f64,
    /// Candidate mean duration must be at most this multiple of the
    /// baseline's mean duration.
    pub speed_multiplier: u32,
    /// Files allowed in the workspace after one compress invocation
    /// (input + output).
    pub max_files_after_compress: usize,
    /// Files allowed after compress + decompress (input + compressed +
    /// decompressed).
    pub max_files_after_round_trip: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            ratio_margin_pct: 1.0,
            speed_multiplier: 2,
            max_files_after_compress: 2,
            max_files_after_round_trip: 3,
        }
    }
}

/// Per-oracle failure.
///
/// Assertion failures carry the user-facing message directly; I/O and
/// subprocess errors are wrapped with their cause attached as the error
/// source. The driver reports the deepest message in the source chain.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("{0}")]
    Assertion(String),

    #[error("i/o failure while executing the check")]
    Io(#[from] io::Error),
}

impl OracleError {
    fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }
}

/// Which artifact an invocation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Candidate,
    Baseline,
}

/// Everything an oracle body needs: the two resolved artifact paths, the
/// live workspace, and the tolerance thresholds. Artifact paths and
/// thresholds are read-only for the whole run.
pub struct CheckContext<'a> {
    pub candidate: &'a Path,
    pub baseline: &'a Path,
    pub thresholds: &'a Thresholds,
    pub workspace: &'a Workspace,
}

impl CheckContext<'_> {
    fn binary(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::Candidate => self.candidate,
            Artifact::Baseline => self.baseline,
        }
    }

    /// `<binary> <input> <output>`
    fn compress_to(&self, artifact: Artifact, output: &Path) -> Result<(), OracleError> {
        let input = self.workspace.input_path();
        run_binary(self.binary(artifact), &[input.as_os_str(), output.as_os_str()])?;
        Ok(())
    }

    fn compress(&self, artifact: Artifact) -> Result<(), OracleError> {
        self.compress_to(artifact, &self.workspace.compressed_path())
    }

    /// `<binary> -d <input> <output>`
    fn decompress_from(&self, artifact: Artifact, input: &Path) -> Result<(), OracleError> {
        let output = self.workspace.decompressed_path();
        run_binary(
            self.binary(artifact),
            &[OsStr::new("-d"), input.as_os_str(), output.as_os_str()],
        )?;
        Ok(())
    }

    fn decompress(&self, artifact: Artifact) -> Result<(), OracleError> {
        self.decompress_from(artifact, &self.workspace.compressed_path())
    }

    /// Overwrite the workspace input with uniformly random bytes.
    fn randomize_input(&self, len: usize) -> Result<(), OracleError> {
        let mut bytes = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut bytes);
        fs::write(self.workspace.input_path(), bytes)?;
        Ok(())
    }
}

/// Mean wall-clock duration of [`TIMING_ITERATIONS`] sequential runs of
/// `action`. The whole loop is timed and divided, matching one stopwatch
/// around all repetitions.
fn time_mean(
    mut action: impl FnMut() -> Result<(), OracleError>,
) -> Result<Duration, OracleError> {
    let started = Instant::now();
    for _ in 0..TIMING_ITERATIONS {
        action()?;
    }
    Ok(started.elapsed() / TIMING_ITERATIONS)
}

/// Compressed size as a percentage of the original size.
fn percent_of(len: u64, original: u64) -> f64 {
    len as f64 * 100.0 / original as f64
}

fn file_len(path: &Path) -> Result<u64, OracleError> {
    Ok(fs::metadata(path)?.len())
}

fn within_speed_budget(candidate: Duration, baseline: Duration, multiplier: u32) -> bool {
    candidate <= baseline * multiplier
}

/// An oracle body: runs checks against the context, `Err` means failed.
pub type OracleFn = fn(&CheckContext<'_>) -> Result<(), OracleError>;

/// The fixed, ordered oracle suite executed by the driver.
pub const ORACLES: &[(&str, OracleFn)] = &[
    (
        "restores_original_after_round_trip",
        restores_original_after_round_trip,
    ),
    ("handles_random_binary_data", handles_random_binary_data),
    (
        "compresses_better_than_baseline",
        compresses_better_than_baseline,
    ),
    ("compresses_within_time_budget", compresses_within_time_budget),
    (
        "compresses_random_data_within_time_budget",
        compresses_random_data_within_time_budget,
    ),
    (
        "decompresses_within_time_budget",
        decompresses_within_time_budget,
    ),
    (
        "decompresses_random_data_within_time_budget",
        decompresses_random_data_within_time_budget,
    ),
    (
        "leaves_no_temporary_files_after_compression",
        leaves_no_temporary_files_after_compression,
    ),
    (
        "leaves_no_temporary_files_after_round_trip",
        leaves_no_temporary_files_after_round_trip,
    ),
];

fn restores_original_after_round_trip(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    ctx.compress(Artifact::Candidate)?;
    ctx.decompress(Artifact::Candidate)?;

    let original = fs::read(ctx.workspace.input_path())?;
    let restored = fs::read(ctx.workspace.decompressed_path())?;
    if original != restored {
        return Err(OracleError::assertion(
            "file was corrupted after decompression",
        ));
    }
    Ok(())
}

fn handles_random_binary_data(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    ctx.randomize_input(RANDOM_INPUT_LEN)?;
    restores_original_after_round_trip(ctx)
}

fn compresses_better_than_baseline(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    let original_len = file_len(&ctx.workspace.input_path())?;

    ctx.compress(Artifact::Candidate)?;
    let candidate_len = file_len(&ctx.workspace.compressed_path())?;
    fs::remove_file(ctx.workspace.compressed_path())?;

    ctx.compress(Artifact::Baseline)?;
    let baseline_len = file_len(&ctx.workspace.compressed_path())?;

    let baseline_pct = percent_of(baseline_len, original_len);
    let candidate_pct = percent_of(candidate_len, original_len);
    println!(
        "File sizes: {baseline_len} bytes ({baseline_pct:.2}%) - baseline, \
         {candidate_len} bytes ({candidate_pct:.2}%) - candidate"
    );

    if baseline_pct - candidate_pct < ctx.thresholds.ratio_margin_pct {
        return Err(OracleError::assertion(format!(
            "the candidate's compression rate must be at least {} percentage point(s) \
             better than the baseline's",
            ctx.thresholds.ratio_margin_pct
        )));
    }
    Ok(())
}

fn compresses_within_time_budget(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    let baseline_mean = time_mean(|| ctx.compress(Artifact::Baseline))?;
    let candidate_mean = time_mean(|| ctx.compress(Artifact::Candidate))?;

    println!(
        "Compression means over {TIMING_ITERATIONS} runs: {baseline_mean:?} - baseline, \
         {candidate_mean:?} - candidate"
    );

    if !within_speed_budget(candidate_mean, baseline_mean, ctx.thresholds.speed_multiplier) {
        return Err(OracleError::assertion(format!(
            "candidate compression took more than {}x the baseline's time",
            ctx.thresholds.speed_multiplier
        )));
    }
    Ok(())
}

fn compresses_random_data_within_time_budget(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    ctx.randomize_input(RANDOM_INPUT_LEN)?;
    compresses_within_time_budget(ctx)
}

fn decompresses_within_time_budget(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    // Pre-produce both compressed inputs once; only decompression is timed.
    let baseline_input = baseline_compressed_path(ctx.workspace);
    ctx.compress_to(Artifact::Baseline, &baseline_input)?;
    ctx.compress(Artifact::Candidate)?;

    let baseline_mean = time_mean(|| ctx.decompress_from(Artifact::Baseline, &baseline_input))?;
    let candidate_mean = time_mean(|| ctx.decompress(Artifact::Candidate))?;

    println!(
        "Decompression means over {TIMING_ITERATIONS} runs: {baseline_mean:?} - baseline, \
         {candidate_mean:?} - candidate"
    );

    if !within_speed_budget(candidate_mean, baseline_mean, ctx.thresholds.speed_multiplier) {
        return Err(OracleError::assertion(format!(
            "candidate decompression took more than {}x the baseline's time",
            ctx.thresholds.speed_multiplier
        )));
    }
    Ok(())
}

fn decompresses_random_data_within_time_budget(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    ctx.randomize_input(RANDOM_INPUT_LEN)?;
    decompresses_within_time_budget(ctx)
}

fn leaves_no_temporary_files_after_compression(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    ctx.compress(Artifact::Candidate)?;

    let count = ctx.workspace.file_count()?;
    if count > ctx.thresholds.max_files_after_compress {
        return Err(OracleError::assertion(format!(
            "{count} files were left in the workspace after compression, expected at most {}",
            ctx.thresholds.max_files_after_compress
        )));
    }
    Ok(())
}

fn leaves_no_temporary_files_after_round_trip(ctx: &CheckContext<'_>) -> Result<(), OracleError> {
    ctx.compress(Artifact::Candidate)?;
    ctx.decompress(Artifact::Candidate)?;

    let count = ctx.workspace.file_count()?;
    if count > ctx.thresholds.max_files_after_round_trip {
        return Err(OracleError::assertion(format!(
            "{count} files were left in the workspace after a round trip, expected at most {}",
            ctx.thresholds.max_files_after_round_trip
        )));
    }
    Ok(())
}

/// Distinct output path for the baseline's compressed file in the
/// decompression-timing oracles, so it never collides with the candidate's.
fn baseline_compressed_path(workspace: &Workspace) -> PathBuf {
    let mut path = workspace.compressed_path().into_os_string();
    path.push(".baseline");
    PathBuf::from(path)
}
