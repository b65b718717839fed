//! Subprocess invocation for compressor artifacts
//!
//! One invocation = one blocking subprocess run with captured output and a
//! wall-clock timing around the whole call. Invocations are strictly
//! sequential and never retried; no timeout is enforced, so a hung
//! collaborator hangs the harness (accepted limitation for short,
//! developer-triggered runs).

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

/// Captured output and wall-clock duration of one subprocess invocation.
#[derive(Debug)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

/// Run an artifact to completion with the given arguments.
///
/// The working directory is the artifact's own directory, so collaborators
/// may resolve their private resources relative to themselves. Stdout and
/// stderr are captured rather than inherited, then echoed to the harness
/// console after the subprocess exits; since invocations never overlap the
/// streams cannot interleave. Exit codes are not interpreted here; the
/// calling oracle decides success by inspecting the files the subprocess
/// was asked to write.
pub fn run_binary(binary: &Path, args: &[&OsStr]) -> io::Result<ExecutionResult> {
    let mut command = Command::new(binary);
    command.args(args);
    if let Some(dir) = binary.parent().filter(|p| !p.as_os_str().is_empty()) {
        command.current_dir(dir);
    }

    tracing::debug!(binary = %binary.display(), ?args, "invoking artifact");
    let started = Instant::now();
    let output = command.output()?;
    let duration = started.elapsed();

    let result = ExecutionResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration,
    };
    print!("{}", result.stdout);
    print!("{}", result.stderr);
    Ok(result)
}
