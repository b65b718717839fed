//! Collaborator project builds and artifact resolution
//!
//! Both compressor projects (candidate and baseline) are built with
//! `cargo build --release` before any oracle runs. The runnable artifact is
//! resolved deterministically from the project directory name and cargo's
//! release output layout; any failure here is fatal to the whole run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from building a collaborator project.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot access project directory '{}': {source}", project.display())]
    Project {
        project: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start 'cargo build': {0}")]
    Launch(#[source] io::Error),

    #[error("'cargo build --release' failed in '{}':\n{stderr}", project.display())]
    Failed { project: PathBuf, stderr: String },

    #[error("build did not produce an artifact at the expected path '{}'", path.display())]
    ArtifactMissing { path: PathBuf },
}

/// Build a collaborator project and resolve its runnable artifact.
///
/// The cargo exit status is checked before probing for the artifact, so a
/// failing build is rejected even when a stale artifact from an earlier
/// successful build is still present.
#[tracing::instrument(skip_all, fields(project = %project_dir.display()))]
pub fn build_artifact(project_dir: &Path) -> Result<PathBuf, BuildError> {
    let project = fs::canonicalize(project_dir).map_err(|source| BuildError::Project {
        project: project_dir.to_path_buf(),
        source,
    })?;

    tracing::info!("building collaborator artifact");
    let output = Command::new("cargo")
        .args(["build", "--release"])
        .current_dir(&project)
        .output()
        .map_err(BuildError::Launch)?;

    if !output.status.success() {
        return Err(BuildError::Failed {
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            project,
        });
    }

    let path = expected_artifact_path(&project);
    if !path.is_file() {
        return Err(BuildError::ArtifactMissing { path });
    }
    Ok(path)
}

/// Expected artifact location: `<project>/target/release/<project-name>`
/// plus the platform executable suffix. By convention the project directory
/// name doubles as the package (and thus binary) name.
pub fn expected_artifact_path(project_dir: &Path) -> PathBuf {
    let name = project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    project_dir
        .join("target")
        .join("release")
        .join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_path_follows_release_layout() {
        let path = expected_artifact_path(Path::new("/work/reference-gzip"));
        let expected = format!(
            "/work/reference-gzip/target/release/reference-gzip{}",
            std::env::consts::EXE_SUFFIX
        );
        assert_eq!(path, PathBuf::from(expected));
    }

    #[test]
    fn missing_project_directory_is_fatal() {
        let err = build_artifact(Path::new("/nonexistent/candidate")).unwrap_err();
        assert!(matches!(err, BuildError::Project { .. }));
        assert!(err.to_string().contains("/nonexistent/candidate"));
    }

    #[test]
    fn missing_artifact_error_names_the_expected_path() {
        let err = BuildError::ArtifactMissing {
            path: PathBuf::from("/work/candidate/target/release/candidate"),
        };
        assert!(err.to_string().contains("target/release/candidate"));
    }
}
