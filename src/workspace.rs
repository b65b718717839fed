//! Scoped scratch workspaces for oracle execution
//!
//! Every oracle runs inside a fresh directory seeded with the input file
//! under a canonical name. The directory is removed on every exit path
//! (normal return, error, or panic) via a drop guard, so one oracle's side
//! effects never reach the next. A single fixed relative directory name is
//! reused sequentially; workspaces are never concurrent.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fixed relative directory reused for every oracle's workspace.
pub const WORKSPACE_DIR: &str = "selfcheck-tmp";

/// Canonical seed file name, both in the harness working directory and
/// inside the workspace.
pub const INPUT_FILE: &str = "example.log";
pub const COMPRESSED_FILE: &str = "example.log.compressed";
pub const DECOMPRESSED_FILE: &str = "example.log.decompressed";

/// A scratch directory that exists only while one oracle runs.
///
/// All paths are absolute: invocations change the subprocess working
/// directory, so workspace files must not be resolved relative to it.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn input_path(&self) -> PathBuf {
        self.root.join(INPUT_FILE)
    }

    pub fn compressed_path(&self) -> PathBuf {
        self.root.join(COMPRESSED_FILE)
    }

    pub fn decompressed_path(&self) -> PathBuf {
        self.root.join(DECOMPRESSED_FILE)
    }

    /// Number of regular files currently in the workspace (top level only),
    /// as counted by the hygiene oracles.
    pub fn file_count(&self) -> io::Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.root)? {
            if entry?.file_type()?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Removes the workspace tree when dropped, including on panic unwinds.
struct Teardown<'a>(&'a Path);

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_dir_all(self.0) {
            tracing::warn!(workspace = %self.0.display(), %error, "failed to remove workspace");
        }
    }
}

/// Run `body` inside a fresh workspace seeded with `seed_file`.
///
/// The seed file is copied in under the canonical input name before `body`
/// runs; the whole workspace tree is removed unconditionally afterwards.
pub fn with_workspace<T, E>(
    dir: &Path,
    seed_file: &Path,
    body: impl FnOnce(&Workspace) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<io::Error>,
{
    fs::create_dir_all(dir)?;
    let _teardown = Teardown(dir);
    let workspace = Workspace {
        root: fs::canonicalize(dir)?,
    };
    fs::copy(seed_file, workspace.input_path())?;
    body(&workspace)
}
