//! Scoped ownership of the staging directory.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// Owns the staging directory for the duration of one run.
///
/// The directory is removed exactly once: by [`StagingArea::release`] on every
/// normal, failed, or interrupted exit, or by `Drop` if the run unwinds.
#[derive(Debug)]
pub struct StagingArea {
  path: PathBuf,
  released: bool,
}

impl StagingArea {
  /// Take ownership of `path`. Nothing is touched on disk yet.
  pub fn acquire(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      released: false,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Remove anything left at the path and recreate it empty.
  pub async fn prepare(&self) -> io::Result<()> {
    match tokio::fs::remove_dir_all(&self.path).await {
      Ok(()) => info!(path = %self.path.display(), "removed stale staging directory"),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(e),
    }

    tokio::fs::create_dir_all(&self.path).await?;
    debug!(path = %self.path.display(), "staging directory ready");
    Ok(())
  }

  /// Remove the staging directory and give up ownership.
  pub fn release(mut self) {
    self.remove();
    self.released = true;
  }

  fn remove(&self) {
    match remove_tree(&self.path, |path| std::fs::remove_dir_all(path)) {
      Ok(()) => info!(path = %self.path.display(), "removed staging directory"),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %self.path.display(), "no staging directory to remove");
      }
      Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove staging directory"),
    }
  }
}

/// Attempts before giving up on a directory that keeps getting refilled.
const REMOVE_ATTEMPTS: u32 = 2;

/// Run `remove` on `path`, retrying when it fails with `DirectoryNotEmpty`.
///
/// A write from an aborted download can land between the recursive delete
/// emptying the directory and the final `rmdir`.
fn remove_tree(path: &Path, mut remove: impl FnMut(&Path) -> io::Result<()>) -> io::Result<()> {
  let mut attempt = 1;
  loop {
    match remove(path) {
      Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty && attempt < REMOVE_ATTEMPTS => {
        debug!(path = %path.display(), attempt, "staging directory refilled during removal, retrying");
        attempt += 1;
      }
      result => return result,
    }
  }
}

impl Drop for StagingArea {
  fn drop(&mut self) {
    if !self.released {
      self.remove();
    }
  }
}
