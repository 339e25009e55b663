//! Subprocess execution with inherited standard streams.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// Runs an external program and reports how it exited.
///
/// Implementations inherit the caller's stdin/stdout/stderr so the program's
/// output reaches the operator unmodified. `Ok(None)` means the program was
/// terminated by a signal and has no exit code.
pub trait CommandRunner {
  fn run(&self, program: &str, args: &[String]) -> impl Future<Output = io::Result<Option<i32>>>;
}

/// Production runner backed by [`tokio::process::Command`].
///
/// The child is killed if the returned future is dropped, which is how
/// timeouts and interruption stop a running builder.
#[derive(Debug, Clone, Default)]
pub struct InheritRunner {
  working_dir: Option<PathBuf>,
}

impl InheritRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run commands from `dir` instead of the current directory.
  pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(dir.into());
    self
  }
}

impl CommandRunner for InheritRunner {
  async fn run(&self, program: &str, args: &[String]) -> io::Result<Option<i32>> {
    let mut command = Command::new(program);
    command
      .args(args)
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .kill_on_drop(true);

    if let Some(dir) = &self.working_dir {
      command.current_dir(dir);
    }

    debug!(program = %program, args = ?args, working_dir = ?self.working_dir, "spawning process");

    let status = command.status().await?;
    Ok(status.code())
  }
}
