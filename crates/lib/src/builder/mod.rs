//! External repository-builder orchestration.
//!
//! The builder is a black box: `<builder> --version` proves it is installed,
//! `<builder> build --config <path> --output <dir>` regenerates the
//! repository. Both go through the same [`CommandRunner`].

mod runner;

pub use runner::{CommandRunner, InheritRunner};

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

/// Errors from the pre-flight tooling check.
#[derive(Debug, Error)]
pub enum ToolingError {
  /// The builder executable could not be found.
  #[error("repository builder '{program}' not found on PATH; install it or pass --builder <path>")]
  NotFound { program: String },

  /// The builder could not be started.
  #[error("failed to run '{program} --version': {source}; check that the builder is installed and executable")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The version query exited unsuccessfully.
  #[error(
    "'{program} --version' exited with {}; the builder may be broken or incompatible, reinstall it or pass --builder <path>",
    describe_exit(*.code)
  )]
  Failed { program: String, code: Option<i32> },

  /// The version query did not finish in time.
  #[error("'{program} --version' did not finish within {timeout:?}")]
  TimedOut { program: String, timeout: Duration },
}

/// Errors from the build invocation.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The builder could not be started.
  #[error("failed to start `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  /// The builder exited unsuccessfully.
  #[error("`{command}` exited with {}", describe_exit(*.code))]
  Failed { command: String, code: Option<i32> },

  /// The builder did not finish in time.
  #[error("`{command}` did not finish within {timeout:?}")]
  TimedOut { command: String, timeout: Duration },
}

fn describe_exit(code: Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

/// Invokes the repository builder through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct Builder<R> {
  runner: R,
  program: String,
  timeout: Option<Duration>,
}

impl<R: CommandRunner> Builder<R> {
  pub fn new(runner: R, program: impl Into<String>) -> Self {
    Self {
      runner,
      program: program.into(),
      timeout: None,
    }
  }

  /// Bound every invocation by `timeout`.
  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  /// Verify the builder is installed by asking for its version.
  ///
  /// # Errors
  ///
  /// Returns a [`ToolingError`] with remediation guidance when the builder is
  /// missing, cannot start, exits non-zero, or hangs.
  pub async fn check_version(&self) -> Result<(), ToolingError> {
    let args = vec!["--version".to_string()];
    debug!(program = %self.program, "checking repository builder");

    match self.invoke(&args).await {
      Ok(Ok(Some(0))) => {
        info!(program = %self.program, "repository builder available");
        Ok(())
      }
      Ok(Ok(code)) => Err(ToolingError::Failed {
        program: self.program.clone(),
        code,
      }),
      Ok(Err(source)) if source.kind() == io::ErrorKind::NotFound => Err(ToolingError::NotFound {
        program: self.program.clone(),
      }),
      Ok(Err(source)) => Err(ToolingError::Spawn {
        program: self.program.clone(),
        source,
      }),
      Err(timeout) => Err(ToolingError::TimedOut {
        program: self.program.clone(),
        timeout,
      }),
    }
  }

  /// Build the repository from `config_path` into `output_dir`.
  ///
  /// # Errors
  ///
  /// Returns a [`BuildError`] carrying the full command line when the
  /// builder cannot start, exits non-zero, or hangs.
  pub async fn build(&self, config_path: &Path, output_dir: &Path) -> Result<(), BuildError> {
    let args = build_args(config_path, output_dir);
    let command = command_line(&self.program, &args);
    info!(command = %command, "running repository builder");

    match self.invoke(&args).await {
      Ok(Ok(Some(0))) => {
        info!(output = %output_dir.display(), "repository build complete");
        Ok(())
      }
      Ok(Ok(code)) => Err(BuildError::Failed { command, code }),
      Ok(Err(source)) => Err(BuildError::Spawn { command, source }),
      Err(timeout) => Err(BuildError::TimedOut { command, timeout }),
    }
  }

  /// Run the builder, yielding `Err(timeout)` if it does not finish in time.
  async fn invoke(&self, args: &[String]) -> Result<io::Result<Option<i32>>, Duration> {
    let run = self.runner.run(&self.program, args);
    match self.timeout {
      Some(timeout) => tokio::time::timeout(timeout, run).await.map_err(|_| timeout),
      None => Ok(run.await),
    }
  }
}

/// Arguments for a build invocation.
pub fn build_args(config_path: &Path, output_dir: &Path) -> Vec<String> {
  vec![
    "build".to_string(),
    "--config".to_string(),
    config_path.display().to_string(),
    "--output".to_string(),
    output_dir.display().to_string(),
  ]
}

/// Render a command line for diagnostics, quoting arguments with whitespace.
pub fn command_line(program: &str, args: &[String]) -> String {
  std::iter::once(program)
    .chain(args.iter().map(String::as_str))
    .map(|part| {
      if part.is_empty() || part.chars().any(char::is_whitespace) {
        format!("'{}'", part.replace('\'', r"'\''"))
      } else {
        part.to_string()
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}
