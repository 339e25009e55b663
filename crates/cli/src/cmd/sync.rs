//! Implementation of the `debsync sync` command.
//!
//! Runs the full pipeline: discover, download, rewrite the config, and
//! rebuild the repository.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use tracing::debug;

use debsync_lib::builder::InheritRunner;
use debsync_lib::pipeline::{Pipeline, PipelineError, SyncReport, shutdown_signal};

use super::{SyncArgs, runtime};
use crate::output::{Status, print_sync_summary};

/// Execute the sync command.
///
/// Returns the process exit status: 0 on success, 1 on a fatal pipeline
/// error, or 130/143 when interrupted by SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error only if arguments cannot be resolved or the runtime
/// cannot start. Pipeline failures are reported here and mapped to an exit
/// status.
pub fn cmd_sync(args: SyncArgs) -> Result<ExitCode> {
  let start = Instant::now();
  let settings = args.into_settings()?;
  debug!(settings = ?settings, "resolved settings");
  Status::Note.print(&format!("Syncing {} from {}", settings.config_path.display(), settings.api_url));
  let runner = InheritRunner::new().with_working_dir(settings.base_dir());

  let rt = runtime()?;
  let result: Result<SyncReport, PipelineError> = rt.block_on(async {
    let pipeline = Pipeline::new(settings, runner)?;
    pipeline.run(shutdown_signal()).await
  });

  match result {
    Ok(report) => {
      print_sync_summary(&report, start.elapsed());
      Ok(ExitCode::SUCCESS)
    }
    Err(err) => {
      Status::Failed.print(&format!("error: {err}"));
      Ok(ExitCode::from(err.exit_code()))
    }
  }
}
