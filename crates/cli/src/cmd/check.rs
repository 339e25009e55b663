//! Implementation of the `debsync check` command.

use std::process::ExitCode;

use anyhow::Result;

use debsync_lib::builder::{Builder, InheritRunner};

use super::{BuilderArgs, runtime};
use crate::output::Status;

/// Verify the repository builder can be invoked.
pub fn cmd_check(args: BuilderArgs) -> Result<ExitCode> {
  let builder = Builder::new(InheritRunner::new(), args.builder).with_timeout(args.build_timeout);

  let rt = runtime()?;
  match rt.block_on(builder.check_version()) {
    Ok(()) => {
      Status::Done.print(&format!("Repository builder '{}' is available", builder.program()));
      Ok(ExitCode::SUCCESS)
    }
    Err(err) => {
      Status::Failed.print(&format!("error: {err}"));
      Ok(ExitCode::FAILURE)
    }
  }
}
