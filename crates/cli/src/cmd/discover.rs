//! Implementation of the `debsync discover` command.
//!
//! Queries the release API and lists the assets a sync would publish.
//! Touches no files.

use std::process::ExitCode;

use anyhow::{Context, Result};

use debsync_lib::release::ReleaseClient;
use debsync_lib::settings::http_client;

use super::{ApiArgs, runtime};
use crate::output::{OutputFormat, print_json, print_release};

pub fn cmd_discover(args: ApiArgs, output: OutputFormat) -> Result<ExitCode> {
  let http = http_client().context("Failed to initialize HTTP client")?;
  let client = ReleaseClient::new(http, &args.api_url)?.with_timeout(args.api_timeout);

  let rt = runtime()?;
  let release = rt.block_on(client.latest())?;

  if output.is_json() {
    print_json(&release)?;
  } else {
    print_release(&release, client.url());
  }

  Ok(ExitCode::SUCCESS)
}
