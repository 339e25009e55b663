mod check;
mod discover;
mod sync;

pub use check::cmd_check;
pub use discover::cmd_discover;
pub use sync::cmd_sync;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::runtime::Runtime;

use debsync_lib::consts::{DEFAULT_BUILDER, DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_STAGING_DIR};
use debsync_lib::settings::SyncSettings;

/// Release API options.
#[derive(Debug, Args)]
pub struct ApiArgs {
  /// Latest-release endpoint of the release API
  #[arg(long, env = "DEBSYNC_API_URL")]
  pub api_url: String,

  /// Timeout for the release API request (e.g. "30s")
  #[arg(long, value_parser = humantime::parse_duration)]
  pub api_timeout: Option<Duration>,
}

/// Repository builder options.
#[derive(Debug, Args)]
pub struct BuilderArgs {
  /// Repository builder executable
  #[arg(long, env = "DEBSYNC_BUILDER", default_value = DEFAULT_BUILDER)]
  pub builder: String,

  /// Timeout for each builder invocation (e.g. "10m")
  #[arg(long, value_parser = humantime::parse_duration)]
  pub build_timeout: Option<Duration>,
}

/// Options for a full sync run.
#[derive(Debug, Args)]
pub struct SyncArgs {
  /// Repository configuration document
  #[arg(short, long, env = "DEBSYNC_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
  pub config: PathBuf,

  /// Download directory, relative to the config's directory; removed after every run
  #[arg(long, env = "DEBSYNC_STAGING_DIR", default_value = DEFAULT_STAGING_DIR)]
  pub staging_dir: PathBuf,

  /// Repository output directory, relative to the config's directory
  #[arg(long, env = "DEBSYNC_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
  pub output_dir: PathBuf,

  /// Timeout for each artifact download (e.g. "5m")
  #[arg(long, value_parser = humantime::parse_duration)]
  pub download_timeout: Option<Duration>,

  #[command(flatten)]
  pub api: ApiArgs,

  #[command(flatten)]
  pub builder: BuilderArgs,
}

impl SyncArgs {
  /// Collect the arguments into resolved settings.
  pub fn into_settings(self) -> Result<SyncSettings> {
    let mut settings = SyncSettings::new(self.config, self.api.api_url);
    settings.staging_dir = self.staging_dir;
    settings.output_dir = self.output_dir;
    settings.builder = self.builder.builder;
    settings.api_timeout = self.api.api_timeout;
    settings.download_timeout = self.download_timeout;
    settings.build_timeout = self.builder.build_timeout;

    settings.resolve().context("Failed to resolve paths")
  }
}

/// The single-threaded runtime every command runs on.
fn runtime() -> Result<Runtime> {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")
}
