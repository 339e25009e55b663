mod cmd;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{ApiArgs, BuilderArgs, SyncArgs};
use output::{OutputFormat, Status};

/// debsync - keep a Debian repository in step with the latest upstream release
#[derive(Parser)]
#[command(name = "debsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Download the latest release, rewrite the config, and rebuild the repository
  Sync(SyncArgs),

  /// Show the latest release and the assets that would be published
  Discover {
    #[command(flatten)]
    api: ApiArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Check that the repository builder is installed
  Check(BuilderArgs),
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Sync(args) => cmd::cmd_sync(args),
    Commands::Discover { api, output } => cmd::cmd_discover(api, output),
    Commands::Check(args) => cmd::cmd_check(args),
  };

  match result {
    Ok(code) => code,
    Err(err) => {
      Status::Failed.print(&format!("error: {err:#}"));
      ExitCode::FAILURE
    }
  }
}
