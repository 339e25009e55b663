//! Terminal output for the `debsync` commands.
//!
//! Status lines go to stdout, except failures and warnings which go to
//! stderr next to the log. Colors are applied only when the stream supports
//! them.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use url::Url;

use debsync_lib::pipeline::SyncReport;
use debsync_lib::release::{LatestRelease, ReleaseAsset};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Done,
  Failed,
  Warning,
  Note,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Self::Done => "✓",
      Self::Failed => "✗",
      Self::Warning => "⚠",
      Self::Note => "•",
    }
  }

  fn stream(self) -> Stream {
    match self {
      Self::Done | Self::Note => Stream::Stdout,
      Self::Failed | Self::Warning => Stream::Stderr,
    }
  }

  /// Print `message` behind this status' symbol.
  pub fn print(self, message: &str) {
    let stream = self.stream();
    let symbol = self.symbol();
    let line = match self {
      Self::Done => format!("{} {message}", symbol.if_supports_color(stream, |s| s.green())),
      Self::Note => format!("{} {message}", symbol.if_supports_color(stream, |s| s.blue())),
      Self::Failed => format!(
        "{} {}",
        symbol.if_supports_color(stream, |s| s.red()),
        message.if_supports_color(stream, |s| s.red())
      ),
      Self::Warning => format!(
        "{} {}",
        symbol.if_supports_color(stream, |s| s.yellow()),
        message.if_supports_color(stream, |s| s.yellow())
      ),
    };

    match self {
      Self::Failed | Self::Warning => eprintln!("{line}"),
      Self::Done | Self::Note => println!("{line}"),
    }
  }
}

fn print_stat(label: &str, value: impl std::fmt::Display) {
  println!("  {}: {value}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()));
}

/// Binary-prefixed size with one decimal, e.g. `1.5 KiB`.
pub fn format_size(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

  if bytes < 1024 {
    return format!("{bytes} B");
  }

  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit < UNITS.len() - 1 {
    value /= 1024.0;
    unit += 1;
  }
  format!("{value:.1} {}", UNITS[unit])
}

/// Elapsed time rounded to milliseconds, in humantime notation.
pub fn format_elapsed(elapsed: Duration) -> String {
  let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
  humantime::format_duration(Duration::from_millis(millis)).to_string()
}

/// One asset as `<arch> (<upstream arch>) <file> → <url>`, uncolored.
pub fn asset_row(asset: &ReleaseAsset) -> String {
  format!(
    "{} ({}) {} → {}",
    asset.arch,
    asset.arch.upstream(),
    asset.file_name,
    asset.download_url
  )
}

fn print_asset(asset: &ReleaseAsset) {
  println!(
    "  {} {}",
    Status::Note.symbol().if_supports_color(Stream::Stdout, |s| s.cyan()),
    asset_row(asset)
  );
}

/// Text rendering of `debsync discover`.
pub fn print_release(release: &LatestRelease, source: &Url) {
  Status::Done.print(&format!("Latest release: {}", release.version));
  print_stat("Source", source);
  if let Some(released_at) = &release.released_at {
    print_stat("Released", released_at);
  }
  print_stat("Assets", release.assets.len());
  println!();

  for asset in &release.assets {
    print_asset(asset);
  }
}

/// Closing summary of a successful `debsync sync`.
pub fn print_sync_summary(report: &SyncReport, elapsed: Duration) {
  println!();
  Status::Done.print(&format!("Published version {}", report.version));
  print_stat("Downloaded", format!("{}/{}", report.staged.len(), report.attempted));
  print_stat("Size", format_size(report.total_bytes()));
  print_stat("Repository", report.output_dir.display());
  print_stat("Duration", format_elapsed(elapsed));

  if let Some(warning) = partial_warning(report) {
    Status::Warning.print(&warning);
  }
}

fn partial_warning(report: &SyncReport) -> Option<String> {
  match report.failed() {
    0 => None,
    failed => Some(format!(
      "{failed} of {} downloads failed; see the log above",
      report.attempted
    )),
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
