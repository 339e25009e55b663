//! Types for the sync pipeline.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::signal::Signal;
use crate::builder::{BuildError, ToolingError};
use crate::config::ConfigError;
use crate::fetch::{FetchError, StagedArtifact};
use crate::release::DiscoveryError;

/// Pipeline states, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Idle,
  ValidatingTooling,
  LoadingConfig,
  Discovering,
  PreparingStaging,
  Downloading,
  RewritingConfig,
  SavingConfig,
  Building,
  Cleanup,
  Succeeded,
  Failed,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Idle => "idle",
      Self::ValidatingTooling => "validating-tooling",
      Self::LoadingConfig => "loading-config",
      Self::Discovering => "discovering",
      Self::PreparingStaging => "preparing-staging",
      Self::Downloading => "downloading",
      Self::RewritingConfig => "rewriting-config",
      Self::SavingConfig => "saving-config",
      Self::Building => "building",
      Self::Cleanup => "cleanup",
      Self::Succeeded => "succeeded",
      Self::Failed => "failed",
    }
  }

  /// Returns true for the two final states.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Succeeded | Self::Failed)
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Fatal pipeline errors. Every variant ends the run with cleanup.
#[derive(Debug, Error)]
pub enum PipelineError {
  /// The repository builder is missing or broken.
  #[error("tooling check failed: {0}")]
  Tooling(#[from] ToolingError),

  /// The configuration document could not be loaded or saved.
  #[error("config error: {0}")]
  Config(#[from] ConfigError),

  /// The latest release could not be discovered.
  #[error("discovery failed: {0}")]
  Discovery(#[from] DiscoveryError),

  /// The staging directory could not be prepared.
  #[error("failed to prepare staging directory {path}: {source}")]
  Staging {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// No artifact could be downloaded.
  #[error("download failed: {0}")]
  Fetch(#[from] FetchError),

  /// The repository builder failed.
  #[error("build failed: {0}")]
  Build(#[from] BuildError),

  /// The HTTP client could not be constructed.
  #[error("failed to initialize HTTP client: {0}")]
  HttpClient(#[source] reqwest::Error),

  /// The run was stopped by an external signal.
  #[error("interrupted by {0}")]
  Interrupted(Signal),
}

impl PipelineError {
  /// Process exit status for this error.
  pub fn exit_code(&self) -> u8 {
    match self {
      Self::Interrupted(signal) => signal.exit_code(),
      _ => 1,
    }
  }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
  /// Upstream version that was published.
  pub version: String,
  /// Artifacts the config now references, in publication order.
  pub staged: Vec<StagedArtifact>,
  /// Downloads started.
  pub attempted: usize,
  /// Package paths written to every component.
  pub packages: Vec<String>,
  /// Where the builder wrote the repository.
  pub output_dir: PathBuf,
}

impl SyncReport {
  /// Number of downloads that failed but did not stop the run.
  pub fn failed(&self) -> usize {
    self.attempted - self.staged.len()
  }

  pub fn total_bytes(&self) -> u64 {
    self.staged.iter().map(|artifact| artifact.size).sum()
  }
}
