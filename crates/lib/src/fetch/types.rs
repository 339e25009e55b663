//! Types for artifact fetching.

use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::release::ReleaseAsset;

/// A fully downloaded artifact under its final name in the staging directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedArtifact {
  /// Absolute path of the downloaded file.
  pub local_path: PathBuf,
  /// The asset this file was downloaded from.
  pub asset: ReleaseAsset,
  /// Number of bytes written.
  pub size: u64,
}

/// Why a single asset could not be staged.
#[derive(Debug, Error)]
pub enum DownloadError {
  /// The request could not be sent or the body stream broke off.
  #[error("request for {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The server answered with a non-success status.
  #[error("{url} returned HTTP {status}")]
  Status { url: String, status: StatusCode },

  /// Writing or renaming the staged file failed.
  #[error("failed to write {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Downloaded bytes do not match the published SHA-256 digest.
  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  /// The download task died before settling.
  #[error("download of {url} aborted: {message}")]
  Aborted { url: String, message: String },
}

/// A failed download together with the asset it was for.
#[derive(Debug)]
pub struct DownloadFailure {
  pub asset: ReleaseAsset,
  pub error: DownloadError,
}

/// Aggregate result of a fetch stage: n succeeded out of m attempted.
#[derive(Debug, Default)]
pub struct FetchOutcome {
  /// Successful downloads, in asset order.
  pub staged: Vec<StagedArtifact>,
  /// Failed downloads, in asset order.
  pub failures: Vec<DownloadFailure>,
  /// Number of downloads started.
  pub attempted: usize,
}

/// Errors that end the fetch stage.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Nothing was downloaded, so there is nothing to publish.
  #[error("all {attempted} downloads failed")]
  AllDownloadsFailed { attempted: usize },
}

impl FetchOutcome {
  /// Returns true if some, but not all, downloads failed.
  pub fn is_partial(&self) -> bool {
    !self.staged.is_empty() && !self.failures.is_empty()
  }

  /// Total bytes across staged artifacts.
  pub fn total_bytes(&self) -> u64 {
    self.staged.iter().map(|artifact| artifact.size).sum()
  }

  /// Keep the staged artifacts, escalating a total failure.
  ///
  /// # Errors
  ///
  /// Returns [`FetchError::AllDownloadsFailed`] when no artifact was staged.
  pub fn into_result(self) -> Result<Vec<StagedArtifact>, FetchError> {
    if self.staged.is_empty() {
      return Err(FetchError::AllDownloadsFailed {
        attempted: self.attempted,
      });
    }
    Ok(self.staged)
  }
}
