//! Artifact fetching.
//!
//! Downloads every selected release asset into the staging directory at
//! once. Downloads settle independently: one failure never cancels its
//! siblings, and the caller decides what a partial result means.
//!
//! Bytes are streamed to `<file_name>.part` and renamed to `<file_name>`
//! only after the body has been fully written, so a half-written file is
//! never visible under its final name.

mod types;

pub use types::{DownloadError, DownloadFailure, FetchError, FetchOutcome, StagedArtifact};

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::release::ReleaseAsset;

/// Suffix for in-progress downloads.
const PART_SUFFIX: &str = ".part";

/// Download all assets concurrently into `dest`.
///
/// `dest` must already exist. The returned outcome lists staged artifacts in
/// the same order as `assets`, regardless of completion order.
pub async fn fetch_all(
  client: &Client,
  assets: &[ReleaseAsset],
  dest: &Path,
  timeout: Option<Duration>,
) -> FetchOutcome {
  info!(count = assets.len(), dest = %dest.display(), "downloading release assets");

  let mut join_set = JoinSet::new();

  for (index, asset) in assets.iter().enumerate() {
    let client = client.clone();
    let asset = asset.clone();
    let dest = dest.to_path_buf();

    join_set.spawn(async move { (index, download(&client, &asset, &dest, timeout).await) });
  }

  let mut settled: Vec<Option<Result<StagedArtifact, DownloadError>>> = assets.iter().map(|_| None).collect();

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((index, result)) => settled[index] = Some(result),
      Err(join_err) => error!(error = %join_err, "download task panicked"),
    }
  }

  let mut outcome = FetchOutcome {
    attempted: assets.len(),
    ..FetchOutcome::default()
  };

  for (asset, result) in assets.iter().zip(settled) {
    let result = result.unwrap_or_else(|| {
      Err(DownloadError::Aborted {
        url: asset.download_url.clone(),
        message: "download task did not complete".to_string(),
      })
    });

    match result {
      Ok(artifact) => outcome.staged.push(artifact),
      Err(err) => {
        warn!(file = %asset.file_name, error = %err, "download failed");
        outcome.failures.push(DownloadFailure {
          asset: asset.clone(),
          error: err,
        });
      }
    }
  }

  info!(
    succeeded = outcome.staged.len(),
    attempted = outcome.attempted,
    bytes = outcome.total_bytes(),
    "downloads settled"
  );

  outcome
}

/// Download a single asset, publishing it under its final name on success.
async fn download(
  client: &Client,
  asset: &ReleaseAsset,
  dest: &Path,
  timeout: Option<Duration>,
) -> Result<StagedArtifact, DownloadError> {
  let final_path = dest.join(&asset.file_name);
  let part_path = dest.join(format!("{}{}", asset.file_name, PART_SUFFIX));

  let size = match stream_to_file(client, asset, &part_path, timeout).await {
    Ok(size) => size,
    Err(err) => {
      if let Err(remove_err) = fs::remove_file(&part_path).await
        && remove_err.kind() != std::io::ErrorKind::NotFound
      {
        debug!(path = %part_path.display(), error = %remove_err, "failed to remove partial download");
      }
      return Err(err);
    }
  };

  fs::rename(&part_path, &final_path)
    .await
    .map_err(|source| DownloadError::Io {
      path: final_path.clone(),
      source,
    })?;

  info!(path = %final_path.display(), size, "download complete");

  Ok(StagedArtifact {
    local_path: final_path,
    asset: asset.clone(),
    size,
  })
}

/// Stream the response body for `asset` into `path`, returning the byte count.
async fn stream_to_file(
  client: &Client,
  asset: &ReleaseAsset,
  path: &Path,
  timeout: Option<Duration>,
) -> Result<u64, DownloadError> {
  let url = &asset.download_url;
  info!(url = %url, arch = %asset.arch, "fetching asset");

  let mut request = client.get(url);
  if let Some(timeout) = timeout {
    request = request.timeout(timeout);
  }

  let mut response = request.send().await.map_err(|source| DownloadError::Request {
    url: url.clone(),
    source,
  })?;

  if !response.status().is_success() {
    return Err(DownloadError::Status {
      url: url.clone(),
      status: response.status(),
    });
  }

  let io_err = |source: std::io::Error| DownloadError::Io {
    path: path.to_path_buf(),
    source,
  };

  let mut file = fs::File::create(path).await.map_err(io_err)?;
  let mut hasher = Sha256::new();
  let mut size: u64 = 0;

  while let Some(chunk) = response.chunk().await.map_err(|source| DownloadError::Request {
    url: url.clone(),
    source,
  })? {
    hasher.update(&chunk);
    size += chunk.len() as u64;
    file.write_all(&chunk).await.map_err(io_err)?;
  }

  file.flush().await.map_err(io_err)?;
  file.sync_all().await.map_err(io_err)?;

  if let Some(expected) = &asset.sha256 {
    let actual = hex::encode(hasher.finalize());
    if &actual != expected {
      return Err(DownloadError::HashMismatch {
        url: url.clone(),
        expected: expected.clone(),
        actual,
      });
    }
    debug!(file = %asset.file_name, "hash verified");
  }

  Ok(size)
}
