//! Release discovery.
//!
//! Queries the release API for the latest release and narrows its link list
//! down to the Linux `.deb` artifacts for supported architectures.

mod types;

pub use types::{LatestRelease, ReleaseAsset, UpstreamLink, UpstreamRelease, file_name_from_url};

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, info};

use crate::arch::map_arch;

/// Artifact format string for Debian packages.
pub const DEB_FORMAT: &str = "deb";

/// OS string for Linux builds.
pub const LINUX_OS: &str = "linux";

/// Errors that can occur while discovering the latest release.
#[derive(Debug, Error)]
pub enum DiscoveryError {
  /// The configured API URL is not a valid URL.
  #[error("invalid release API URL '{url}': {source}")]
  InvalidUrl {
    url: String,
    #[source]
    source: url::ParseError,
  },

  /// The request could not be sent or the body could not be read.
  #[error("release API request to {url} failed: {source}")]
  Request {
    url: Url,
    #[source]
    source: reqwest::Error,
  },

  /// The API answered with a non-success status.
  #[error("release API {url} returned HTTP {status}")]
  Status { url: Url, status: StatusCode },

  /// The response body does not have the expected shape.
  #[error("failed to parse release API response: {0}")]
  Parse(#[source] serde_json::Error),

  /// The release has no artifacts this tool can publish.
  #[error("release {version} has no linux .deb assets for supported architectures")]
  NoEligibleAssets { version: String },
}

/// Client for the latest-release endpoint.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
  client: Client,
  url: Url,
  timeout: Option<Duration>,
}

impl ReleaseClient {
  /// Construct a client bound to the latest-release endpoint.
  pub fn new(client: Client, url: &str) -> Result<Self, DiscoveryError> {
    let url = Url::parse(url).map_err(|source| DiscoveryError::InvalidUrl {
      url: url.to_string(),
      source,
    })?;

    Ok(Self {
      client,
      url,
      timeout: None,
    })
  }

  /// Bound the API request by the given timeout.
  pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.timeout = timeout;
    self
  }

  /// The endpoint this client queries.
  pub fn url(&self) -> &Url {
    &self.url
  }

  /// Fetch the latest release and select its publishable assets.
  ///
  /// # Errors
  ///
  /// Fails on transport errors, non-success status codes, bodies that do not
  /// parse, and releases with zero eligible assets.
  pub async fn latest(&self) -> Result<LatestRelease, DiscoveryError> {
    info!(url = %self.url, "querying latest release");

    let mut request = self.client.get(self.url.clone()).header(ACCEPT, "application/json");
    if let Some(timeout) = self.timeout {
      request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(|source| DiscoveryError::Request {
      url: self.url.clone(),
      source,
    })?;

    let status = response.status();
    if !status.is_success() {
      return Err(DiscoveryError::Status {
        url: self.url.clone(),
        status,
      });
    }

    let body = response.text().await.map_err(|source| DiscoveryError::Request {
      url: self.url.clone(),
      source,
    })?;

    let upstream: UpstreamRelease = serde_json::from_str(&body).map_err(DiscoveryError::Parse)?;
    let release = select_release(upstream)?;

    info!(
      version = %release.version,
      assets = release.assets.len(),
      "discovered latest release"
    );

    Ok(release)
  }
}

/// Reduce an upstream release to its eligible assets.
///
/// # Errors
///
/// Returns [`DiscoveryError::NoEligibleAssets`] when nothing survives the filter.
pub fn select_release(upstream: UpstreamRelease) -> Result<LatestRelease, DiscoveryError> {
  let assets = filter_assets(&upstream.links);
  if assets.is_empty() {
    return Err(DiscoveryError::NoEligibleAssets {
      version: upstream.version,
    });
  }

  Ok(LatestRelease {
    version: upstream.version,
    released_at: upstream.released_at,
    assets,
  })
}

/// Keep links that are Linux `.deb` builds for a supported architecture.
///
/// Output preserves the upstream order. File names are unique across the
/// result; see [`dedupe_file_names`].
pub fn filter_assets(links: &[UpstreamLink]) -> Vec<ReleaseAsset> {
  let mut assets: Vec<ReleaseAsset> = links
    .iter()
    .filter(|link| link.format == DEB_FORMAT && link.os == LINUX_OS)
    .filter_map(|link| match map_arch(&link.arch) {
      Ok(arch) => Some(ReleaseAsset::new(link.link.clone(), arch).with_hash(link.hash.as_deref())),
      Err(err) => {
        debug!(link = %link.link, error = %err, "skipping asset");
        None
      }
    })
    .collect();

  dedupe_file_names(&mut assets);
  assets
}

/// Rename assets whose file name was already taken by an earlier asset.
///
/// The first asset keeps its name. Later ones get `_<arch>` inserted before
/// the extension, then a numeric suffix if that is taken too.
fn dedupe_file_names(assets: &mut [ReleaseAsset]) {
  let mut taken = HashSet::new();

  for asset in assets.iter_mut() {
    if taken.insert(asset.file_name.clone()) {
      continue;
    }

    let tagged = insert_before_extension(&asset.file_name, asset.arch.as_str());
    let mut candidate = tagged.clone();
    let mut n = 2;
    while !taken.insert(candidate.clone()) {
      candidate = insert_before_extension(&tagged, &n.to_string());
      n += 1;
    }

    debug!(
      url = %asset.download_url,
      from = %asset.file_name,
      to = %candidate,
      "renamed colliding asset"
    );
    asset.file_name = candidate;
  }
}

/// `app.deb` + `arm64` -> `app_arm64.deb`; `app` + `arm64` -> `app_arm64`.
fn insert_before_extension(name: &str, tag: &str) -> String {
  match name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{tag}.{ext}"),
    _ => format!("{name}_{tag}"),
  }
}
