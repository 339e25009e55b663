//! Wire types for the release API and the normalized assets derived from them.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::arch::Arch;

/// Latest-release document as served by the release API.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamRelease {
  /// Opaque release identifier (numeric or string depending on the API version).
  #[serde(default)]
  pub id: serde_json::Value,
  pub version: String,
  #[serde(default)]
  pub released_at: Option<String>,
  #[serde(default)]
  pub links: Vec<UpstreamLink>,
}

/// One downloadable artifact of an upstream release.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamLink {
  #[serde(default)]
  pub display: String,
  #[serde(default)]
  pub platform: String,
  #[serde(default)]
  pub kind: String,
  /// Direct download URL.
  pub link: String,
  pub os: String,
  pub arch: String,
  pub format: String,
  #[serde(default)]
  pub hash: Option<String>,
}

/// An artifact selected for publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseAsset {
  pub download_url: String,
  pub arch: Arch,
  /// Derived from the final path segment of `download_url`.
  pub file_name: String,
  /// Lowercase hex SHA-256 digest, when upstream published one.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sha256: Option<String>,
}

impl ReleaseAsset {
  /// Create an asset, deriving its file name from the download URL.
  pub fn new(download_url: impl Into<String>, arch: Arch) -> Self {
    let download_url = download_url.into();
    let file_name = file_name_from_url(&download_url);
    Self {
      download_url,
      arch,
      file_name,
      sha256: None,
    }
  }

  /// Attach an upstream content hash. Only SHA-256 digests are kept.
  pub fn with_hash(mut self, hash: Option<&str>) -> Self {
    self.sha256 = hash.and_then(parse_sha256);
    self
  }
}

/// The latest release, reduced to the assets this tool manages.
#[derive(Debug, Clone, Serialize)]
pub struct LatestRelease {
  pub version: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub released_at: Option<String>,
  pub assets: Vec<ReleaseAsset>,
}

/// Derive a safe file name from the last path segment of a URL.
///
/// Query strings and fragments are ignored and characters outside
/// `[A-Za-z0-9._-]` become `_`. Falls back to a hash of the URL when no
/// usable segment exists.
pub fn file_name_from_url(url: &str) -> String {
  let segment = match Url::parse(url) {
    Ok(parsed) => parsed
      .path_segments()
      .and_then(|mut segments| segments.next_back())
      .map(str::to_string),
    Err(_) => url
      .split(['?', '#'])
      .next()
      .and_then(|path| path.rsplit('/').next())
      .map(str::to_string),
  };

  if let Some(segment) = segment {
    let sanitized: String = segment
      .chars()
      .map(|c| {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
          c
        } else {
          '_'
        }
      })
      .collect();

    if !sanitized.is_empty() && sanitized != "." && sanitized != ".." {
      return sanitized;
    }
  }

  let mut hasher = Sha256::new();
  hasher.update(url.as_bytes());
  format!("download_{}", &hex::encode(hasher.finalize())[..16])
}

/// Accept `<hex>` or `sha256:<hex>` with exactly 64 hex digits.
fn parse_sha256(hash: &str) -> Option<String> {
  let hex_part = hash.strip_prefix("sha256:").unwrap_or(hash).trim();
  if hex_part.len() == 64 && hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
    Some(hex_part.to_ascii_lowercase())
  } else {
    None
  }
}
