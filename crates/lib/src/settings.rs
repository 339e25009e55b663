//! Run settings shared by every pipeline stage.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;

use crate::consts::{DEFAULT_BUILDER, DEFAULT_OUTPUT_DIR, DEFAULT_STAGING_DIR, USER_AGENT};

/// Locations and limits for one sync run.
///
/// Relative `staging_dir` and `output_dir` values are resolved against the
/// directory containing `config_path` by [`SyncSettings::resolve`].
#[derive(Debug, Clone)]
pub struct SyncSettings {
  /// The repository configuration document.
  pub config_path: PathBuf,
  /// Scratch directory for downloads; removed after every run.
  pub staging_dir: PathBuf,
  /// Directory the builder writes the repository into.
  pub output_dir: PathBuf,
  /// Latest-release endpoint.
  pub api_url: String,
  /// Repository builder executable.
  pub builder: String,
  /// Timeout for the release API request.
  pub api_timeout: Option<Duration>,
  /// Timeout for each individual download.
  pub download_timeout: Option<Duration>,
  /// Timeout for each builder invocation.
  pub build_timeout: Option<Duration>,
}

impl SyncSettings {
  /// Settings with default locations next to `config_path`.
  pub fn new(config_path: impl Into<PathBuf>, api_url: impl Into<String>) -> Self {
    Self {
      config_path: config_path.into(),
      staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
      output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
      api_url: api_url.into(),
      builder: DEFAULT_BUILDER.to_string(),
      api_timeout: None,
      download_timeout: None,
      build_timeout: None,
    }
  }

  /// Make every path absolute.
  ///
  /// `config_path` is resolved against the current directory; relative
  /// staging and output directories against the config's directory.
  ///
  /// # Errors
  ///
  /// Fails only if the current directory cannot be determined.
  pub fn resolve(mut self) -> io::Result<Self> {
    self.config_path = std::path::absolute(&self.config_path)?;
    let base = self.base_dir().to_path_buf();
    self.staging_dir = base.join(&self.staging_dir);
    self.output_dir = base.join(&self.output_dir);
    Ok(self)
  }

  /// Directory containing the configuration document.
  pub fn base_dir(&self) -> &Path {
    match self.config_path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    }
  }
}

/// Build the shared HTTP client.
pub fn http_client() -> reqwest::Result<Client> {
  Client::builder()
    .user_agent(USER_AGENT)
    .connect_timeout(Duration::from_secs(30))
    .build()
}
