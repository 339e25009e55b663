//! Repository configuration store.
//!
//! Loads, rewrites, and persists the YAML document the repository builder
//! consumes. The document on disk is the only durable state this tool owns.

mod types;

pub use types::{Component, Release, RepositoryConfig};

use std::fs;
use std::io::{self, Write};
use std::path::{Component as PathComponent, Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::fetch::StagedArtifact;

/// Errors that can occur when loading or saving the configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the document.
  #[error("failed to read config {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The document is not valid YAML.
  #[error("failed to parse config {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  /// The mandatory `releases` section is absent.
  #[error("config {path} has no 'releases' section")]
  MissingReleases { path: PathBuf },

  /// The `releases` section does not have the expected structure.
  #[error("config {path} has a malformed 'releases' section: {message}")]
  MalformedReleases { path: PathBuf, message: String },

  /// Failed to serialize the document.
  #[error("failed to serialize config: {0}")]
  Serialize(#[source] serde_yaml::Error),

  /// Failed to write the document back.
  #[error("failed to write config {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Handle to the configuration document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
  path: PathBuf,
}

impl ConfigStore {
  /// Bind a store to the document at `path`.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Path of the configuration document.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Directory package paths are made relative to.
  pub fn base_dir(&self) -> &Path {
    match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    }
  }

  /// Read and parse the document.
  ///
  /// # Errors
  ///
  /// Fails if the file cannot be read, is not YAML, or its `releases`
  /// section is missing or malformed.
  pub fn load(&self) -> Result<RepositoryConfig, ConfigError> {
    debug!(path = %self.path.display(), "loading config");

    let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
      path: self.path.clone(),
      source,
    })?;

    let document: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: self.path.clone(),
      source,
    })?;

    match document.get("releases") {
      None => {
        return Err(ConfigError::MissingReleases {
          path: self.path.clone(),
        });
      }
      Some(releases) if !releases.is_sequence() => {
        return Err(ConfigError::MalformedReleases {
          path: self.path.clone(),
          message: "expected a list of releases".to_string(),
        });
      }
      Some(_) => {}
    }

    let config: RepositoryConfig = serde_yaml::from_value(document).map_err(|e| ConfigError::MalformedReleases {
      path: self.path.clone(),
      message: e.to_string(),
    })?;

    info!(
      path = %self.path.display(),
      releases = config.releases.len(),
      "loaded config"
    );

    Ok(config)
  }

  /// Serialize `config` and replace the document on disk.
  ///
  /// The new content is written to a temporary file next to the document and
  /// renamed over it, so readers see either the old or the new document.
  ///
  /// # Errors
  ///
  /// Fails if serialization or any filesystem step fails.
  pub fn save(&self, config: &RepositoryConfig) -> Result<(), ConfigError> {
    let content = to_yaml(config)?;
    let write_err = |source: io::Error| ConfigError::Write {
      path: self.path.clone(),
      source,
    };

    let mut temp = NamedTempFile::new_in(self.base_dir()).map_err(write_err)?;
    temp.write_all(content.as_bytes()).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;

    // Keep the operator's file mode rather than the temp file's 0600.
    if let Ok(metadata) = fs::metadata(&self.path) {
      fs::set_permissions(temp.path(), metadata.permissions()).map_err(write_err)?;
    }

    temp.persist(&self.path).map_err(|e| write_err(e.error))?;

    info!(path = %self.path.display(), "saved config");
    Ok(())
  }
}

/// Serialize the document deterministically.
///
/// Field order is fixed by the struct definitions, unknown keys are emitted
/// in sorted order, and list values are never wrapped.
pub fn to_yaml(config: &RepositoryConfig) -> Result<String, ConfigError> {
  serde_yaml::to_string(config).map_err(ConfigError::Serialize)
}

/// Replace the package list of every component in every release.
///
/// This is a total replacement: previous entries are dropped, not merged.
pub fn rewrite_packages(config: &mut RepositoryConfig, packages: &[String]) {
  let mut rewritten = 0usize;
  for component in config.components_mut() {
    component.packages = packages.to_vec();
    rewritten += 1;
  }
  debug!(components = rewritten, packages = packages.len(), "rewrote package lists");
}

/// Project staged artifacts onto package paths relative to `base`.
///
/// Artifacts outside `base` keep their absolute path. Separators are always
/// `/`, matching what the builder expects in the document.
pub fn package_paths(artifacts: &[StagedArtifact], base: &Path) -> Vec<String> {
  artifacts
    .iter()
    .map(|artifact| {
      let path = artifact.local_path.strip_prefix(base).unwrap_or(&artifact.local_path);
      to_slash(path)
    })
    .collect()
}

fn to_slash(path: &Path) -> String {
  let mut out = String::new();
  for component in path.components() {
    match component {
      PathComponent::RootDir => out.push('/'),
      PathComponent::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
      other => {
        if !out.is_empty() && !out.ends_with('/') {
          out.push('/');
        }
        out.push_str(&other.as_os_str().to_string_lossy());
      }
    }
  }
  out
}
