//! Repository configuration document model.
//!
//! ```yaml
//! apiVersion: v1
//! kind: Repository
//! releases:
//! - name: stable
//!   origin: Example
//!   label: Example
//!   suite: stable
//!   components:
//!   - name: main
//!     packages:
//!     - downloads/app_1.2.3_amd64.deb
//! ```
//!
//! Keys this tool does not interpret are kept in `extra` so a load/save round
//! trip never drops operator-authored settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level repository configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub api_version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
  pub releases: Vec<Release>,
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A published distribution within the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub origin: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub suite: Option<String>,
  #[serde(default)]
  pub components: Vec<Component>,
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A component of a release and the package files it publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
  pub name: String,
  /// Package file paths, relative to the configuration document.
  #[serde(default)]
  pub packages: Vec<String>,
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl RepositoryConfig {
  /// Iterate over every component of every release.
  pub fn components(&self) -> impl Iterator<Item = &Component> {
    self.releases.iter().flat_map(|release| release.components.iter())
  }

  /// Mutable variant of [`RepositoryConfig::components`].
  pub fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
    self
      .releases
      .iter_mut()
      .flat_map(|release| release.components.iter_mut())
  }
}
