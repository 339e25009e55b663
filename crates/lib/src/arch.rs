//! Architecture mapping between upstream release metadata and Debian.
//!
//! The release API names CPU architectures the way toolchains do
//! (`x86_64`, `aarch64`); Debian repositories use their own names
//! (`amd64`, `arm64`). Anything outside the known set is an upstream
//! contract change and is rejected rather than guessed at.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Upstream architecture identifiers this tool knows how to publish.
pub const SUPPORTED_UPSTREAM: &[&str] = &["x86_64", "aarch64"];

/// Debian architecture variants a synced repository can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  Amd64,
  Arm64,
}

/// Errors produced when translating architecture identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchError {
  /// The upstream identifier is not one of [`SUPPORTED_UPSTREAM`].
  #[error("unsupported upstream architecture '{0}' (expected one of: x86_64, aarch64)")]
  Unsupported(String),

  /// The Debian identifier is not one of `amd64`, `arm64`.
  #[error("unknown debian architecture '{0}'")]
  UnknownDebian(String),
}

impl Arch {
  /// Returns the Debian identifier for this architecture
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Amd64 => "amd64",
      Self::Arm64 => "arm64",
    }
  }

  /// Returns the upstream identifier this architecture was mapped from
  pub fn upstream(&self) -> &'static str {
    match self {
      Self::Amd64 => "x86_64",
      Self::Arm64 => "aarch64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Arch {
  type Err = ArchError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "amd64" => Ok(Self::Amd64),
      "arm64" => Ok(Self::Arm64),
      other => Err(ArchError::UnknownDebian(other.to_string())),
    }
  }
}

/// Map an upstream architecture identifier to its Debian counterpart.
///
/// # Errors
///
/// Returns [`ArchError::Unsupported`] carrying the offending value for any
/// identifier outside [`SUPPORTED_UPSTREAM`].
pub fn map_arch(upstream: &str) -> Result<Arch, ArchError> {
  match upstream {
    "x86_64" => Ok(Arch::Amd64),
    "aarch64" => Ok(Arch::Arm64),
    other => Err(ArchError::Unsupported(other.to_string())),
  }
}
