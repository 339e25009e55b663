//! Test utilities for debsync-lib.
//!
//! Fixtures for release API bodies and config documents, plus a scripted
//! [`CommandRunner`] standing in for the repository builder.

use std::io;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::builder::CommandRunner;
use crate::release::UpstreamLink;

/// A config document with two releases, three components, and keys this
/// tool does not model.
pub const SAMPLE_CONFIG: &str = r#"apiVersion: v1
kind: Repository
signing:
  key: ABCDEF0123456789
  keyring: /etc/apt/keyrings/example.gpg
releases:
- name: stable
  origin: Example
  label: Example Apt
  suite: stable
  architectures:
  - amd64
  - arm64
  components:
  - name: main
    packages:
    - old/a.deb
  - name: extras
    packages: []
- name: beta
  origin: Example
  label: Example Apt Beta
  suite: beta
  components:
  - name: main
    packages:
    - old/beta.deb
"#;

/// Build an upstream link record.
pub fn link(url: &str, os: &str, arch: &str, format: &str) -> UpstreamLink {
  UpstreamLink {
    display: format!("{os} {arch} {format}"),
    platform: os.to_string(),
    kind: "download".to_string(),
    link: url.to_string(),
    os: os.to_string(),
    arch: arch.to_string(),
    format: format.to_string(),
    hash: None,
  }
}

/// Render a latest-release API body with the given `(url, os, arch, format)` links.
pub fn release_json(version: &str, links: &[(&str, &str, &str, &str)]) -> String {
  let links: Vec<serde_json::Value> = links
    .iter()
    .map(|(url, os, arch, format)| {
      serde_json::json!({
        "display": format!("{os} {arch}"),
        "platform": os,
        "kind": "download",
        "link": url,
        "os": os,
        "arch": arch,
        "format": format,
      })
    })
    .collect();

  serde_json::json!({
    "id": 42,
    "version": version,
    "released_at": "2024-05-01T12:00:00Z",
    "links": links,
  })
  .to_string()
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Scripted stand-in for the repository builder.
///
/// Records the arguments of every invocation. `--version` and `build`
/// exit with configurable codes; `build` can also hang until dropped.
#[derive(Debug)]
pub struct FakeRunner {
  calls: Mutex<Vec<Vec<String>>>,
  missing: bool,
  version_exit: Option<i32>,
  build_exit: Option<i32>,
  hang_on_build: bool,
  build_started: Arc<Notify>,
}

impl FakeRunner {
  pub fn new() -> Self {
    Self {
      calls: Mutex::new(Vec::new()),
      missing: false,
      version_exit: Some(0),
      build_exit: Some(0),
      hang_on_build: false,
      build_started: Arc::new(Notify::new()),
    }
  }

  /// A runner whose program is not installed.
  pub fn missing() -> Self {
    Self {
      missing: true,
      ..Self::new()
    }
  }

  pub fn version_exit(mut self, code: Option<i32>) -> Self {
    self.version_exit = code;
    self
  }

  pub fn build_exit(mut self, code: Option<i32>) -> Self {
    self.build_exit = code;
    self
  }

  /// Make `build` never finish.
  pub fn hang_on_build(mut self) -> Self {
    self.hang_on_build = true;
    self
  }

  /// Notified each time `build` is invoked.
  pub fn build_started(&self) -> Arc<Notify> {
    Arc::clone(&self.build_started)
  }

  /// Arguments of every invocation so far.
  pub fn calls(&self) -> Vec<Vec<String>> {
    self.calls.lock().unwrap().clone()
  }
}

impl CommandRunner for FakeRunner {
  async fn run(&self, _program: &str, args: &[String]) -> io::Result<Option<i32>> {
    self.calls.lock().unwrap().push(args.to_vec());

    if self.missing {
      return Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory"));
    }

    match args.first().map(String::as_str) {
      Some("build") => {
        self.build_started.notify_one();
        if self.hang_on_build {
          std::future::pending::<()>().await;
        }
        Ok(self.build_exit)
      }
      _ => Ok(self.version_exit),
    }
  }
}
