//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;

/// Repository config with two releases and three components.
pub const REPOSITORY_CONFIG: &str = r#"apiVersion: v1
kind: Repository
releases:
- name: stable
  origin: Example
  label: Example Apt
  suite: stable
  components:
  - name: main
    packages:
    - old/app_1.0.0_amd64.deb
  - name: contrib
    packages: []
- name: testing
  origin: Example
  label: Example Apt Testing
  suite: testing
  components:
  - name: main
    packages:
    - old/app_1.0.0_amd64.deb
"#;

/// Builder stand-in.
///
/// Appends its arguments to `calls.log`, answers `--version`, and on `build`
/// lists the staging directory into `<output>/published.txt`. Behavior is
/// steered by files next to the script: `build-exit` holds an exit code,
/// `build-hang` makes `build` sleep after touching `build-started`.
const FAKE_BUILDER: &str = r#"#!/bin/sh
here="$(cd "$(dirname "$0")" && pwd)"
echo "$@" >> "$here/calls.log"
case "$1" in
  --version)
    echo "debrepo 0.0.0-test"
    exit 0
    ;;
  build)
    config_dir="$(dirname "$3")"
    mkdir -p "$5"
    ls "$config_dir/downloads" > "$5/published.txt"
    touch "$here/build-started"
    if [ -f "$here/build-hang" ]; then
      exec sleep 30
    fi
    if [ -f "$here/build-exit" ]; then
      exit "$(cat "$here/build-exit")"
    fi
    exit 0
    ;;
esac
exit 64
"#;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the config, the fake
/// builder, and the staging and output directories, plus its own mock API.
pub struct TestEnv {
  pub temp: TempDir,
  pub server: ServerGuard,
  pub config_path: PathBuf,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("repository.yaml");
    std::fs::write(&config_path, REPOSITORY_CONFIG).unwrap();

    let bin = temp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let builder = bin.join("debrepo");
    std::fs::write(&builder, FAKE_BUILDER).unwrap();
    std::fs::set_permissions(&builder, std::fs::Permissions::from_mode(0o755)).unwrap();

    Self {
      temp,
      server: Server::new(),
      config_path,
    }
  }

  pub fn api_url(&self) -> String {
    format!("{}/api/releases/latest", self.server.url())
  }

  pub fn file_url(&self, name: &str) -> String {
    format!("{}/files/{}", self.server.url(), name)
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.temp.path().join("bin")
  }

  pub fn builder_path(&self) -> PathBuf {
    self.bin_dir().join("debrepo")
  }

  pub fn staging_dir(&self) -> PathBuf {
    self.temp.path().join("downloads")
  }

  pub fn output_dir(&self) -> PathBuf {
    self.temp.path().join("repo")
  }

  /// Serve a latest-release document whose links point at this server.
  pub fn serve_release(&mut self, version: &str, links: &[(&str, &str, &str, &str)]) -> Mock {
    let links: Vec<serde_json::Value> = links
      .iter()
      .map(|(name, os, arch, format)| {
        serde_json::json!({
          "display": name,
          "platform": os,
          "kind": "download",
          "link": self.file_url(name),
          "os": os,
          "arch": arch,
          "format": format,
        })
      })
      .collect();
    let body = serde_json::json!({ "id": 7, "version": version, "links": links });

    self
      .server
      .mock("GET", "/api/releases/latest")
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(body.to_string())
      .create()
  }

  pub fn serve_file(&mut self, name: &str, body: &str) -> Mock {
    self
      .server
      .mock("GET", format!("/files/{name}").as_str())
      .with_status(200)
      .with_body(body)
      .create()
  }

  pub fn fail_file(&mut self, name: &str, status: usize) -> Mock {
    self
      .server
      .mock("GET", format!("/files/{name}").as_str())
      .with_status(status)
      .create()
  }

  /// Make the fake builder's `build` exit with `code`.
  pub fn builder_exit(&self, code: i32) {
    std::fs::write(self.bin_dir().join("build-exit"), code.to_string()).unwrap();
  }

  /// Make the fake builder's `build` hang.
  pub fn builder_hang(&self) {
    std::fs::write(self.bin_dir().join("build-hang"), "").unwrap();
  }

  /// Arguments of every builder invocation, one line each.
  pub fn builder_calls(&self) -> Vec<String> {
    read_lines(&self.bin_dir().join("calls.log"))
  }

  /// Files the builder saw in the staging directory.
  pub fn published(&self) -> Vec<String> {
    read_lines(&self.output_dir().join("published.txt"))
  }

  pub fn config_text(&self) -> String {
    std::fs::read_to_string(&self.config_path).unwrap()
  }

  /// `packages` of every component in the saved config.
  pub fn component_packages(&self) -> Vec<Vec<String>> {
    let doc: serde_json::Value = serde_yaml::from_str(&self.config_text()).unwrap();
    doc["releases"]
      .as_array()
      .unwrap()
      .iter()
      .flat_map(|release| release["components"].as_array().unwrap().clone())
      .map(|component| {
        component["packages"]
          .as_array()
          .unwrap()
          .iter()
          .map(|p| p.as_str().unwrap().to_string())
          .collect()
      })
      .collect()
  }

  /// Get a pre-configured `debsync sync` Command.
  pub fn sync_cmd(&self) -> Command {
    let mut cmd = debsync_cmd();
    cmd
      .arg("sync")
      .arg("--config")
      .arg(&self.config_path)
      .arg("--api-url")
      .arg(self.api_url())
      .arg("--builder")
      .arg(self.builder_path());
    cmd
  }

  /// Get a `debsync sync` process builder for tests that signal the child.
  pub fn sync_process(&self) -> std::process::Command {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_debsync"));
    cmd
      .arg("sync")
      .arg("--config")
      .arg(&self.config_path)
      .arg("--api-url")
      .arg(self.api_url())
      .arg("--builder")
      .arg(self.builder_path())
      .stdout(std::process::Stdio::null())
      .stderr(std::process::Stdio::null());
    cmd
  }
}

/// Get a Command for the debsync binary with no inherited configuration.
pub fn debsync_cmd() -> Command {
  let mut cmd: Command = cargo_bin_cmd!("debsync");
  for var in [
    "DEBSYNC_CONFIG",
    "DEBSYNC_STAGING_DIR",
    "DEBSYNC_OUTPUT_DIR",
    "DEBSYNC_API_URL",
    "DEBSYNC_BUILDER",
  ] {
    cmd.env_remove(var);
  }
  cmd
}

fn read_lines(path: &Path) -> Vec<String> {
  match std::fs::read_to_string(path) {
    Ok(content) => content.lines().map(str::to_string).collect(),
    Err(_) => Vec::new(),
  }
}
