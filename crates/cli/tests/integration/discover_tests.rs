//! Discover command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, debsync_cmd};

const LINKS: &[(&str, &str, &str, &str)] = &[
  ("app-2.0.0-x64.exe", "windows", "x86_64", "exe"),
  ("app_2.0.0_amd64.deb", "linux", "x86_64", "deb"),
  ("app-2.0.0-x86_64.tar.gz", "linux", "x86_64", "tar.gz"),
  ("app_2.0.0_arm64.deb", "linux", "aarch64", "deb"),
  ("app_2.0.0_riscv64.deb", "linux", "riscv64", "deb"),
];

#[test]
fn discover_lists_eligible_assets() {
  let mut env = TestEnv::new();
  env.serve_release("2.0.0", LINKS);

  debsync_cmd()
    .arg("discover")
    .arg("--api-url")
    .arg(env.api_url())
    .assert()
    .success()
    .stdout(predicate::str::contains("Latest release: 2.0.0"))
    .stdout(predicate::str::contains("app_2.0.0_amd64.deb"))
    .stdout(predicate::str::contains("app_2.0.0_arm64.deb"))
    .stdout(predicate::str::contains("riscv64").not())
    .stdout(predicate::str::contains(".exe").not());

  assert!(!env.staging_dir().exists());
}

#[test]
fn discover_json_output() {
  let mut env = TestEnv::new();
  env.serve_release("2.0.0", LINKS);

  let output = debsync_cmd()
    .args(["discover", "--output", "json", "--api-url"])
    .arg(env.api_url())
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["version"], "2.0.0");
  let assets = json["assets"].as_array().unwrap();
  assert_eq!(assets.len(), 2);
  assert_eq!(assets[0]["arch"], "amd64");
  assert_eq!(assets[0]["file_name"], "app_2.0.0_amd64.deb");
  assert_eq!(assets[1]["arch"], "arm64");
}

#[test]
fn discover_fails_without_eligible_assets() {
  let mut env = TestEnv::new();
  env.serve_release("2.0.0", &[("app.dmg", "macos", "aarch64", "dmg")]);

  debsync_cmd()
    .arg("discover")
    .arg("--api-url")
    .arg(env.api_url())
    .assert()
    .code(1)
    .stderr(predicate::str::contains("no linux .deb assets"));
}

#[test]
fn discover_rows_show_upstream_arch_and_source() {
  let mut env = TestEnv::new();
  env.serve_release("2.0.0", LINKS);

  debsync_cmd()
    .arg("discover")
    .arg("--api-url")
    .arg(env.api_url())
    .assert()
    .success()
    .stdout(predicate::str::contains(format!("Source: {}", env.api_url())))
    .stdout(predicate::str::contains("Assets: 2"))
    .stdout(predicate::str::contains(format!(
      "amd64 (x86_64) app_2.0.0_amd64.deb → {}",
      env.file_url("app_2.0.0_amd64.deb")
    )))
    .stdout(predicate::str::contains("arm64 (aarch64) app_2.0.0_arm64.deb"));
}
