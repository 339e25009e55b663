//! Check command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, debsync_cmd};

#[test]
fn check_accepts_working_builder() {
  let env = TestEnv::new();

  debsync_cmd()
    .arg("check")
    .arg("--builder")
    .arg(env.builder_path())
    .assert()
    .success()
    .stdout(predicate::str::contains("debrepo 0.0.0-test"))
    .stdout(predicate::str::contains("is available"));

  assert_eq!(env.builder_calls(), vec!["--version"]);
}

#[test]
fn check_rejects_broken_builder() {
  let env = TestEnv::new();
  let broken = env.bin_dir().join("broken");
  std::fs::write(&broken, "#!/bin/sh\nexit 2\n").unwrap();
  {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(&broken, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  debsync_cmd()
    .arg("check")
    .arg("--builder")
    .arg(&broken)
    .assert()
    .code(1)
    .stderr(predicate::str::contains("exit code 2"));
}
