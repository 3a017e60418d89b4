//! Helpers for driving the built binary in an isolated directory

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run scanwrap inside `dir` with config discovery pointed away from the real home
pub fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_scanwrap"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("SCANWRAP_CONFIG")
        .output()
        .expect("Failed to execute scanwrap")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Write an executable shell script standing in for the NAPS2 console
///
/// It answers `--version`, lists `devices` for `--listdevices`, and otherwise
/// runs `scan_body` with the `--output` value in `$OUT`.
#[cfg(unix)]
pub fn fake_engine(dir: &Path, devices: &str, scan_body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        r#"#!/bin/sh
case "$1" in
  --version) echo "NAPS2 7.4.2"; exit 0 ;;
esac
if [ "$3" = "--listdevices" ]; then
  printf '{devices}'
  exit 0
fi
OUT=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then OUT="$2"; fi
  shift
done
{scan_body}
"#
    );
    let path = dir.join("fake-naps2");
    fs::write(&path, script).expect("Failed to write fake engine");
    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).unwrap();
    path
}
