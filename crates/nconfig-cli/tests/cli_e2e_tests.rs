//! CLI end-to-end tests that invoke the compiled `nconfig` binary.
//!
//! These tests use `env!("CARGO_BIN_EXE_nconfig")` to locate the binary
//! and run it against temporary environment trees. Resolution is pinned
//! through `--default` so the tests do not depend on the machine's
//! network identity (none of the fixture hosts match it).

use std::process::Command;
use tempfile::TempDir;

fn nconfig_bin() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_nconfig"))
}

fn run(dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(nconfig_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to execute nconfig binary")
}

/// Lay out an nconfig.environments root with a definitions file and
/// per-environment documents.
fn setup(envs: &[(&str, &str)], definitions: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("nconfig.environments");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("environments.toml"), definitions).unwrap();
    for (name, body) in envs {
        std::fs::write(root.join(format!("{name}.toml")), body).unwrap();
    }
    dir
}

#[test]
fn bare_invocation_prints_environment() {
    let dir = setup(
        &[("dev", "[settings]\nA = \"1\"\n")],
        "default = \"dev\"\n",
    );
    let out = run(dir.path(), &[]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "dev");
}

#[test]
fn setting_command_prints_value() {
    let dir = setup(
        &[("dev", "[settings]\nGreeting = \"hello\"\n")],
        "default = \"dev\"\n",
    );
    let out = run(dir.path(), &["setting", "Greeting"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hello");
}

#[test]
fn missing_setting_fails_with_message() {
    let dir = setup(&[("dev", "")], "default = \"dev\"\n");
    let out = run(dir.path(), &["setting", "Nope"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Nope"));
}

#[test]
fn connection_command_prints_value() {
    let dir = setup(
        &[(
            "dev",
            "[[connection_strings]]\nname = \"db\"\nconnection_string = \"server=localhost\"\n",
        )],
        "default = \"dev\"\n",
    );
    let out = run(dir.path(), &["connection", "db"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout).trim(),
        "server=localhost"
    );
}

#[test]
fn default_flag_overrides_fallback() {
    let dir = setup(
        &[
            ("dev", "[settings]\nA = \"1\"\n"),
            ("local", "[settings]\nA = \"x\"\n"),
        ],
        "default = \"dev\"\n",
    );
    let out = run(dir.path(), &["--default", "local"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "local");
}

#[test]
fn validate_reports_in_sync() {
    let dir = setup(
        &[
            ("dev", "[settings]\nA = \"1\"\n"),
            ("stage", "[settings]\nA = \"9\"\n"),
        ],
        "default = \"dev\"\nsomehost = \"stage\"\n",
    );
    let out = run(dir.path(), &["validate"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("in sync"));
}

#[test]
fn validate_exits_nonzero_on_discrepancies() {
    let dir = setup(
        &[
            ("dev", "[settings]\nA = \"1\"\nB = \"2\"\n"),
            ("stage", "[settings]\nA = \"9\"\n"),
        ],
        "default = \"dev\"\nsomehost = \"stage\"\n",
    );
    let out = run(dir.path(), &["validate"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("stage"));
    assert!(stderr.contains("\"B\""));
}

#[test]
fn missing_root_is_a_fatal_error() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["--start-dir", dir.path().to_str().unwrap()]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nconfig.environments"));
}

#[test]
fn candidates_never_fails() {
    let dir = TempDir::new().unwrap();
    // No environments root needed: candidates come from the machine.
    let out = run(dir.path(), &["candidates"]);
    assert!(out.status.success());
}
