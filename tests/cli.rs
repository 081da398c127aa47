//! Command-line behaviour of the `webload` binary.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

use common::{spawn_target, Behaviour, TEN_MIB};

fn webload() -> Command {
    Command::cargo_bin("webload").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    webload()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_init_writes_config_and_refuses_overwrite() {
    let tmp = tempfile::tempdir().unwrap();

    webload()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let content = std::fs::read_to_string(tmp.path().join("webload.toml")).unwrap();
    assert!(content.contains("[settings]"));
    assert!(content.contains("http://localhost:8081/test-file"));

    webload()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    webload()
        .current_dir(tmp.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_run_with_missing_config_fails() {
    let tmp = tempfile::tempdir().unwrap();
    webload()
        .current_dir(tmp.path())
        .args(["run", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_run_rejects_invalid_config() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("webload.toml"),
        "[settings]\nconcurrent_requests = 0\n",
    )
    .unwrap();

    webload()
        .current_dir(tmp.path())
        .args(["run", "--no-report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"))
        .stderr(predicate::str::contains("concurrent_requests"));
}

#[test]
fn test_run_against_unreachable_server_prints_empty_summary() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("webload.toml"),
        "[settings]\nnum_requests = 2\nconcurrent_requests = 2\ntimeout_ms = 2000\n\n\
         [[server]]\nname = \"down\"\nurl = \"http://127.0.0.1:1/test-file\"\n",
    )
    .unwrap();

    webload()
        .current_dir(tmp.path())
        .args(["run", "--skip-preflight", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Starting load test with 2 total requests per server",
        ))
        .stdout(predicate::str::contains("Completed 2 requests per server"))
        .stdout(predicate::str::contains("No server completed"));

    let reports: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with("load_test_stats_"))
        .collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn test_run_warns_about_wrong_payload_size() {
    let good = spawn_target(Behaviour::ok(TEN_MIB));
    let short = spawn_target(Behaviour::ok(10));

    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(
        tmp.path().join("webload.toml"),
        format!(
            "[settings]\nnum_requests = 1\nconcurrent_requests = 1\ntimeout_ms = 10000\n\n\
             [[server]]\nname = \"good\"\nurl = \"{}\"\n\n\
             [[server]]\nname = \"short\"\nurl = \"{}\"\n",
            good.url(),
            short.url()
        ),
    )
    .unwrap();

    webload()
        .current_dir(tmp.path())
        .args(["run", "--no-report", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "WARNING: short may not be serving the correct file size!",
        ))
        .stdout(predicate::str::contains("WARNING: good").not())
        .stdout(predicate::str::contains("SHORT:"));
}
