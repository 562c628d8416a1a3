use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn help_text(args: &[&str]) -> String {
    let mut cmd = cargo_bin_cmd!("dracinctl");
    let output = cmd
        .args(args)
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn scan_subcommands_present() {
    let text = help_text(&["scan"]);
    for sub in ["start", "stop", "status", "watch", "logs", "report"] {
        assert!(text.contains(sub), "scan help missing {sub}");
    }

    let start = help_text(&["scan", "start"]);
    assert!(start.contains("--folder"), "scan start help missing --folder");
    assert!(start.contains("--batch-size"));
    assert!(start.contains("--interval-ms"));
    assert!(start.contains("--watch"));
}

#[test]
fn order_export_takes_output_and_filters() {
    let text = help_text(&["orders", "export"]);
    assert!(text.contains("--output"), "orders export help missing --output");
    assert!(text.contains("--status"));
    assert!(text.contains("--from"));
}

#[test]
fn top_level_lists_resources() {
    let text = help_text(&[]);
    for command in ["login", "scan", "users", "orders", "settings", "app"] {
        assert!(text.contains(command), "top-level help missing {command}");
    }
    assert!(text.contains("--json"));
}

#[test]
fn whoami_without_session_fails() {
    let state = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("dracinctl")
        .env("DRACIN_STATE_DIR", state.path())
        .env("ADMIN_API_BASE", "http://127.0.0.1:9/api/admin")
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not signed in"));
}

#[test]
fn scan_logs_are_empty_on_a_fresh_state_dir() {
    let state = tempfile::tempdir().unwrap();
    cargo_bin_cmd!("dracinctl")
        .env("DRACIN_STATE_DIR", state.path())
        .env("ADMIN_API_BASE", "http://127.0.0.1:9/api/admin")
        .args(["scan", "logs", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}
