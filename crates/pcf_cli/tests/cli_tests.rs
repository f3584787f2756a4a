//! CLI contract tests: every command prints one JSON document and errors
//! come back as `{"ok": false, ...}` with a failing exit code.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("pcf").unwrap()
}

fn run_json(args: &[&str]) -> Value {
    let output = cli().args(args).output().unwrap();
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help_lists_commands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("limit"))
        .stdout(predicate::str::contains("dynamics"))
        .stdout(predicate::str::contains("normalize"))
        .stdout(predicate::str::contains("fold"));
}

#[test]
fn test_limit_four_over_pi() {
    let json = run_json(&["limit", "-a", "2n+1", "-b", "n^2", "--depth", "100"]);
    assert_eq!(json["ok"], true);
    assert_eq!(json["pcf"]["display"], "PCF(2*n + 1, n^2)");
    assert_eq!(json["depth"], 100);
    let decimal = json["limit"]["decimal"].as_str().unwrap();
    assert!(decimal.starts_with("1.2732395447351626"), "{}", decimal);
    assert!(json["limit"]["precision"].as_u64().unwrap() >= 70);
}

#[test]
fn test_limit_exact_and_custom_variable() {
    let json = run_json(&[
        "limit", "-a", "2k+1", "-b", "k^2", "--var", "k", "--depth", "2", "--exact",
    ]);
    assert_eq!(json["exact"], true);
    assert_eq!(json["limit"]["value"], "24/19");
}

#[test]
fn test_dynamics_summary() {
    let json = run_json(&["dynamics", "-a", "1", "-b", "1", "--depth", "30"]);
    let delta = json["summary"]["delta"].as_f64().unwrap();
    assert!((delta - 1.057).abs() < 1e-2, "delta = {}", delta);
    assert!(json.get("report").is_none());
}

#[test]
fn test_dynamics_all_metrics() {
    let json = run_json(&["dynamics", "-a", "2n+1", "-b", "n^2", "--depth", "64", "--all"]);
    let report = &json["report"];
    assert_eq!(report["depth"], 64);
    assert!(report["convergence"]["b"].is_number());
    assert!(report["q_reduced"]["a"].is_number());
    assert!(report["delta"].as_f64().unwrap() < 0.0);
}

#[test]
fn test_normalize_rational_pcf() {
    let json = run_json(&["normalize", "-a", "(2n+1)/2", "-b", "(n-1)/4"]);
    assert_eq!(json["inflation"], "2");
    assert_eq!(json["shift"], 1);
    assert_eq!(json["zeros"]["b_num"][0], "1");
    assert_eq!(json["pcf"]["display"], "PCF(2*n + 3, n)");
}

#[test]
fn test_fold_transports_limit() {
    let json = run_json(&["fold", "-a", "2n+1", "-b", "n^2", "--factor", "2", "--depth", "200"]);
    assert_eq!(json["folded"]["a"], "48*n^3 + 36*n^2 - 2*n - 2");
    assert_eq!(json["eta"], "2");
    let decimal = json["folded_limit"]["decimal"].as_str().unwrap();
    assert!(decimal.starts_with("-1.909859317102744"), "{}", decimal);
}

#[test]
fn test_invalid_factor_is_json_error() {
    let output = cli()
        .args(["fold", "-a", "1", "-b", "1", "--factor", "0"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["ok"], false);
    assert!(json["error"].as_str().unwrap().contains("factor"));
}

#[test]
fn test_parse_error_is_json_error() {
    cli()
        .args(["limit", "-a", "2x+1", "-b", "n^2"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"ok\": false"))
        .stdout(predicate::str::contains("cannot build PCF"));
}

#[test]
fn test_strict_rejects_truncating_pcf() {
    cli()
        .args(["limit", "-a", "3", "-b", "n-1", "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("b vanishes at n = 1"));
}

#[test]
fn test_config_file_sets_default_depth() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.toml");
    fs::write(&path, "[evaluation]\ndepth = 3\n").unwrap();
    let json = run_json(&[
        "--config",
        path.to_str().unwrap(),
        "limit",
        "-a",
        "2n+1",
        "-b",
        "n^2",
        "--exact",
    ]);
    assert_eq!(json["depth"], 3);
    assert_eq!(json["limit"]["value"], "51/40");
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    let json = run_json(&[
        "--config",
        "/nonexistent/engine.toml",
        "limit",
        "-a",
        "1",
        "-b",
        "1",
        "--depth",
        "10",
    ]);
    assert_eq!(json["ok"], true);
}
