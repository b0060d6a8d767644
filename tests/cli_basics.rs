use assert_cmd::{cargo}; // handy crate for testing CLIs
use predicates::prelude::*;

/// A command with no ambient action inputs or config file leaking in.
fn descbot() -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!();
    let home = std::env::temp_dir().join("descbot-cli-tests-home");
    cmd.env("HOME", &home)
        .env("XDG_CONFIG_HOME", &home)
        .env_remove("DESCBOT_CONFIG")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_ACTIONS")
        .env_remove("GITHUB_OUTPUT");
    for input in [
        "INPUT_GITHUB_TOKEN",
        "INPUT_PR_NUMBER",
        "INPUT_PROVIDER",
        "INPUT_API_KEY",
        "INPUT_MODEL",
        "INPUT_UPDATE_MODE",
        "INPUT_GENERATION_MARKER",
        "INPUT_MAX_DIFF_SIZE",
        "INPUT_EXCLUDE_PATTERNS",
        "INPUT_MAX_TOKENS",
        "INPUT_TEMPERATURE",
    ] {
        cmd.env_remove(input);
    }
    cmd
}

#[test]
fn prints_help() {
    descbot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--update-mode"));
}

#[test]
fn prints_version() {
    descbot()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn rejects_unknown_update_mode() {
    descbot()
        .args(["--no-model", "--repo", "octo/hello", "--pr", "1", "--github-token", "t"])
        .args(["--update-mode", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"))
        .stderr(predicate::str::contains("sometimes"));
}

#[test]
fn rejects_out_of_range_max_tokens() {
    descbot()
        .args(["--no-model", "--repo", "octo/hello", "--pr", "1", "--github-token", "t"])
        .args(["--max-tokens", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_tokens"));
}

#[test]
fn requires_a_github_token() {
    descbot()
        .args(["--no-model", "--repo", "octo/hello", "--pr", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GitHub token is required"));
}

#[test]
fn annotates_failures_under_actions() {
    descbot()
        .env("GITHUB_ACTIONS", "true")
        .args(["--no-model", "--repo", "octo/hello", "--pr", "1", "--github-token", "t"])
        .args(["--generation-marker", "not-a-comment"])
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("::error::configuration error"));
}
