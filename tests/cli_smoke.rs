mod support;

use assert_cmd::Command;
use predicates::str::contains;

use support::TestHome;

#[test]
fn tempo_help_works() {
    Command::cargo_bin("tempo")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Schedule reconciliation"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "init", "task", "space", "feed", "agenda", "plan", "log", "overview",
    ];

    for cmd in subcommands {
        Command::cargo_bin("tempo")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn commands_require_init() {
    let home = TestHome::bare();
    home.cmd()
        .args(["task", "ls"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("not initialized"))
        .stderr(contains("hint: tempo init"));
}

#[test]
fn json_error_envelope_has_kind_and_next_steps() {
    let home = TestHome::bare();
    let output = home
        .cmd()
        .args(["task", "ls", "--json"])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let envelope = support::parse_envelope(&output);
    assert_eq!(envelope["schema_version"].as_str(), Some("tempo.v1"));
    assert_eq!(envelope["command"].as_str(), Some("task ls"));
    assert_eq!(envelope["status"].as_str(), Some("error"));
    assert_eq!(envelope["error"]["kind"].as_str(), Some("user_error"));
    assert_eq!(envelope["error"]["code"].as_i64(), Some(2));
    assert_eq!(envelope["next_steps"][0].as_str(), Some("tempo init"));
}

#[test]
fn quiet_suppresses_human_output() {
    let home = TestHome::init();
    let output = home
        .cmd()
        .args(["task", "ls", "--quiet"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert!(output.is_empty());
}
