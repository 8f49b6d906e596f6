#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway home directory for one test, with the tempo data
/// directory nested inside it.
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    /// A data directory that `tempo init` has already created and seeded
    pub fn init() -> Self {
        let home = Self::bare();
        home.cmd().arg("init").assert().success();
        home
    }

    /// A data directory that has never been initialized
    pub fn bare() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// A tempo command pointed at this home's data directory
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tempo").expect("binary");
        cmd.env("TEMPO_DATA_DIR", self.data_dir());
        cmd
    }

    /// Write a feed file outside the data directory and return its path
    pub fn write_feed_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(format!("{name}.json"));
        fs::write(&path, contents).expect("write feed file");
        path
    }
}

/// Parse a command's stdout as a JSON envelope
pub fn parse_envelope(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("valid json envelope")
}

/// Run a tempo command with `--json`, assert success, and parse the
/// envelope from stdout
pub fn json_ok(home: &TestHome, args: &[&str]) -> Value {
    let output = home
        .cmd()
        .args(args)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    parse_envelope(&output)
}

/// Create a task through the CLI and return its id
pub fn add_task(home: &TestHome, args: &[&str]) -> String {
    let mut full = vec!["task", "add"];
    full.extend_from_slice(args);
    let envelope = json_ok(home, &full);
    envelope["data"]["id"]
        .as_str()
        .expect("task id in envelope")
        .to_string()
}

/// List tasks through the CLI and return the envelope
pub fn list_tasks(home: &TestHome, all: bool) -> Value {
    if all {
        json_ok(home, &["task", "ls", "--all"])
    } else {
        json_ok(home, &["task", "ls"])
    }
}

/// Find a task by id in a `task ls` envelope
pub fn find_task<'a>(envelope: &'a Value, id: &str) -> &'a Value {
    envelope["data"]["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .find(|task| task["id"].as_str() == Some(id))
        .expect("task present in listing")
}
