mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{add_task, find_task, json_ok, list_tasks, TestHome};

fn find_space<'a>(envelope: &'a Value, name: &str) -> &'a Value {
    envelope["data"]["spaces"]
        .as_array()
        .expect("spaces array")
        .iter()
        .find(|space| space["name"].as_str() == Some(name))
        .expect("space present in listing")
}

#[test]
fn add_creates_space_with_windows() {
    let home = TestHome::init();

    let envelope = json_ok(
        &home,
        &[
            "space",
            "add",
            "gym",
            "--description",
            "training sessions",
            "--window",
            "mon:07:00-09:00",
            "--window",
            "sat:10:00-12:00",
        ],
    );
    assert_eq!(envelope["command"].as_str(), Some("space add"));
    assert_eq!(envelope["data"]["name"].as_str(), Some("gym"));
    assert_eq!(envelope["data"]["windows"].as_u64(), Some(2));

    let listing = json_ok(&home, &["space", "ls"]);
    // Three seeded spaces plus the new one.
    assert_eq!(listing["data"]["total"].as_u64(), Some(4));

    let gym = find_space(&listing, "gym");
    assert_eq!(gym["description"].as_str(), Some("training sessions"));
    let windows = gym["time_constraints"].as_array().expect("windows");
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0]["day"].as_u64(), Some(0));
    assert_eq!(windows[0]["start"].as_str(), Some("07:00:00"));
    assert_eq!(windows[0]["end"].as_str(), Some("09:00:00"));
    assert_eq!(windows[1]["day"].as_u64(), Some(5));
}

#[test]
fn add_duplicate_name_fails_case_insensitively() {
    let home = TestHome::init();
    home.cmd()
        .args(["space", "add", "Work"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("already exists"));
}

#[test]
fn add_rejects_malformed_windows() {
    let home = TestHome::init();

    home.cmd()
        .args(["space", "add", "odd", "--window", "monday:09:00-17:00"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid day 'monday'"));

    home.cmd()
        .args(["space", "add", "odd", "--window", "mon:17:00-09:00"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("end must be after start"));

    home.cmd()
        .args(["space", "add", "odd", "--window", "mon 09:00"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid window"));
}

#[test]
fn edit_renames_but_tasks_keep_the_old_name() {
    let home = TestHome::init();
    let id = add_task(&home, &["Deep focus", "--space", "study"]);

    let envelope = json_ok(&home, &["space", "edit", "study", "--name", "learning"]);
    assert_eq!(envelope["data"]["name"].as_str(), Some("learning"));

    // The task still points at the old name until re-tagged.
    let listing = list_tasks(&home, false);
    assert_eq!(find_task(&listing, &id)["space"].as_str(), Some("study"));
}

#[test]
fn edit_replaces_and_clears_windows() {
    let home = TestHome::init();

    let envelope = json_ok(
        &home,
        &["space", "edit", "association", "--window", "thu:19:00-21:00"],
    );
    assert_eq!(envelope["data"]["windows"].as_u64(), Some(1));

    let listing = json_ok(&home, &["space", "ls"]);
    let association = find_space(&listing, "association");
    let windows = association["time_constraints"].as_array().expect("windows");
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0]["day"].as_u64(), Some(3));
    assert_eq!(windows[0]["start"].as_str(), Some("19:00:00"));

    json_ok(&home, &["space", "edit", "association", "--clear-windows"]);
    let listing = json_ok(&home, &["space", "ls"]);
    assert!(find_space(&listing, "association")["time_constraints"].is_null());
}

#[test]
fn edit_rename_collision_fails() {
    let home = TestHome::init();
    home.cmd()
        .args(["space", "edit", "study", "--name", "WORK"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("already exists"));
}

#[test]
fn edit_without_flags_fails() {
    let home = TestHome::init();
    home.cmd()
        .args(["space", "edit", "study"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("no changes requested"));
}

#[test]
fn rm_leaves_tasks_with_a_dangling_name() {
    let home = TestHome::init();
    let id = add_task(&home, &["Filed under work", "--space", "work"]);

    let envelope = json_ok(&home, &["space", "rm", "work"]);
    assert_eq!(envelope["data"]["name"].as_str(), Some("work"));

    let listing = json_ok(&home, &["space", "ls"]);
    assert_eq!(listing["data"]["total"].as_u64(), Some(2));

    // Existing tasks keep the name; new ones can no longer use it.
    let tasks = list_tasks(&home, false);
    assert_eq!(find_task(&tasks, &id)["space"].as_str(), Some("work"));
    home.cmd()
        .args(["task", "add", "Orphan", "--space", "work"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Space not found"));
}

#[test]
fn spaces_resolve_by_unique_id_prefix() {
    let home = TestHome::init();

    let listing = json_ok(&home, &["space", "ls"]);
    let work_id = find_space(&listing, "work")["id"]
        .as_str()
        .expect("work id")
        .to_string();

    // Seeded ids share their timestamp prefix, so keep most of the id.
    let prefix = &work_id[..24];
    let envelope = json_ok(&home, &["space", "edit", prefix, "--description", "office"]);
    assert_eq!(envelope["data"]["id"].as_str(), Some(work_id.as_str()));

    let listing = json_ok(&home, &["space", "ls"]);
    assert_eq!(
        find_space(&listing, "work")["description"].as_str(),
        Some("office")
    );
}

#[test]
fn unknown_space_reports_not_found() {
    let home = TestHome::init();
    home.cmd()
        .args(["space", "rm", "garage"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Space not found"))
        .stderr(contains("hint: tempo space ls"));
}
