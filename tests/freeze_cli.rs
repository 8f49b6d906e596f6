mod support;

use predicates::str::contains;

use support::{add_task, find_task, json_ok, list_tasks, TestHome};

fn add_scheduled(home: &TestHome, title: &str, start: &str, end: &str) -> String {
    add_task(home, &[title, "--start", start, "--end", end])
}

#[test]
fn freeze_toggles_flag() {
    let home = TestHome::init();
    let id = add_scheduled(&home, "Pinned", "2030-06-01T09:00", "2030-06-01T10:00");

    let envelope = json_ok(&home, &["task", "freeze", &id]);
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(true));

    let envelope = json_ok(&home, &["task", "freeze", &id]);
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(false));
}

#[test]
fn move_updates_slot_and_freezes() {
    let home = TestHome::init();
    let id = add_scheduled(&home, "Drag me", "2030-06-01T09:00", "2030-06-01T10:00");

    let envelope = json_ok(
        &home,
        &[
            "task",
            "move",
            &id,
            "--start",
            "2030-06-02T14:00",
            "--end",
            "2030-06-02T15:00",
        ],
    );
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(true));

    let listing = list_tasks(&home, false);
    let task = find_task(&listing, &id);
    assert_eq!(task["scheduled_start"].as_str(), Some("2030-06-02T14:00:00"));
    assert_eq!(task["scheduled_end"].as_str(), Some("2030-06-02T15:00:00"));
    assert_eq!(task["frozen"].as_bool(), Some(true));
}

#[test]
fn move_no_freeze_leaves_flag_alone() {
    let home = TestHome::init();
    let id = add_scheduled(&home, "Loose", "2030-06-01T09:00", "2030-06-01T10:00");

    let envelope = json_ok(
        &home,
        &[
            "task",
            "move",
            &id,
            "--start",
            "2030-06-01T11:00",
            "--end",
            "2030-06-01T12:00",
            "--no-freeze",
        ],
    );
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(false));

    // An already frozen task stays frozen through a bypassed move.
    json_ok(&home, &["task", "freeze", &id]);
    let envelope = json_ok(
        &home,
        &[
            "task",
            "move",
            &id,
            "--start",
            "2030-06-01T13:00",
            "--end",
            "2030-06-01T14:00",
            "--no-freeze",
        ],
    );
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(true));
}

#[test]
fn move_unscheduled_task_assigns_slot() {
    let home = TestHome::init();
    let id = add_task(&home, &["Placeless"]);

    json_ok(
        &home,
        &[
            "task",
            "move",
            &id,
            "--start",
            "2030-06-01T09:00",
            "--end",
            "2030-06-01T10:00",
        ],
    );

    let listing = list_tasks(&home, false);
    let task = find_task(&listing, &id);
    assert_eq!(task["scheduled_start"].as_str(), Some("2030-06-01T09:00:00"));
}

#[test]
fn resize_snaps_duration_to_quarter_hours() {
    let home = TestHome::init();
    let id = add_scheduled(&home, "Stretch", "2030-06-01T09:00", "2030-06-01T10:00");

    // 09:00 to 10:40 spans 100 minutes, which snaps to 105.
    let envelope = json_ok(
        &home,
        &["task", "resize", &id, "--end", "2030-06-01T10:40"],
    );
    assert_eq!(envelope["data"]["duration_minutes"].as_u64(), Some(105));
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(true));

    let listing = list_tasks(&home, false);
    let task = find_task(&listing, &id);
    assert_eq!(task["scheduled_end"].as_str(), Some("2030-06-01T10:40:00"));
    assert_eq!(task["estimated_duration"].as_u64(), Some(105));
}

#[test]
fn resize_unscheduled_task_fails() {
    let home = TestHome::init();
    let id = add_task(&home, &["Bare"]);

    home.cmd()
        .args(["task", "resize", &id, "--end", "2030-06-01T10:00"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("not scheduled"));
}

#[test]
fn freeze_day_covers_every_task_scheduled_that_day() {
    let home = TestHome::init();
    let a = add_scheduled(&home, "Morning", "2030-06-01T09:00", "2030-06-01T10:00");
    let b = add_scheduled(&home, "Noon", "2030-06-01T12:00", "2030-06-01T13:00");
    let c = add_scheduled(&home, "Done deal", "2030-06-01T15:00", "2030-06-01T16:00");
    let other = add_scheduled(&home, "Next day", "2030-06-02T09:00", "2030-06-02T10:00");
    json_ok(&home, &["task", "done", &c]);

    let envelope = json_ok(&home, &["task", "freeze-day", "2030-06-01"]);
    assert_eq!(envelope["data"]["affected"].as_u64(), Some(3));
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(true));

    let listing = list_tasks(&home, true);
    assert_eq!(find_task(&listing, &a)["frozen"].as_bool(), Some(true));
    assert_eq!(find_task(&listing, &b)["frozen"].as_bool(), Some(true));
    assert_eq!(find_task(&listing, &c)["frozen"].as_bool(), Some(true));
    assert_eq!(find_task(&listing, &other)["frozen"].as_bool(), Some(false));
}

#[test]
fn freeze_day_thaws_when_all_already_frozen() {
    let home = TestHome::init();
    add_scheduled(&home, "One", "2030-06-01T09:00", "2030-06-01T10:00");
    add_scheduled(&home, "Two", "2030-06-01T12:00", "2030-06-01T13:00");

    json_ok(&home, &["task", "freeze-day", "2030-06-01"]);
    let envelope = json_ok(&home, &["task", "freeze-day", "2030-06-01"]);

    assert_eq!(envelope["data"]["affected"].as_u64(), Some(2));
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(false));
}

#[test]
fn freeze_day_mixed_flags_freeze_the_rest() {
    let home = TestHome::init();
    let a = add_scheduled(&home, "Already", "2030-06-01T09:00", "2030-06-01T10:00");
    let b = add_scheduled(&home, "Not yet", "2030-06-01T12:00", "2030-06-01T13:00");
    json_ok(&home, &["task", "freeze", &a]);

    let envelope = json_ok(&home, &["task", "freeze-day", "2030-06-01"]);
    assert_eq!(envelope["data"]["frozen"].as_bool(), Some(true));

    let listing = list_tasks(&home, false);
    assert_eq!(find_task(&listing, &a)["frozen"].as_bool(), Some(true));
    assert_eq!(find_task(&listing, &b)["frozen"].as_bool(), Some(true));
}

#[test]
fn freeze_day_without_matches_reports_zero() {
    let home = TestHome::init();
    add_task(&home, &["Unscheduled"]);

    let envelope = json_ok(&home, &["task", "freeze-day", "2031-01-01"]);
    assert_eq!(envelope["data"]["affected"].as_u64(), Some(0));
    assert!(envelope["data"]["frozen"].is_null());

    home.cmd()
        .args(["task", "freeze-day", "2031-01-01"])
        .assert()
        .success()
        .stdout(contains("Nothing scheduled"));
}
