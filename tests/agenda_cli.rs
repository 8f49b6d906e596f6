mod support;

use chrono::NaiveDateTime;

use support::{add_task, json_ok, TestHome};

#[test]
fn agenda_merges_tasks_and_feed_events_in_time_order() {
    let home = TestHome::init();
    add_task(
        &home,
        &[
            "Morning block",
            "--start",
            "2030-06-03T09:00",
            "--end",
            "2030-06-03T10:00",
        ],
    );
    let path = home.write_feed_file(
        "cal",
        r#"[{"title":"dentist","start":"2030-06-03T08:00:00","end":"2030-06-03T08:30:00","description":"checkup"}]"#,
    );
    json_ok(
        &home,
        &["feed", "add", "cal", path.to_str().expect("utf8 path")],
    );

    let agenda = json_ok(&home, &["agenda", "--from", "2030-06-03", "--days", "1"]);
    assert_eq!(agenda["command"].as_str(), Some("agenda"));
    let events = agenda["data"]["events"].as_array().expect("events");
    assert_eq!(events.len(), 2);

    // Earliest first, regardless of which side it came from.
    assert_eq!(events[0]["title"].as_str(), Some("dentist"));
    assert_eq!(events[0]["class"].as_str(), Some("external"));
    assert_eq!(events[0]["editable"].as_bool(), Some(false));
    assert_eq!(events[0]["description"].as_str(), Some("checkup"));
    assert_eq!(events[0]["source"]["type"].as_str(), Some("external"));

    assert_eq!(events[1]["title"].as_str(), Some("Morning block"));
    assert_eq!(events[1]["class"].as_str(), Some("plain"));
    assert_eq!(events[1]["editable"].as_bool(), Some(true));
    assert_eq!(events[1]["source"]["type"].as_str(), Some("task"));
}

#[test]
fn agenda_window_bounds_the_listing() {
    let home = TestHome::init();
    add_task(
        &home,
        &[
            "Inside",
            "--start",
            "2030-06-03T09:00",
            "--end",
            "2030-06-03T10:00",
        ],
    );
    add_task(
        &home,
        &[
            "Next day",
            "--start",
            "2030-06-04T09:00",
            "--end",
            "2030-06-04T10:00",
        ],
    );
    // Straddles midnight into the window, so it still shows.
    add_task(
        &home,
        &[
            "Night shift",
            "--start",
            "2030-06-02T23:30",
            "--end",
            "2030-06-03T00:30",
        ],
    );

    let agenda = json_ok(&home, &["agenda", "--from", "2030-06-03", "--days", "1"]);
    let events = agenda["data"]["events"].as_array().expect("events");
    let titles: Vec<&str> = events
        .iter()
        .map(|event| event["title"].as_str().expect("title"))
        .collect();
    assert_eq!(titles, vec!["Night shift", "Inside"]);

    // Widening the window picks up the next day too.
    let agenda = json_ok(&home, &["agenda", "--from", "2030-06-03", "--days", "2"]);
    assert_eq!(agenda["data"]["total"].as_u64(), Some(3));
}

#[test]
fn frozen_tasks_carry_the_snowflake_marker() {
    let home = TestHome::init();
    let id = add_task(
        &home,
        &[
            "Pinned",
            "--start",
            "2030-06-03T09:00",
            "--end",
            "2030-06-03T10:00",
        ],
    );
    json_ok(&home, &["task", "freeze", &id]);

    let agenda = json_ok(&home, &["agenda", "--from", "2030-06-03", "--days", "1"]);
    let event = &agenda["data"]["events"][0];
    assert_eq!(event["title"].as_str(), Some("\u{2744}\u{fe0f} Pinned"));
    assert_eq!(event["class"].as_str(), Some("frozen"));
    // Frozen blocks the scheduler, not manual edits.
    assert_eq!(event["editable"].as_bool(), Some(true));
}

#[test]
fn completed_tasks_need_the_all_flag() {
    let home = TestHome::init();
    let id = add_task(
        &home,
        &[
            "Wrapped up",
            "--start",
            "2030-06-03T09:00",
            "--end",
            "2030-06-03T10:00",
        ],
    );
    json_ok(&home, &["task", "done", &id]);

    let agenda = json_ok(&home, &["agenda", "--from", "2030-06-03", "--days", "1"]);
    assert_eq!(agenda["data"]["total"].as_u64(), Some(0));

    let agenda = json_ok(
        &home,
        &["agenda", "--from", "2030-06-03", "--days", "1", "--all"],
    );
    let event = &agenda["data"]["events"][0];
    assert_eq!(event["class"].as_str(), Some("completed"));
    assert_eq!(event["editable"].as_bool(), Some(false));
}

#[test]
fn agenda_defaults_to_the_configured_window() {
    let home = TestHome::init();

    let agenda = json_ok(&home, &["agenda", "--from", "2030-06-03"]);
    let from: NaiveDateTime = agenda["data"]["from"]
        .as_str()
        .expect("from")
        .parse()
        .expect("valid datetime");
    let to: NaiveDateTime = agenda["data"]["to"]
        .as_str()
        .expect("to")
        .parse()
        .expect("valid datetime");
    // feeds.window_days defaults to 30.
    assert_eq!(to.signed_duration_since(from).num_days(), 30);
}

#[test]
fn agenda_rejects_malformed_dates() {
    let home = TestHome::init();
    home.cmd()
        .args(["agenda", "--from", "June 3rd"])
        .assert()
        .failure()
        .code(2);
}
