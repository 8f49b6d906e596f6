mod support;

use support::{add_task, json_ok, TestHome};

#[test]
fn overview_counts_open_scheduled_hours_and_urgent() {
    let home = TestHome::init();
    add_task(
        &home,
        &[
            "Scheduled",
            "--duration",
            "90",
            "--start",
            "2030-06-03T09:00",
            "--end",
            "2030-06-03T10:30",
        ],
    );
    add_task(&home, &["Untimed"]);
    add_task(&home, &["Urgent", "--priority", "9"]);
    let done = add_task(&home, &["Done"]);
    json_ok(&home, &["task", "done", &done]);

    let envelope = json_ok(&home, &["overview"]);
    assert_eq!(envelope["command"].as_str(), Some("overview"));
    let stats = &envelope["data"]["stats"];
    assert_eq!(stats["total"].as_u64(), Some(3));
    assert_eq!(stats["scheduled"].as_u64(), Some(1));
    // Only explicit durations count toward planned hours.
    assert_eq!(stats["hours_planned"].as_f64(), Some(1.5));
    assert_eq!(stats["urgent"].as_u64(), Some(1));
}

#[test]
fn overview_sizes_spaces_by_blended_share() {
    let home = TestHome::init();
    add_task(&home, &["First", "--space", "work"]);
    add_task(&home, &["Second", "--space", "work", "--duration", "120"]);
    add_task(&home, &["Floating"]);

    let envelope = json_ok(&home, &["overview"]);
    let spaces = envelope["data"]["spaces"].as_array().expect("spaces");

    // Empty buckets drop out; busiest bucket first, Unassigned catches
    // the spaceless task.
    assert_eq!(spaces.len(), 2);
    assert_eq!(spaces[0]["name"].as_str(), Some("work"));
    assert_eq!(spaces[0]["task_count"].as_u64(), Some(2));
    assert_eq!(spaces[0]["total_minutes"].as_u64(), Some(180));
    assert_eq!(spaces[0]["total_hours"].as_f64(), Some(3.0));
    assert_eq!(spaces[1]["name"].as_str(), Some("Unassigned"));
    assert_eq!(spaces[1]["task_count"].as_u64(), Some(1));
    assert_eq!(spaces[1]["total_hours"].as_f64(), Some(1.0));

    // Ratios cover the whole pie and sizes stay inside the layout band.
    let ratios: f64 = spaces
        .iter()
        .map(|metric| metric["size_ratio"].as_f64().expect("ratio"))
        .sum();
    assert!((ratios - 1.0).abs() < 1e-9);
    for metric in spaces {
        let size = metric["size"].as_f64().expect("size");
        assert!((150.0..=550.0).contains(&size));
    }
    let work = spaces[0]["size"].as_f64().expect("size");
    let unassigned = spaces[1]["size"].as_f64().expect("size");
    assert!(work > unassigned);
}

#[test]
fn overview_on_a_fresh_install_is_empty() {
    let home = TestHome::init();

    let envelope = json_ok(&home, &["overview"]);
    let stats = &envelope["data"]["stats"];
    assert_eq!(stats["total"].as_u64(), Some(0));
    assert_eq!(stats["scheduled"].as_u64(), Some(0));
    assert_eq!(stats["hours_planned"].as_f64(), Some(0.0));
    assert_eq!(stats["urgent"].as_u64(), Some(0));
    assert_eq!(
        envelope["data"]["spaces"].as_array().expect("spaces").len(),
        0
    );
}
