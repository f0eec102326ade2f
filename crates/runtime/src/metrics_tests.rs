use super::*;

#[test]
fn record_event_ingested_tallies_totals_and_breakdowns() {
    let metrics = Metrics::new();
    metrics.record_event_ingested("git", "commit");
    metrics.record_event_ingested("git", "commit");
    metrics.record_event_ingested("shell", "command");

    let summary = metrics.get_summary();
    assert_eq!(summary.events_ingested, 3);
    assert_eq!(summary.events_by_source["git"], 2);
    assert_eq!(summary.events_by_source["shell"], 1);
    assert_eq!(summary.events_by_type["commit"], 2);
}

#[test]
fn per_source_tally_is_bounded_by_max_tracked_keys() {
    let metrics = Metrics::new();
    for i in 0..(MAX_TRACKED_KEYS + 10) {
        metrics.record_event_ingested(&format!("source-{i}"), "event");
    }

    let summary = metrics.get_summary();
    assert!(summary.events_by_source.len() <= MAX_TRACKED_KEYS);
    assert!(!summary.events_by_source.contains_key("source-0"));
}

#[test]
fn plugin_with_no_start_is_reported_stopped() {
    let metrics = Metrics::new();
    metrics.record_plugin_error("orphan", "boom");

    let summary = metrics.get_summary();
    assert_eq!(summary.plugins["orphan"].status, "stopped");
}

#[test]
fn plugin_started_with_a_recent_error_is_running_with_errors() {
    let metrics = Metrics::new();
    metrics.record_plugin_start("flaky");
    metrics.record_plugin_error("flaky", "transient failure");

    let summary = metrics.get_summary();
    assert_eq!(summary.plugins["flaky"].status, "running (with errors)");
    assert_eq!(summary.plugins["flaky"].error_count, 1);
}

#[test]
fn plugin_started_with_no_errors_is_running() {
    let metrics = Metrics::new();
    metrics.record_plugin_start("clean");

    let summary = metrics.get_summary();
    assert_eq!(summary.plugins["clean"].status, "running");
}

#[test]
fn restart_increments_the_restart_counter() {
    let metrics = Metrics::new();
    metrics.record_plugin_start("p");
    metrics.record_plugin_restart("p");
    metrics.record_plugin_restart("p");

    let summary = metrics.get_summary();
    assert_eq!(summary.plugins["p"].restarts, 2);
}

#[test]
fn cleanup_old_buckets_does_not_panic_on_an_empty_metrics_instance() {
    let metrics = Metrics::new();
    metrics.cleanup_old_buckets();
    assert_eq!(metrics.get_summary().events_ingested, 0);
}

#[test]
fn update_system_metrics_is_reflected_in_copy_and_get_summary() {
    let metrics = Metrics::new();
    metrics.update_system_metrics(3, 4096, 10);

    let snapshot = metrics.copy();
    assert_eq!(snapshot.queue_depth, 3);
    assert_eq!(snapshot.db_size, 4096);
    assert_eq!(snapshot.event_count, 10);

    let summary = metrics.get_summary();
    assert_eq!(summary.queue_depth, 3);
    assert_eq!(summary.db_size, 4096);
    assert_eq!(summary.event_count, 10);
}

#[test]
fn copy_is_independent_of_mutations_made_after_it_was_taken() {
    let metrics = Metrics::new();
    metrics.record_event_ingested("git", "commit");

    let snapshot = metrics.copy();
    metrics.record_event_ingested("git", "commit");
    metrics.record_event_ingested("shell", "command");

    assert_eq!(snapshot.events_ingested, 1);
    assert_eq!(metrics.copy().events_ingested, 3);
}

#[test]
fn events_ingested_equals_the_sum_of_bucket_totals() {
    let metrics = Metrics::new();
    metrics.record_event_ingested("git", "commit");
    metrics.record_event_ingested("git", "commit");
    metrics.record_event_ingested("shell", "command");

    let snapshot = metrics.copy();
    let hourly_total: u64 = snapshot.hourly_buckets.values().sum();
    let daily_total: u64 = snapshot.daily_buckets.values().sum();
    assert_eq!(snapshot.events_ingested, hourly_total);
    assert_eq!(snapshot.events_ingested, daily_total);
}
