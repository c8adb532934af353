//! Tests for the run tracking file.

use chrono::{Duration, Utc};

use super::RunLog;

#[test]
fn missing_file_means_never_run() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path().join(".runlog.json"));

    let times = log.load().unwrap();
    assert!(times.first_run.is_none());
    assert!(times.last_run.is_none());
    assert!(!log.ran_recently(Utc::now(), Duration::minutes(1)));
}

#[test]
fn empty_file_means_never_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".runlog.json");
    std::fs::write(&path, "").unwrap();

    let log = RunLog::new(path);
    let times = log.load().unwrap();
    assert!(times.first_run.is_none());
    assert!(times.last_run.is_none());
}

#[test]
fn record_sets_first_run_once() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path().join(".runlog.json"));

    let t1 = Utc::now() - Duration::hours(2);
    let t2 = Utc::now();

    let times = log.record(t1).unwrap();
    assert_eq!(times.first_run, Some(t1));
    assert_eq!(times.last_run, Some(t1));

    let times = log.record(t2).unwrap();
    assert_eq!(times.first_run, Some(t1));
    assert_eq!(times.last_run, Some(t2));
}

#[test]
fn ran_recently_respects_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path().join(".runlog.json"));

    let now = Utc::now();
    log.record(now - Duration::seconds(30)).unwrap();

    assert!(log.ran_recently(now, Duration::minutes(1)));
    assert!(!log.ran_recently(now, Duration::seconds(10)));
}

#[test]
fn file_uses_original_key_names() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::new(dir.path().join(".runlog.json"));
    log.record(Utc::now()).unwrap();

    let raw = std::fs::read_to_string(log.path()).unwrap();
    assert!(raw.contains("FirstRun"));
    assert!(raw.contains("LastRun"));
}
