//! Crash-safety tests against the file-backed attempt log
//!
//! The log file is the only state that survives a restart, so a second run
//! over the same file must pick up exactly where the first one stopped.

use std::collections::BTreeSet;

use safecode_hardware::mock::{MockClock, MockPins};
use safecode_search::{SearchConfig, SearchOutcome, SearchScheduler};
use safecode_storage::{AttemptStore, FileAttemptStore, parse_attempt_log};
use tempfile::TempDir;

fn logged_values(content: &str) -> Vec<u16> {
    parse_attempt_log(content)
        .codes
        .iter()
        .map(|c| c.value())
        .collect()
}

#[tokio::test]
async fn test_exhaustive_run_writes_one_line_per_code() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codes.txt");
    let (pins, handle) = MockPins::new();

    let mut scheduler = SearchScheduler::new(
        pins,
        MockClock::new(),
        FileAttemptStore::new(&path),
        SearchConfig::new(5).seed(77),
    )
    .unwrap();
    let summary = scheduler.run().await.unwrap();

    assert_eq!(summary.outcome, SearchOutcome::Exhausted);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 5);
    assert!(content.ends_with('\n'));

    let values = logged_values(&content);
    let distinct: BTreeSet<_> = values.iter().copied().collect();
    assert_eq!(distinct, (0..5).collect());
    let submitted: Vec<_> = handle.submissions().iter().map(|c| c.value()).collect();
    assert_eq!(values, submitted);
}

#[tokio::test]
async fn test_restart_resumes_from_existing_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codes.txt");
    std::fs::write(&path, "3\n\n0\nnot-a-code\n3\n").unwrap();
    let (pins, handle) = MockPins::new();

    let mut scheduler = SearchScheduler::new(
        pins,
        MockClock::new(),
        FileAttemptStore::new(&path),
        SearchConfig::new(5).seed(4),
    )
    .unwrap();
    let summary = scheduler.run().await.unwrap();

    assert_eq!(summary.attempts, 3);
    let submitted: BTreeSet<_> = handle.submissions().iter().map(|c| c.value()).collect();
    assert_eq!(submitted, [1, 2, 4].into_iter().collect());

    // Earlier content is untouched; new attempts are appended
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("3\n\n0\nnot-a-code\n3\n"));
    let reloaded = FileAttemptStore::new(&path).load().await.unwrap();
    assert_eq!(reloaded.count_below(5), 5);
}

#[tokio::test]
async fn test_interrupted_run_then_restart_finishes_range() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codes.txt");

    // First run dies within its first three attempts
    let (pins, handle) = MockPins::new();
    let mut first = SearchScheduler::new(
        pins,
        MockClock::new(),
        FileAttemptStore::new(&path),
        SearchConfig::new(6).seed(12),
    )
    .unwrap();
    // Fewest writes an attempt can take: nine presses on the first wheel,
    // execute, clear
    let attempt_writes = 2 * 9 + 2 + 5;
    handle.fail_after_writes(5 + 2 * attempt_writes);
    assert!(first.run().await.is_err());
    let persisted_first = logged_values(&std::fs::read_to_string(&path).unwrap_or_default());
    assert!(persisted_first.len() <= 2);

    // Second run over the same log completes without repeating a code
    let (pins, handle) = MockPins::new();
    let mut second = SearchScheduler::new(
        pins,
        MockClock::new(),
        FileAttemptStore::new(&path),
        SearchConfig::new(6).seed(12),
    )
    .unwrap();
    let summary = second.run().await.unwrap();

    assert_eq!(summary.outcome, SearchOutcome::Exhausted);
    assert_eq!(summary.attempts, 6 - persisted_first.len());
    for code in handle.submissions() {
        assert!(!persisted_first.contains(&code.value()));
    }
    let values = logged_values(&std::fs::read_to_string(&path).unwrap());
    assert_eq!(values.len(), 6);
    assert_eq!(values.iter().copied().collect::<BTreeSet<_>>(), (0..6).collect());
}
