use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

use merge_folders::{
    estimate, Error, LogEntry, MergeController, MergeEvent, MergeRequest, ProgressKind,
};

fn create_test_tree(root: &Path) {
    fs::create_dir_all(root.join("docs/drafts")).unwrap();
    fs::write(root.join("a.txt"), "a").unwrap();
    fs::write(root.join("docs/b.md"), "b").unwrap();
    fs::write(root.join("docs/drafts/c.md"), "c").unwrap();
}

#[test]
fn test_run_reports_progress_then_one_outcome() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);
    let dest = tmp.path().join("out");

    let stats = estimate(&[src.clone()]);
    let request = MergeRequest::new(&[src], &dest).unwrap();
    let mut controller = MergeController::new();

    let mut progress = Vec::new();
    let mut outcomes = Vec::new();
    controller
        .start_with_callbacks(
            request,
            |event| progress.push((event.kind, event.items_processed)),
            |outcome| outcomes.push(outcome),
        )
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert!(!outcome.canceled);
    assert!(!outcome.failed);
    assert!(outcome.error.is_none());

    assert_eq!(progress.len() as u64, stats.total_items());
    assert_eq!(
        progress.iter().filter(|(k, _)| *k == ProgressKind::Folder).count() as u64,
        stats.dir_count
    );

    // Destination did not exist, so the controller creates it first
    assert_eq!(
        outcome.log.entries()[0],
        LogEntry::DestinationCreated(dest.clone())
    );
    assert_eq!(
        outcome
            .log
            .count_where(|e| matches!(e, LogEntry::CreatedFolder(_))),
        2
    );
    assert!(dest.join("docs/drafts/c.md").is_file());
}

#[test]
fn test_existing_destination_is_not_logged_as_created() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);
    let dest = tmp.path().join("out");
    fs::create_dir_all(&dest).unwrap();

    let request = MergeRequest::new(&[src], &dest).unwrap();
    let outcome = MergeController::new().start(request).unwrap().wait();

    assert!(!outcome
        .log
        .entries()
        .iter()
        .any(|e| matches!(e, LogEntry::DestinationCreated(_))));
}

#[test]
fn test_fatal_error_is_reported_as_data() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);
    let dest = tmp.path().join("out");
    fs::create_dir_all(&dest).unwrap();
    // a folder named "docs" cannot be created over this file
    fs::write(dest.join("docs"), "blocking file").unwrap();

    let request = MergeRequest::new(&[src], &dest).unwrap();
    let outcome = MergeController::new().start(request).unwrap().wait();

    assert!(outcome.failed);
    assert!(!outcome.canceled);
    assert!(outcome.error.is_some());
    assert!(matches!(
        outcome.log.entries().last(),
        Some(LogEntry::Error(_))
    ));
    // a.txt was copied before the failure
    assert!(dest.join("a.txt").is_file());
    assert!(!dest.join("docs_1").exists());
}

#[test]
fn test_events_channel_ends_with_complete() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);
    let dest = tmp.path().join("out");

    let request = MergeRequest::new(&[src], &dest).unwrap();
    let mut controller = MergeController::new();
    let handle = controller.start(request).unwrap();

    let events: Vec<MergeEvent> = handle.events().iter().collect();
    let completes = events
        .iter()
        .filter(|e| matches!(e, MergeEvent::Complete(_)))
        .count();
    assert_eq!(completes, 1);
    assert!(matches!(events.last(), Some(MergeEvent::Complete(_))));
}

#[test]
fn test_try_dispatch_polls_until_done() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);
    let dest = tmp.path().join("out");

    let request = MergeRequest::new(&[src], &dest).unwrap();
    let mut controller = MergeController::new();
    let mut handle = controller.start(request).unwrap();

    let mut seen = 0;
    let mut outcome = None;
    while !handle.try_dispatch(|_| seen += 1, |o| outcome = Some(o)) {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    assert_eq!(seen, 6);
    assert!(outcome.is_some());
    // finished handles stay finished
    assert!(handle.try_dispatch(|_| seen += 1, |_| panic!("second outcome")));
    assert!(!handle.cancel());
}

#[test]
fn test_sequential_runs_on_one_controller() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);
    let dest = tmp.path().join("out");
    let mut controller = MergeController::new();

    let first = controller
        .start(MergeRequest::new(&[src.clone()], &dest).unwrap())
        .unwrap()
        .wait();
    let second = controller
        .start(MergeRequest::new(&[src], &dest).unwrap())
        .unwrap()
        .wait();

    assert!(!first.failed && !second.failed);
    assert_eq!(
        second
            .log
            .count_where(|e| matches!(e, LogEntry::CopiedFileWithRename { .. })),
        3
    );
    assert!(dest.join("docs/drafts/c_1.md").is_file());
}

#[test]
fn test_cancel_while_worker_waits_on_an_event() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);
    let dest = tmp.path().join("out");

    // Capacity 0: the worker cannot move past a progress event until it is read
    let mut controller = MergeController::with_event_capacity(0);
    let handle = controller
        .start(MergeRequest::new(&[src.clone()], &dest).unwrap())
        .unwrap();

    let first = handle.events().recv().unwrap();
    assert!(matches!(
        &first,
        MergeEvent::Progress(e) if e.kind == ProgressKind::Folder
    ));
    // a.txt is copied next, then the worker waits to hand over its event

    assert!(controller.is_running());
    let second = controller.start(MergeRequest::new(&[src], tmp.path().join("other")).unwrap());
    assert!(matches!(second, Err(Error::RunInProgress)));

    assert!(controller.cancel());
    assert!(!controller.cancel());

    let mut progress = Vec::new();
    let mut outcome = None;
    handle.dispatch(
        |event| progress.push(event.relative_path.clone()),
        |o| outcome = Some(o),
    );
    let outcome = outcome.unwrap();

    assert_eq!(progress, vec![PathBuf::from("a.txt")]);
    assert!(outcome.canceled);
    assert!(!outcome.failed);
    assert!(outcome.error.is_none());
    assert!(matches!(
        outcome.log.entries(),
        [LogEntry::DestinationCreated(_), LogEntry::CopiedFile { .. }]
    ));
    assert!(dest.join("a.txt").is_file());
    assert!(!dest.join("docs").exists());
    assert!(!tmp.path().join("other").exists());

    assert!(!controller.is_running());
    assert!(!controller.cancel());
}

#[test]
fn test_cancel_right_after_start() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    create_test_tree(&src);

    let full = MergeController::new()
        .start(MergeRequest::new(&[src.clone()], tmp.path().join("full")).unwrap())
        .unwrap()
        .wait();

    let mut controller = MergeController::new();
    let handle = controller
        .start(MergeRequest::new(&[src], tmp.path().join("partial")).unwrap())
        .unwrap();
    controller.cancel();
    let outcome = handle.wait();

    // The worker may finish before the flag is seen; either way the run is clean.
    assert!(!outcome.failed);
    assert!(outcome.error.is_none());
    assert!(outcome.log.len() <= full.log.len());
}
