//! Watch loop against the real platform backend.

use assert_fs::TempDir;
use assert_fs::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use file_organizer::organize::COMMON_IN_PROGRESS_SUFFIXES;
use file_organizer::{
    CancelToken, CategoryTable, FileOutcome, Organizer, SettleWindow, Subscription, spawn_watch,
    watch_with,
};

fn quick_settle() -> SettleWindow {
    SettleWindow {
        interval: Duration::from_millis(50),
        checks: 20,
    }
}

fn organizer(root: &Path) -> Organizer {
    Organizer::new(root, Arc::new(CategoryTable::default())).unwrap()
}

fn wait_for(path: &Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    path.exists()
}

#[test]
fn dropped_file_is_sorted_without_a_second_run() {
    let root = TempDir::new().unwrap();
    let handle = spawn_watch(organizer(root.path()), quick_settle()).unwrap();

    root.child("notes.txt").write_str("hello").unwrap();

    let sorted = root.child("Documents/notes.txt");
    assert!(wait_for(sorted.path(), Duration::from_secs(10)), "file was not sorted");
    sorted.assert("hello");
    assert!(!root.child("notes.txt").path().exists());

    let summary = handle.stop().unwrap();
    assert_eq!(summary.moved_count(), 1);
    assert!(summary.is_clean());
}

#[test]
fn file_renamed_into_place_is_sorted() {
    let root = TempDir::new().unwrap();
    let org = organizer(root.path()).with_in_progress_suffixes(COMMON_IN_PROGRESS_SUFFIXES);
    let handle = spawn_watch(org, quick_settle()).unwrap();

    // A download in progress is ignored until it gets its final name.
    let partial = root.child("song.mp3.part");
    partial.write_str("audio").unwrap();
    thread::sleep(Duration::from_millis(300));
    assert!(partial.path().exists());

    fs::rename(partial.path(), root.child("song.mp3").path()).unwrap();

    let sorted = root.child("Audio/song.mp3");
    assert!(wait_for(sorted.path(), Duration::from_secs(10)), "renamed file was not sorted");
    sorted.assert("audio");
    handle.stop().unwrap();
}

#[test]
fn own_moves_do_not_cascade() {
    let root = TempDir::new().unwrap();
    let handle = spawn_watch(organizer(root.path()), quick_settle()).unwrap();

    root.child("a.png").write_str("1").unwrap();
    root.child("b.png").write_str("2").unwrap();
    assert!(wait_for(root.child("Images/b.png").path(), Duration::from_secs(10)));
    assert!(wait_for(root.child("Images/a.png").path(), Duration::from_secs(10)));
    thread::sleep(Duration::from_millis(300));

    let summary = handle.stop().unwrap();
    assert_eq!(summary.moved_count(), 2);
    assert!(!root.child("Images/a(1).png").path().exists());
    assert!(!root.child("Others").path().exists());
}

#[test]
fn watch_with_reports_outcomes_and_stops_on_cancel() {
    let root = TempDir::new().unwrap();
    let org = organizer(root.path());
    let cancel = CancelToken::new();
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();

    let worker = {
        let cancel = cancel.clone();
        let seen = Arc::clone(&seen);
        thread::spawn(move || {
            watch_with(&org, quick_settle(), &cancel, |outcome| {
                if let FileOutcome::Moved { category, .. } = outcome {
                    seen.lock().unwrap().push(category.clone());
                }
            })
        })
    };

    // Give the subscription a moment to install before dropping the file.
    thread::sleep(Duration::from_millis(500));
    root.child("clip.mov").write_str("v").unwrap();
    assert!(wait_for(root.child("Videos/clip.mov").path(), Duration::from_secs(10)));

    let started = Instant::now();
    cancel.request();
    let summary = worker.join().unwrap().unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(summary.moved_count(), 1);
    assert_eq!(*seen.lock().unwrap(), vec!["Videos".to_string()]);
}

#[test]
fn stop_without_events_returns_empty_summary() {
    let root = TempDir::new().unwrap();
    let handle = spawn_watch(organizer(root.path()), quick_settle()).unwrap();
    let summary = handle.stop().unwrap();
    assert_eq!(summary.moved_count(), 0);
    assert_eq!(summary.failed_count(), 0);
}

#[test]
fn slow_write_is_sorted_once_it_finishes() {
    let root = TempDir::new().unwrap();
    // Much shorter than the write below, so the first probes see a growing file.
    let short = SettleWindow {
        interval: Duration::from_millis(30),
        checks: 3,
    };
    let handle = spawn_watch(organizer(root.path()), short).unwrap();

    let path = root.child("big.mkv").path().to_path_buf();
    let mut file = fs::File::create(&path).unwrap();
    for _ in 0..20 {
        file.write_all(&[0u8; 1024]).unwrap();
        file.flush().unwrap();
        thread::sleep(Duration::from_millis(20));
    }
    drop(file);

    let sorted = root.child("Videos/big.mkv");
    assert!(wait_for(sorted.path(), Duration::from_secs(10)), "slow file was not sorted");
    assert_eq!(fs::metadata(sorted.path()).unwrap().len(), 20 * 1024);

    let summary = handle.stop().unwrap();
    assert_eq!(summary.moved_count(), 1);
    assert!(summary.is_clean(), "failed: {:?}", summary.failed);
}

#[test]
fn subscription_buffers_files_that_land_before_the_loop_runs() {
    let root = TempDir::new().unwrap();
    root.child("early.jpg").write_str("e").unwrap();
    let org = organizer(root.path());

    let subscription = Subscription::install(org.root()).unwrap();
    let first = org.organize();
    assert_eq!(first.moved_count(), 1);

    // Lands after the pass has scanned the root but before the loop starts.
    root.child("late.pdf").write_str("l").unwrap();
    thread::sleep(Duration::from_millis(200));

    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let late = root.child("Documents/late.pdf").path().to_path_buf();
    let stopper = thread::spawn(move || {
        wait_for(&late, Duration::from_secs(10));
        remote.request();
    });
    let watched = subscription
        .run(&org, quick_settle(), &cancel, |_| {})
        .unwrap();
    stopper.join().unwrap();

    root.child("Images/early.jpg").assert("e");
    root.child("Documents/late.pdf").assert("l");
    assert_eq!(watched.moved_count(), 1);
}
