//! Integration tests for rmirror
//!
//! These tests run full synchronize-then-prune cycles over real
//! directory trees and verify that the replica converges on the
//! source, that pruning removes everything extraneous, and that the
//! source is never touched.

use rmirror_engine::MirrorScheduler;
use rmirror_sync::validate_paths;
use rmirror_tests::test_utils::{assert_trees_identical, build_tree, snapshot_tree, MirrorFixture};
use std::fs;
use std::time::Duration;

async fn run_one_cycle(fixture: &MirrorFixture) -> rmirror_sync::CycleReport {
    let paths = validate_paths(&fixture.source, &fixture.replica)
        .await
        .expect("validation failed");
    let (scheduler, _handle) = MirrorScheduler::new(paths, Duration::from_secs(1));
    scheduler.run_cycle().await.expect("cycle failed")
}

#[tokio::test]
async fn fresh_file_is_copied() {
    // source = {a.txt: "hi"}, replica = {}
    let fixture = MirrorFixture::new();
    build_tree(&fixture.source, &[("a.txt", b"hi")]);

    let report = run_one_cycle(&fixture).await;

    assert_eq!(report.stats.files_copied, 1);
    assert_eq!(fs::read(fixture.replica.join("a.txt")).unwrap(), b"hi");
    assert_trees_identical(&fixture.source, &fixture.replica);
}

#[tokio::test]
async fn extra_replica_file_is_removed() {
    // source = {a.txt: "hi"}, replica = {a.txt: "hi", b.txt: "bye"}
    let fixture = MirrorFixture::new();
    build_tree(&fixture.source, &[("a.txt", b"hi")]);
    build_tree(&fixture.replica, &[("a.txt", b"hi"), ("b.txt", b"bye")]);

    let report = run_one_cycle(&fixture).await;

    assert_eq!(report.stats.files_removed, 1);
    assert_eq!(report.stats.files_copied, 0);
    assert!(!fixture.replica.join("b.txt").exists());
    assert_trees_identical(&fixture.source, &fixture.replica);
}

#[tokio::test]
async fn nested_file_content_is_updated() {
    // source = {dir/a.txt: "v2"}, replica = {dir/a.txt: "v1"}
    let fixture = MirrorFixture::new();
    build_tree(&fixture.source, &[("dir/a.txt", b"v2")]);
    build_tree(&fixture.replica, &[("dir/a.txt", b"v1")]);

    let report = run_one_cycle(&fixture).await;

    assert_eq!(report.stats.files_copied, 1);
    assert_eq!(fs::read(fixture.replica.join("dir/a.txt")).unwrap(), b"v2");
}

#[tokio::test]
async fn replica_converges_on_arbitrary_tree() {
    let fixture = MirrorFixture::new();
    build_tree(
        &fixture.source,
        &[
            ("top.txt", b"top"),
            ("docs/readme.md", b"# readme"),
            ("docs/guide/ch1.md", b"chapter one"),
            ("data/blob.bin", &[0u8, 1, 2, 3, 255]),
            ("empty_dir/", b""),
        ],
    );
    // A replica that drifted in every possible way
    build_tree(
        &fixture.replica,
        &[
            ("top.txt", b"stale"),
            ("docs/readme.md", b"# readme"),
            ("leftover.txt", b"gone in source"),
            ("old_tree/deep/file.txt", b"obsolete"),
        ],
    );

    run_one_cycle(&fixture).await;

    assert_trees_identical(&fixture.source, &fixture.replica);
    assert!(fixture.replica.join("empty_dir").is_dir());
    assert!(!fixture.replica.join("leftover.txt").exists());
    assert!(!fixture.replica.join("old_tree").exists());
}

#[tokio::test]
async fn second_cycle_performs_no_work() {
    let fixture = MirrorFixture::new();
    build_tree(
        &fixture.source,
        &[("a.txt", b"one"), ("dir/b.txt", b"two"), ("dir/sub/c.txt", b"three")],
    );

    let first = run_one_cycle(&fixture).await;
    assert!(!first.stats.is_noop());

    let second = run_one_cycle(&fixture).await;
    assert!(second.stats.is_noop(), "second cycle copied or removed entries");
    assert_eq!(second.stats.files_skipped, 3);
    assert!(!second.has_failures());
}

#[tokio::test]
async fn content_change_detected_despite_matching_metadata() {
    let fixture = MirrorFixture::new();
    build_tree(&fixture.source, &[("f.bin", b"AAAA")]);
    build_tree(&fixture.replica, &[("f.bin", b"ZZZZ")]);

    // Same size, same mtime: only the bytes differ
    let mtime = filetime::FileTime::from_unix_time(1_700_000_000, 0);
    filetime::set_file_mtime(fixture.source.join("f.bin"), mtime).unwrap();
    filetime::set_file_mtime(fixture.replica.join("f.bin"), mtime).unwrap();

    let report = run_one_cycle(&fixture).await;

    assert_eq!(report.stats.files_copied, 1);
    assert_eq!(fs::read(fixture.replica.join("f.bin")).unwrap(), b"AAAA");
}

#[tokio::test]
async fn source_is_never_mutated() {
    let fixture = MirrorFixture::new();
    build_tree(
        &fixture.source,
        &[("a.txt", b"keep"), ("dir/b.txt", b"keep too")],
    );
    build_tree(
        &fixture.replica,
        &[("a.txt", b"drift"), ("stray/junk.txt", b"junk")],
    );

    let before = snapshot_tree(&fixture.source);
    run_one_cycle(&fixture).await;
    let after = snapshot_tree(&fixture.source);

    assert_eq!(before, after, "source tree was modified");
}

#[tokio::test]
async fn replica_edits_are_destroyed() {
    let fixture = MirrorFixture::new();
    build_tree(&fixture.source, &[("shared.txt", b"source wins")]);

    run_one_cycle(&fixture).await;

    // Replica-side edit plus a replica-side addition
    fs::write(fixture.replica.join("shared.txt"), b"replica edit").unwrap();
    fs::write(fixture.replica.join("local.txt"), b"replica only").unwrap();

    run_one_cycle(&fixture).await;

    assert_eq!(
        fs::read(fixture.replica.join("shared.txt")).unwrap(),
        b"source wins"
    );
    assert!(!fixture.replica.join("local.txt").exists());
}

#[tokio::test]
async fn interrupted_state_is_repaired_by_next_cycle() {
    let fixture = MirrorFixture::new();
    build_tree(
        &fixture.source,
        &[("a.txt", b"alpha"), ("dir/b.txt", b"beta")],
    );
    // Simulates a cycle killed partway: one file landed, one did not,
    // and a stale entry survived
    build_tree(
        &fixture.replica,
        &[("a.txt", b"alpha"), ("halfway.tmp", b"partial")],
    );

    run_one_cycle(&fixture).await;

    assert_trees_identical(&fixture.source, &fixture.replica);
}

#[tokio::test]
async fn validation_rejects_overlapping_roots_before_any_cycle() {
    let fixture = MirrorFixture::new();
    let nested_replica = fixture.source.join("replica");
    build_tree(&fixture.source, &[("a.txt", b"hi")]);

    let result = validate_paths(&fixture.source, &nested_replica).await;
    assert!(result.is_err());
    // Nothing was created under the source
    assert!(!nested_replica.exists());
}

#[tokio::test]
async fn scheduler_loop_mirrors_live_changes_until_stopped() {
    let fixture = MirrorFixture::new();
    build_tree(&fixture.source, &[("initial.txt", b"first")]);

    let paths = validate_paths(&fixture.source, &fixture.replica)
        .await
        .unwrap();
    let (scheduler, handle) = MirrorScheduler::new(paths, Duration::from_millis(20));
    let task = tokio::spawn(scheduler.run());

    // Let at least one cycle land, then change the source
    tokio::time::sleep(Duration::from_millis(60)).await;
    build_tree(&fixture.source, &[("added_later.txt", b"second")]);
    tokio::time::sleep(Duration::from_millis(120)).await;

    handle.stop().await;
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scheduler did not stop")
        .expect("scheduler task panicked")
        .expect("scheduler returned an error");

    assert_eq!(
        fs::read(fixture.replica.join("initial.txt")).unwrap(),
        b"first"
    );
    assert_eq!(
        fs::read(fixture.replica.join("added_later.txt")).unwrap(),
        b"second"
    );
}
