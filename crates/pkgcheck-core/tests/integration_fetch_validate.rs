//! Integration test: local HTTP server serving SQLite packages, full fetch+validate runs.
//!
//! Builds a manifest pointing at the server, runs the pipeline into a temp work
//! dir, and asserts on per-key outcomes and the summary counts.

mod common;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use common::file_server::{self, Route};
use common::fixtures;
use pkgcheck_core::container::ContainerKind;
use pkgcheck_core::control::RunControl;
use pkgcheck_core::manifest::{parse_manifest, DuplicatePolicy, Manifest, ResourceSelector};
use pkgcheck_core::pipeline::{self, PipelineOptions};
use pkgcheck_core::report::Status;
use pkgcheck_core::retry::RetryPolicy;
use tempfile::tempdir;

fn manifest_for(refs: &[(&str, &str, String)]) -> Manifest {
    let units: Vec<serde_json::Value> = refs
        .iter()
        .map(|(mesh, pano, url)| {
            serde_json::json!({
                "mesh_id": mesh,
                "refer_url": { "exto_pano": [ { "pano_id": pano, "url": url } ] }
            })
        })
        .collect();
    let raw = serde_json::json!({ "global": {}, "list": units }).to_string();
    parse_manifest(&raw, &ResourceSelector::default(), DuplicatePolicy::LastWins).unwrap()
}

fn fast_opts() -> PipelineOptions {
    PipelineOptions {
        max_concurrent: 4,
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
        },
        ..PipelineOptions::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_package_fetches_and_passes() {
    let fixtures_dir = tempdir().unwrap();
    let good = fixtures::exto_bytes(fixtures_dir.path(), "good.exto").await;
    let server = file_server::start(HashMap::from([("a", Route::Body(good.clone()))]));

    let m = manifest_for(&[("A", "1", server.url("a"))]);
    assert_eq!(m.get("A_1"), Some(server.url("a").as_str()));

    let work = tempdir().unwrap();
    let summary = pipeline::run_pipeline(&m, work.path(), &fast_opts(), &RunControl::new())
        .await
        .unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.ok_count, 1);
    assert!(summary.failed_keys().is_empty());

    let path = pipeline::artifact_path(work.path(), "A_1", ContainerKind::Exto);
    assert_eq!(std::fs::read(path).unwrap(), good);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failures_are_isolated_per_key() {
    let fixtures_dir = tempdir().unwrap();
    let good = fixtures::exto_bytes(fixtures_dir.path(), "good.exto").await;
    let bad = fixtures::corrupt_exto_bytes(fixtures_dir.path(), "bad.exto").await;
    let server = file_server::start(HashMap::from([
        ("good1", Route::Body(good.clone())),
        ("good2", Route::Body(good.clone())),
        ("bad", Route::Body(bad)),
        ("html", Route::Body(b"<html>maintenance</html>".repeat(40))),
        ("boom", Route::Status(500)),
    ]));

    let m = manifest_for(&[
        ("M1", "P1", server.url("good1")),
        ("M1", "P2", server.url("bad")),
        ("M2", "P1", server.url("missing")),
        ("M2", "P2", server.url("html")),
        ("M3", "P1", server.url("boom")),
        ("M3", "P2", server.url("good2")),
    ]);
    let work = tempdir().unwrap();
    let summary = pipeline::run_pipeline(&m, work.path(), &fast_opts(), &RunControl::new())
        .await
        .unwrap();

    assert_eq!(summary.total, m.len());
    assert_eq!(summary.ok_count + summary.failed_keys().len(), summary.total);
    assert_eq!(summary.ok_count, 2);
    assert_eq!(summary.failed_keys(), vec!["M1_P2", "M2_P1", "M2_P2", "M3_P1"]);

    let status_of = |key: &str| {
        summary
            .failed
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.status)
            .unwrap()
    };
    assert_eq!(status_of("M1_P2"), Status::Corrupt);
    assert_eq!(status_of("M2_P1"), Status::Error);
    assert_eq!(status_of("M2_P2"), Status::Error);
    assert_eq!(status_of("M3_P1"), Status::Error);

    // 404 is not retried; 500 is retried up to the policy's attempt limit.
    assert_eq!(server.hits("missing"), 1);
    assert_eq!(server.hits("boom"), 3);

    // Failed downloads stay on disk for inspection.
    assert!(pipeline::artifact_path(work.path(), "M1_P2", ContainerKind::Exto).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn throttled_fetch_is_retried_then_passes() {
    let fixtures_dir = tempdir().unwrap();
    let good = fixtures::exto_bytes(fixtures_dir.path(), "good.exto").await;
    let server = file_server::start(HashMap::from([(
        "flaky",
        Route::Flaky {
            failures: 2,
            body: good,
        },
    )]));
    let m = manifest_for(&[("A", "1", server.url("flaky"))]);
    let work = tempdir().unwrap();
    let summary = pipeline::run_pipeline(&m, work.path(), &fast_opts(), &RunControl::new())
        .await
        .unwrap();
    assert_eq!(summary.ok_count, 1, "{}", summary);
    assert_eq!(server.hits("flaky"), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stalled_transfer_hits_timeout() {
    let server = file_server::start(HashMap::from([("stall", Route::Stall)]));
    let m = manifest_for(&[("A", "1", server.url("stall"))]);
    let mut opts = fast_opts();
    opts.retry.max_attempts = 1;
    opts.fetch.timeout = Duration::from_secs(1);

    let work = tempdir().unwrap();
    let started = Instant::now();
    let summary = pipeline::run_pipeline(&m, work.path(), &opts, &RunControl::new())
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.failed_keys(), vec!["A_1"]);
    assert_eq!(summary.failed[0].status, Status::Error);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn abort_stops_in_flight_and_queued_units() {
    let server = file_server::start(HashMap::from([("stall", Route::Stall)]));
    let refs: Vec<(&str, &str, String)> = ["1", "2", "3", "4", "5", "6"]
        .into_iter()
        .map(|p| ("A", p, server.url("stall")))
        .collect();
    let m = manifest_for(&refs);
    let mut opts = fast_opts();
    opts.max_concurrent = 2;

    let control = RunControl::new();
    let aborter = {
        let control = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            control.abort();
        })
    };

    let work = tempdir().unwrap();
    let started = Instant::now();
    let summary = pipeline::run_pipeline(&m, work.path(), &opts, &control)
        .await
        .unwrap();
    aborter.await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.total, 6);
    assert_eq!(summary.ok_count, 0);
    assert!(summary.failed.iter().all(|o| o.status == Status::Error));
    let not_started = summary
        .failed
        .iter()
        .filter(|o| o.detail.as_deref() == Some(pipeline::ABORTED_BEFORE_START))
        .count();
    assert_eq!(not_started, 4);
    assert_eq!(server.hits("stall"), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rerun_gives_same_summary() {
    let fixtures_dir = tempdir().unwrap();
    let good = fixtures::exto_bytes(fixtures_dir.path(), "good.exto").await;
    let bad = fixtures::corrupt_exto_bytes(fixtures_dir.path(), "bad.exto").await;
    let server = file_server::start(HashMap::from([
        ("good", Route::Body(good)),
        ("bad", Route::Body(bad)),
    ]));
    let m = manifest_for(&[("A", "1", server.url("good")), ("A", "2", server.url("bad"))]);
    let work = tempdir().unwrap();
    let mut opts = fast_opts();
    opts.validate.scan_records = true;

    let first = pipeline::run_pipeline(&m, work.path(), &opts, &RunControl::new())
        .await
        .unwrap();
    let second = pipeline::run_pipeline(&m, work.path(), &opts, &RunControl::new())
        .await
        .unwrap();
    assert_eq!(first, second);

    let local = pkgcheck_core::validate::discover_artifacts(work.path(), ContainerKind::Exto).unwrap();
    let third = pipeline::check_local(local, &opts, &RunControl::new())
        .await
        .unwrap();
    assert_eq!(first, third);
}
