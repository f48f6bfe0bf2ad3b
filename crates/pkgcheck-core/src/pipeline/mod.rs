//! Fetch pipeline: runs download+validate units with a bounded number in flight.
//!
//! Keeps up to `max_concurrent` units running at once; when one finishes, the
//! next is started until the queue is empty. Units report through a channel
//! drained by a single aggregator task, so every key yields exactly one outcome.

mod unit;

use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::PkgcheckConfig;
use crate::container::ContainerKind;
use crate::control::RunControl;
use crate::fetch::FetchOptions;
use crate::manifest::Manifest;
use crate::report::{Aggregator, PipelineSummary, ValidationOutcome};
use crate::retry::RetryPolicy;
use crate::validate::{Artifact, ValidateOptions, Validator};

pub use unit::DownloadTask;

/// Detail for units never started because the run was aborted.
pub const ABORTED_BEFORE_START: &str = "aborted before start";
/// Detail for units whose worker ended without reporting (panic).
pub const WORKER_FAILED: &str = "worker failed before reporting";

/// Default bound on in-flight units.
pub const DEFAULT_MAX_CONCURRENT: usize = 16;
/// Larger bounds are capped to this.
pub const MAX_CONCURRENT_CEILING: usize = 1024;

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub max_concurrent: usize,
    pub kind: ContainerKind,
    pub validate: ValidateOptions,
    pub fetch: FetchOptions,
    pub retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            kind: ContainerKind::default(),
            validate: ValidateOptions::default(),
            fetch: FetchOptions::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineOptions {
    pub fn from_config(cfg: &PkgcheckConfig) -> Self {
        Self {
            max_concurrent: cfg.max_concurrent_units,
            kind: cfg.container,
            validate: ValidateOptions {
                scan_records: cfg.scan_records,
            },
            fetch: cfg.fetch.to_options(),
            retry: cfg.retry_policy(),
        }
    }
}

trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for DownloadTask {
    fn key(&self) -> &str {
        &self.key
    }
}

impl Keyed for Artifact {
    fn key(&self) -> &str {
        self.identifier()
    }
}

/// Downloads every manifest entry into `work_dir` as `<key>.<ext>` and validates it.
/// Returns once every entry has exactly one outcome. Per-entry failures are folded
/// into the summary; only setup failures (work dir, aggregator) return Err.
pub async fn run_pipeline(
    manifest: &Manifest,
    work_dir: &Path,
    opts: &PipelineOptions,
    control: &RunControl,
) -> Result<PipelineSummary> {
    tokio::fs::create_dir_all(work_dir)
        .await
        .with_context(|| format!("create work dir {}", work_dir.display()))?;

    let tasks: Vec<DownloadTask> = manifest
        .entries()
        .map(|e| DownloadTask::new(e, work_dir, opts.kind))
        .collect();
    tracing::info!(
        units = tasks.len(),
        max_concurrent = opts.max_concurrent,
        work_dir = %work_dir.display(),
        "starting fetch pipeline"
    );

    let opts = *opts;
    let ctl = control.clone();
    drive(tasks, opts.max_concurrent, control, move |task| {
        unit::fetch_and_validate(task, opts, ctl.clone())
    })
    .await
}

/// Validates artifacts already on disk (no transfers) with the same bounded pool.
pub async fn check_local(
    artifacts: Vec<Artifact>,
    opts: &PipelineOptions,
    control: &RunControl,
) -> Result<PipelineSummary> {
    tracing::info!(units = artifacts.len(), "starting local check");
    let validate = opts.validate;
    drive(artifacts, opts.max_concurrent, control, move |artifact| async move {
        artifact.validate(validate).await
    })
    .await
}

/// `<work_dir>/<key>.<ext>`: where a unit writes its package.
pub fn artifact_path(work_dir: &Path, key: &str, kind: ContainerKind) -> PathBuf {
    work_dir.join(kind.file_name(key))
}

async fn drive<T, F, Fut>(
    units: Vec<T>,
    max_concurrent: usize,
    control: &RunControl,
    work: F,
) -> Result<PipelineSummary>
where
    T: Keyed,
    F: Fn(T) -> Fut,
    Fut: Future<Output = ValidationOutcome> + Send + 'static,
{
    if max_concurrent > MAX_CONCURRENT_CEILING {
        tracing::warn!(
            requested = max_concurrent,
            "concurrency capped at {}",
            MAX_CONCURRENT_CEILING
        );
    }
    let max_concurrent = max_concurrent.clamp(1, MAX_CONCURRENT_CEILING);
    let expected: Vec<String> = units.iter().map(|u| u.key().to_string()).collect();

    let (tx, mut rx) = mpsc::channel::<ValidationOutcome>(max_concurrent * 2);
    let aggregator = tokio::spawn(async move {
        let mut agg = Aggregator::new();
        while let Some(outcome) = rx.recv().await {
            agg.record(outcome);
        }
        agg
    });

    let mut pending = units.into_iter();
    let mut join_set = JoinSet::new();
    loop {
        while join_set.len() < max_concurrent {
            let Some(unit) = pending.next() else {
                break;
            };
            if control.is_aborted() {
                let outcome = ValidationOutcome::error(unit.key(), ABORTED_BEFORE_START);
                tx.send(outcome)
                    .await
                    .map_err(|_| anyhow::anyhow!("aggregator stopped early"))?;
                continue;
            }
            let tx = tx.clone();
            let fut = work(unit);
            join_set.spawn(async move {
                let outcome = fut.await;
                let _ = tx.send(outcome).await;
            });
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        if let Err(e) = res {
            tracing::error!("pipeline unit join: {}", e);
        }
    }
    drop(tx);

    let mut agg = aggregator
        .await
        .map_err(|e| anyhow::anyhow!("aggregator task join: {}", e))?;
    let filled = agg.fill_missing(expected.iter().map(String::as_str), WORKER_FAILED);
    if filled > 0 {
        tracing::warn!("{} unit(s) ended without reporting", filled);
    }
    let summary = agg.finish();
    tracing::info!(
        total = summary.total,
        ok = summary.ok_count,
        failed = summary.failed_count(),
        "pipeline drained"
    );
    Ok(summary)
}
