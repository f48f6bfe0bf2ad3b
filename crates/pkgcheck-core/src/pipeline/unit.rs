//! One unit of work: fetch a package, then validate it.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Instrument;

use super::PipelineOptions;
use crate::container::ContainerKind;
use crate::control::RunControl;
use crate::fetch;
use crate::manifest::ManifestEntry;
use crate::report::ValidationOutcome;
use crate::validate::{Artifact, Validator};

/// A manifest entry bound to its local destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub key: String,
    pub remote_url: String,
    pub local_path: PathBuf,
}

impl DownloadTask {
    pub fn new(entry: ManifestEntry, work_dir: &Path, kind: ContainerKind) -> Self {
        let local_path = super::artifact_path(work_dir, &entry.key, kind);
        Self {
            key: entry.key,
            remote_url: entry.remote_url,
            local_path,
        }
    }
}

/// Never fails: every error becomes an Error or Corrupt outcome for this key.
pub(super) async fn fetch_and_validate(
    task: DownloadTask,
    opts: PipelineOptions,
    control: RunControl,
) -> ValidationOutcome {
    let span = tracing::info_span!("unit", key = %task.key);
    async move {
        let DownloadTask {
            key,
            remote_url,
            local_path,
        } = task;
        let started = Instant::now();

        let fetched = tokio::task::spawn_blocking({
            let url = remote_url.clone();
            let dest = local_path.clone();
            move || fetch::fetch_with_retry(&url, &dest, &opts.fetch, &opts.retry, &control)
        })
        .await;
        match fetched {
            Ok(Ok(bytes)) => {
                tracing::debug!(bytes, elapsed_ms = started.elapsed().as_millis() as u64, "fetched");
            }
            Ok(Err(e)) => {
                return ValidationOutcome::error(key, format!("fetch {}: {}", remote_url, e));
            }
            Err(e) => {
                return ValidationOutcome::error(key, format!("fetch task join: {}", e));
            }
        }

        let artifact = Artifact {
            key,
            path: local_path,
            kind: opts.kind,
        };
        let outcome = artifact.validate(opts.validate).await;
        tracing::debug!(status = %outcome.status, elapsed_ms = started.elapsed().as_millis() as u64, "validated");
        outcome
    }
    .instrument(span)
    .await
}
