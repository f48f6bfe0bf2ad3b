//! `pkgcheck fetch` – resolve a manifest, download every package, validate each one.

use anyhow::Result;
use pkgcheck_core::config::PkgcheckConfig;
use pkgcheck_core::control::RunControl;
use pkgcheck_core::pipeline::{self, PipelineOptions};
use pkgcheck_core::resolver::{self, ManifestSource};
use std::path::{Path, PathBuf};

use super::output::{abort_on_ctrl_c, print_summary};
use crate::cli::Completion;

pub async fn run_fetch(
    cfg: &PkgcheckConfig,
    task: Option<&str>,
    manifest: Option<PathBuf>,
    work_dir: &Path,
    json: bool,
) -> Result<Completion> {
    let source = ManifestSource::from_inputs(task, manifest, cfg)?;
    let manifest = resolver::load_manifest(&source, cfg).await?;
    if manifest.duplicates_collapsed() > 0 {
        tracing::warn!(
            "{} duplicate reference(s) collapsed (last one wins)",
            manifest.duplicates_collapsed()
        );
    }

    let opts = PipelineOptions::from_config(cfg);
    let control = RunControl::new();
    let signal = abort_on_ctrl_c(&control);
    let summary = pipeline::run_pipeline(&manifest, work_dir, &opts, &control).await;
    signal.abort();

    print_summary(&summary?, json)
}
