//! `pkgcheck check` – validate packages already on disk.

use anyhow::Result;
use pkgcheck_core::config::PkgcheckConfig;
use pkgcheck_core::control::RunControl;
use pkgcheck_core::pipeline::{self, PipelineOptions};
use pkgcheck_core::validate::discover_artifacts;
use std::path::Path;

use super::output::{abort_on_ctrl_c, print_summary};
use crate::cli::Completion;

pub async fn run_check(cfg: &PkgcheckConfig, dir: &Path, json: bool) -> Result<Completion> {
    let opts = PipelineOptions::from_config(cfg);
    let artifacts = discover_artifacts(dir, opts.kind)?;
    if artifacts.is_empty() {
        tracing::warn!("no *.{} files in {}", opts.kind.extension(), dir.display());
    }

    let control = RunControl::new();
    let signal = abort_on_ctrl_c(&control);
    let summary = pipeline::check_local(artifacts, &opts, &control).await;
    signal.abort();

    print_summary(&summary?, json)
}
