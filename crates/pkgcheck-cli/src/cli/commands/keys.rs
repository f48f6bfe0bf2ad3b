//! `pkgcheck keys` – print the deduplicated `key url` mapping without fetching.

use anyhow::Result;
use pkgcheck_core::config::PkgcheckConfig;
use pkgcheck_core::resolver::{self, ManifestSource};
use std::io::Write;
use std::path::PathBuf;

pub async fn run_keys(
    cfg: &PkgcheckConfig,
    task: Option<&str>,
    manifest: Option<PathBuf>,
) -> Result<()> {
    let source = ManifestSource::from_inputs(task, manifest, cfg)?;
    let manifest = resolver::load_manifest(&source, cfg).await?;

    let mut out = std::io::stdout().lock();
    for entry in manifest.entries() {
        writeln!(out, "{} {}", entry.key, entry.remote_url)?;
    }
    out.flush()?;
    eprintln!(
        "{} key(s) from {} reference(s)",
        manifest.len(),
        manifest.references()
    );
    Ok(())
}
