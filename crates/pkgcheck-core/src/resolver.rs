//! Manifest resolvers: turn a task identifier (or a local file) into raw manifest text.
//!
//! The pipeline only depends on [`ManifestResolver`] and never knows where the
//! manifest came from.

mod file;
mod task_store;

use std::future::Future;
use std::path::PathBuf;

use crate::config::PkgcheckConfig;
use crate::manifest::{parse_manifest, Manifest};

pub use file::FileResolver;
pub use task_store::{TaskStoreResolver, TASK_MANIFEST_QUERY};

/// The manifest could not be obtained. Fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("either a task id or a manifest file is required")]
    NoSource,
    #[error("read manifest {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("task store not configured (set task_store_url or {})", crate::config::TASK_STORE_URL_ENV)]
    StoreNotConfigured,
    #[error("task store: {0}")]
    Store(#[from] sqlx::Error),
    #[error("no committed package info for task {0}")]
    TaskNotFound(String),
}

/// Source of raw manifest text.
pub trait ManifestResolver {
    /// Short description for logs (e.g. `task 91419`).
    fn describe(&self) -> String;

    fn resolve(&self) -> impl Future<Output = Result<String, ResolveError>> + Send;
}

/// Either resolver, chosen at startup from CLI input.
#[derive(Debug, Clone)]
pub enum ManifestSource {
    File(FileResolver),
    TaskStore(TaskStoreResolver),
}

impl ManifestSource {
    /// `--manifest` wins over `--task`; a task needs a configured store URL.
    pub fn from_inputs(
        task_id: Option<&str>,
        manifest_path: Option<PathBuf>,
        cfg: &PkgcheckConfig,
    ) -> Result<Self, ResolveError> {
        if let Some(path) = manifest_path {
            return Ok(ManifestSource::File(FileResolver::new(path)));
        }
        let task_id = task_id.ok_or(ResolveError::NoSource)?;
        let url = cfg
            .resolved_task_store_url()
            .ok_or(ResolveError::StoreNotConfigured)?;
        Ok(ManifestSource::TaskStore(TaskStoreResolver::new(url, task_id)))
    }
}

impl ManifestResolver for ManifestSource {
    fn describe(&self) -> String {
        match self {
            ManifestSource::File(r) => r.describe(),
            ManifestSource::TaskStore(r) => r.describe(),
        }
    }

    async fn resolve(&self) -> Result<String, ResolveError> {
        match self {
            ManifestSource::File(r) => r.resolve().await,
            ManifestSource::TaskStore(r) => r.resolve().await,
        }
    }
}

/// Resolve and parse in one step, using the config's selector and duplicate policy.
pub async fn load_manifest<R: ManifestResolver>(
    resolver: &R,
    cfg: &PkgcheckConfig,
) -> anyhow::Result<Manifest> {
    let raw = resolver.resolve().await?;
    let manifest = parse_manifest(&raw, &cfg.selector, cfg.duplicate_policy)?;
    tracing::info!(
        source = %resolver.describe(),
        entries = manifest.len(),
        duplicates = manifest.duplicates_collapsed(),
        "manifest resolved"
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn manifest_path_wins_over_task() {
        let cfg = PkgcheckConfig::default();
        let src = ManifestSource::from_inputs(Some("91419"), Some(PathBuf::from("m.json")), &cfg).unwrap();
        assert!(matches!(src, ManifestSource::File(_)));
    }

    #[test]
    fn no_input_is_no_source() {
        let cfg = PkgcheckConfig::default();
        assert!(matches!(
            ManifestSource::from_inputs(None, None, &cfg),
            Err(ResolveError::NoSource)
        ));
    }

    #[test]
    fn task_with_configured_store() {
        let mut cfg = PkgcheckConfig::default();
        cfg.task_store_url = Some("mysql://root:root@db:3306/dawn".to_string());
        let src = ManifestSource::from_inputs(Some("91419"), None, &cfg).unwrap();
        match src {
            ManifestSource::TaskStore(r) => assert_eq!(r.task_id(), "91419"),
            _ => panic!("expected TaskStore"),
        }
    }

    #[tokio::test]
    async fn load_manifest_from_file() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(
            br#"{"list":[{"mesh_id":"A","refer_url":{"exto_pano":[{"pano_id":"1","url":"http://x/a"}]}}]}"#,
        )
        .unwrap();
        f.flush().unwrap();
        let src = ManifestSource::File(FileResolver::new(f.path().to_path_buf()));
        let m = load_manifest(&src, &PkgcheckConfig::default()).await.unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("A_1"), Some("http://x/a"));
    }

    #[tokio::test]
    async fn load_manifest_decode_error_is_fatal() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"{\"global\":{}}").unwrap();
        f.flush().unwrap();
        let src = ManifestSource::File(FileResolver::new(f.path().to_path_buf()));
        let err = load_manifest(&src, &PkgcheckConfig::default()).await.unwrap_err();
        assert!(err.downcast_ref::<crate::manifest::DecodeError>().is_some());
    }
}
