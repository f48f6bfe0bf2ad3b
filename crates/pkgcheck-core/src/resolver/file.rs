//! Manifest read from a local JSON file.

use std::path::PathBuf;

use super::{ManifestResolver, ResolveError};

#[derive(Debug, Clone)]
pub struct FileResolver {
    path: PathBuf,
}

impl FileResolver {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ManifestResolver for FileResolver {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn resolve(&self) -> Result<String, ResolveError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| ResolveError::ReadFile {
                path: self.path.clone(),
                source,
            })
    }
}
