//! Manifest looked up in the task metadata store.
//!
//! The store is MySQL in production; the connection goes through sqlx's `Any`
//! driver so tests can point it at a SQLite file.

use sqlx::{AnyConnection, Connection};

use super::{ManifestResolver, ResolveError};

/// Committed package info (`url_info`) for one task.
pub const TASK_MANIFEST_QUERY: &str = "SELECT url_info FROM task, package_info_record \
     WHERE up_pir_id = pir_id AND task.task_id = ?";

#[derive(Clone)]
pub struct TaskStoreResolver {
    url: String,
    task_id: String,
}

impl std::fmt::Debug for TaskStoreResolver {
    // Store URLs carry credentials.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStoreResolver")
            .field("task_id", &self.task_id)
            .finish_non_exhaustive()
    }
}

impl TaskStoreResolver {
    pub fn new(url: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

impl ManifestResolver for TaskStoreResolver {
    fn describe(&self) -> String {
        format!("task {}", self.task_id)
    }

    async fn resolve(&self) -> Result<String, ResolveError> {
        sqlx::any::install_default_drivers();
        let mut conn = AnyConnection::connect(&self.url).await?;
        let found = sqlx::query_scalar::<_, String>(TASK_MANIFEST_QUERY)
            .bind(self.task_id.as_str())
            .fetch_optional(&mut conn)
            .await;
        if let Err(e) = conn.close().await {
            tracing::debug!("close task store connection: {}", e);
        }
        found?.ok_or_else(|| ResolveError::TaskNotFound(self.task_id.clone()))
    }
}
