//! Result aggregation: per-key outcomes folded into a deterministic summary.

mod aggregate;
mod render;

use serde::Serialize;
use std::fmt;

pub use aggregate::Aggregator;

/// Terminal state of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    /// The structural check ran and reported inconsistency.
    Corrupt,
    /// The check could not run (transfer, open or I/O failure, abort).
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Status::Ok => "OK",
            Status::Corrupt => "CORRUPT",
            Status::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub key: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ValidationOutcome {
    pub fn ok(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: Status::Ok,
            detail: None,
        }
    }

    pub fn corrupt(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: Status::Corrupt,
            detail: Some(detail.into()),
        }
    }

    pub fn error(key: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: Status::Error,
            detail: Some(detail.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// Final counts. `failed` is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub ok_count: usize,
    pub failed: Vec<ValidationOutcome>,
}

impl PipelineSummary {
    pub fn failed_keys(&self) -> Vec<&str> {
        self.failed.iter().map(|o| o.key.as_str()).collect()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Ok => self.ok_count,
            s => self.failed.iter().filter(|o| o.status == s).count(),
        }
    }

    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}
