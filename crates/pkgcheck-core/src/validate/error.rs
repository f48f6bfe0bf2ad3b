//! Error types for container validation.

use std::path::PathBuf;

use crate::report::Status;

#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// The artifact could not be opened as a container (missing, empty, not SQLite, denied).
    #[error("open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
    /// The integrity check ran and reported inconsistency; carries the reported text.
    #[error("{0}")]
    Integrity(String),
    /// The integrity check query failed for a reason other than corruption.
    #[error("integrity check failed: {0}")]
    Check(#[source] sqlx::Error),
    /// A row of the record table did not decode into its expected shape.
    #[error("record scan of {table}: {source}")]
    Record {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },
    /// A record row holds NULL where the table's shape requires a value.
    #[error("record scan of {table}: row {row}: {column} is NULL")]
    NullField {
        table: &'static str,
        row: usize,
        column: &'static str,
    },
}

impl ValidateError {
    /// Integrity failures are Corrupt; everything else means the check could not be performed.
    pub fn status(&self) -> Status {
        match self {
            ValidateError::Integrity(_) => Status::Corrupt,
            ValidateError::Open { .. }
            | ValidateError::Check(_)
            | ValidateError::Record { .. }
            | ValidateError::NullField { .. } => Status::Error,
        }
    }
}
