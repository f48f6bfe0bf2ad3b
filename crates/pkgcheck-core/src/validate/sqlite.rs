//! SQLite container checks: `PRAGMA integrity_check` and the record-table scan.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::path::Path;

use super::error::ValidateError;
use crate::container::RecordTable;

const SQLITE_CORRUPT: i32 = 11;
const SQLITE_NOTADB: i32 = 26;

/// Primary SQLite result code from an extended code string (e.g. "779" -> 11).
pub(super) fn primary_code(code: &str) -> Option<i32> {
    code.trim().parse::<i32>().ok().map(|c| c & 0xff)
}

fn sqlite_code(e: &sqlx::Error) -> Option<i32> {
    e.as_database_error()
        .and_then(|d| d.code())
        .and_then(|c| primary_code(&c))
}

/// Exactly one `ok` row passes; anything else is reported verbatim.
pub(super) fn interpret_integrity(rows: &[String]) -> Result<(), ValidateError> {
    match rows {
        [only] if only == "ok" => Ok(()),
        [] => Err(ValidateError::Integrity(
            "integrity_check returned no rows".to_string(),
        )),
        rows => Err(ValidateError::Integrity(rows.join("; "))),
    }
}

/// Opens `path` read-only, runs the checks, and closes the connection on every path.
pub(super) async fn check_sqlite(
    path: &Path,
    records: Option<RecordTable>,
) -> Result<(), ValidateError> {
    let open_err = |source: sqlx::Error| ValidateError::Open {
        path: path.to_path_buf(),
        source,
    };

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| open_err(sqlx::Error::Io(e)))?;
    if !meta.is_file() || meta.len() == 0 {
        return Err(open_err(sqlx::Error::Protocol(
            "empty or not a regular file".to_string(),
        )));
    }

    let opts = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false);
    let mut conn = SqliteConnection::connect_with(&opts)
        .await
        .map_err(open_err)?;

    let result = run_checks(&mut conn, path, records).await;
    if let Err(e) = conn.close().await {
        tracing::debug!("close {}: {}", path.display(), e);
    }
    result
}

async fn run_checks(
    conn: &mut SqliteConnection,
    path: &Path,
    records: Option<RecordTable>,
) -> Result<(), ValidateError> {
    let rows = match sqlx::query_scalar::<_, String>("PRAGMA integrity_check")
        .fetch_all(&mut *conn)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            return Err(match sqlite_code(&e) {
                Some(SQLITE_CORRUPT) => ValidateError::Integrity(
                    e.as_database_error()
                        .map(|d| d.message().to_string())
                        .unwrap_or_else(|| e.to_string()),
                ),
                Some(SQLITE_NOTADB) => ValidateError::Open {
                    path: path.to_path_buf(),
                    source: e,
                },
                _ => ValidateError::Check(e),
            })
        }
    };
    interpret_integrity(&rows)?;

    if let Some(t) = records {
        let sql = format!(
            "SELECT {}, {} FROM {}",
            t.id_column, t.status_column, t.table
        );
        let rows = sqlx::query_as::<_, (Option<String>, Option<i64>)>(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|source| ValidateError::Record {
                table: t.table,
                source,
            })?;
        // sqlx decodes NULL TEXT as "" for String; NULL is not a valid row here.
        let null_field = rows.iter().enumerate().find_map(|(row, (id, status))| {
            match (id, status) {
                (None, _) => Some((row, t.id_column)),
                (_, None) => Some((row, t.status_column)),
                _ => None,
            }
        });
        if let Some((row, column)) = null_field {
            return Err(ValidateError::NullField {
                table: t.table,
                row,
                column,
            });
        }
        tracing::debug!(table = t.table, rows = rows.len(), "record scan passed");
    }
    Ok(())
}
