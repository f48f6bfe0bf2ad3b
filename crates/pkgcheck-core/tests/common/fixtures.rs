//! SQLite package fixtures built through sqlx.

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

const PAGE: u64 = 4096;

/// Bytes of a valid exto package with a populated mark table.
pub async fn exto_bytes(dir: &Path, name: &str) -> Vec<u8> {
    let path = dir.join(name);
    let opts = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&opts).await.unwrap();
    for sql in [
        "PRAGMA page_size = 4096",
        "CREATE TABLE nav_stv_mark (mark_id TEXT, mark_status INTEGER)",
        "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 2000) \
         INSERT INTO nav_stv_mark SELECT printf('mark-%06d-%s', x, hex(randomblob(48))), x % 3 FROM c",
        "CREATE INDEX idx_mark_id ON nav_stv_mark (mark_id)",
    ] {
        sqlx::query(sql).execute(&mut conn).await.unwrap();
    }
    conn.close().await.unwrap();
    std::fs::read(&path).unwrap()
}

/// Same package with a few b-tree pages overwritten.
pub async fn corrupt_exto_bytes(dir: &Path, name: &str) -> Vec<u8> {
    let mut bytes = exto_bytes(dir, name).await;
    let pages = bytes.len() as u64 / PAGE;
    assert!(pages > 8);
    for page in [2, 3, pages / 2] {
        let start = (page * PAGE) as usize;
        bytes[start..start + PAGE as usize].fill(0xA5);
    }
    let mut f = std::fs::File::create(dir.join(name)).unwrap();
    f.seek(SeekFrom::Start(0)).unwrap();
    f.write_all(&bytes).unwrap();
    bytes
}
