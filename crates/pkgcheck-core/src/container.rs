//! Container kinds: the closed set of package formats pkgcheck knows how to verify.
//!
//! Every kind is currently stored as SQLite; the kind decides the file suffix and
//! which record table (if any) the optional record scan reads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Table scanned by the optional record pass, with the columns each row must decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordTable {
    pub table: &'static str,
    pub id_column: &'static str,
    pub status_column: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Street-view marks and GPS tracks.
    #[default]
    Exto,
    /// Base map tiles, layout A.
    Ttfa,
    /// Base map tiles, layout B.
    Ttfb,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 3] = [ContainerKind::Exto, ContainerKind::Ttfa, ContainerKind::Ttfb];

    /// File suffix (without dot) used for downloaded artifacts.
    pub fn extension(self) -> &'static str {
        match self {
            ContainerKind::Exto => "exto",
            ContainerKind::Ttfa => "ttfa",
            ContainerKind::Ttfb => "ttfb",
        }
    }

    pub fn record_table(self) -> Option<RecordTable> {
        match self {
            ContainerKind::Exto => Some(RecordTable {
                table: "nav_stv_mark",
                id_column: "mark_id",
                status_column: "mark_status",
            }),
            ContainerKind::Ttfa | ContainerKind::Ttfb => None,
        }
    }

    /// `<key>.<ext>`
    pub fn file_name(self, key: &str) -> String {
        format!("{}.{}", key, self.extension())
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('.');
        ContainerKind::ALL
            .into_iter()
            .find(|k| k.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown container kind: {} (expected exto, ttfa or ttfb)", s))
    }
}
