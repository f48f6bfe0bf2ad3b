//! Human-readable summary rendering.

use std::fmt;

use super::{PipelineSummary, Status};

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "checked {} item(s): {} ok, {} failed ({} corrupt, {} error)",
            self.total,
            self.ok_count,
            self.failed_count(),
            self.count(Status::Corrupt),
            self.count(Status::Error),
        )?;
        for o in &self.failed {
            match &o.detail {
                Some(d) => writeln!(f, "  {:<8} {}  {}", o.status, o.key, d)?,
                None => writeln!(f, "  {:<8} {}", o.status, o.key)?,
            }
        }
        Ok(())
    }
}
