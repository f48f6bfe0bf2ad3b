//! Run control: a shared abort token for cooperative cancellation.
//!
//! The CLI flips the token on Ctrl-C. The pipeline stops submitting units,
//! in-flight transfers observe it from the curl progress callback, and retry
//! backoff sleeps return early.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable abort token; every clone observes `abort()` from any other clone.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    aborted: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request abort. Idempotent.
    pub fn abort(&self) {
        if !self.aborted.swap(true, Ordering::SeqCst) {
            tracing::warn!("abort requested; draining in-flight units");
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}
