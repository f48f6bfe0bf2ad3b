//! Retry and backoff policy for package fetches.
//!
//! Error classification (timeouts, throttling, connection failures) and
//! exponential backoff decisions live here so the fetcher and the pipeline
//! share one bounded policy.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
