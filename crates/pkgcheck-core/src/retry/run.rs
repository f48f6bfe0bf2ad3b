//! Retry loop: run a closure until success or policy says stop.

use std::time::{Duration, Instant};

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::control::RunControl;
use crate::fetch::FetchError;

const ABORT_POLL: Duration = Duration::from_millis(50);

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
/// The sleep is cut short (returning `FetchError::Aborted`) when `control` is aborted.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, control: &RunControl, mut f: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, delay_ms = d.as_millis() as u64, "retrying fetch: {}", e);
                        sleep_unless_aborted(d, control)?;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

fn sleep_unless_aborted(d: Duration, control: &RunControl) -> Result<(), FetchError> {
    let deadline = Instant::now() + d;
    loop {
        if control.is_aborted() {
            return Err(FetchError::Aborted);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep(ABORT_POLL.min(deadline - now));
    }
}
