use std::time::Duration;

/// Why a package transfer failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect, total or low-speed timeout.
    Timeout,
    /// 429 or 503 from the package host.
    Throttled,
    /// Reset, refused, DNS, short read.
    Connection,
    /// Other 5xx.
    Http5xx(u16),
    /// 4xx, bad URL, local I/O, abort. Never retried.
    Other,
}

impl ErrorKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Bounded exponential backoff for package fetches. Built from `RetryConfig`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per package, first one included.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles per attempt.
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`: `base * 2^(attempt-1)`, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }

    /// `attempt` is 1-based and counts the attempt that just failed.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_transient() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff(attempt))
    }
}
