//! Fetch error type for retry classification.

use std::fmt;

/// Error returned by a single package fetch.
/// Kept concrete (not anyhow) so the retry policy can classify it.
#[derive(Debug)]
pub enum FetchError {
    /// URL missing a scheme or not http(s).
    InvalidUrl(String),
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// Creating or writing the local file failed. Not retried.
    Io(std::io::Error),
    /// The run was aborted before or during the transfer.
    Aborted,
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(u) => write!(f, "invalid url: {}", u),
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::Io(e) => write!(f, "local write: {}", e),
            FetchError::Aborted => write!(f, "aborted"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Io(e) => Some(e),
            FetchError::InvalidUrl(_) | FetchError::Http(_) | FetchError::Aborted => None,
        }
    }
}
