//! Map fetch failures onto retry kinds.

use crate::fetch::FetchError;
use crate::retry::policy::ErrorKind;

/// 429/503 back off as throttling; other 5xx are transient; the rest are final.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    let transport = [
        e.is_couldnt_connect(),
        e.is_couldnt_resolve_host(),
        e.is_couldnt_resolve_proxy(),
        e.is_read_error(),
        e.is_recv_error(),
        e.is_send_error(),
        e.is_got_nothing(),
        // Server closed before Content-Length bytes arrived.
        e.is_partial_file(),
    ];
    if e.is_operation_timedout() {
        ErrorKind::Timeout
    } else if transport.into_iter().any(|hit| hit) {
        ErrorKind::Connection
    } else {
        ErrorKind::Other
    }
}

/// Local I/O, bad URLs and aborts are never retried.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::InvalidUrl(_) | FetchError::Io(_) | FetchError::Aborted => ErrorKind::Other,
    }
}
