//! Package fetcher: single-stream HTTP GET of one package into the working directory.
//!
//! Every transfer carries a connect timeout, a hard wall-clock timeout and a
//! low-speed abort, and observes the run's abort token via the progress callback.

mod error;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::control::RunControl;
use crate::retry::{run_with_retry, RetryPolicy};

pub use error::FetchError;

const WRITE_BUF: usize = 64 * 1024;

/// Transfer timeouts applied to every fetch attempt.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

/// Only http(s) URLs are fetched.
pub fn check_url(url: &str) -> Result<(), FetchError> {
    match url::Url::parse(url) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
        _ => Err(FetchError::InvalidUrl(url.to_string())),
    }
}

/// Downloads `url` into `dest` (created or truncated). Returns bytes written.
/// One attempt only; see [`fetch_with_retry`].
pub fn fetch_to_path(
    url: &str,
    dest: &Path,
    opts: &FetchOptions,
    control: &RunControl,
) -> Result<u64, FetchError> {
    check_url(url)?;
    if control.is_aborted() {
        return Err(FetchError::Aborted);
    }

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.timeout(opts.timeout)?;
    easy.progress(true)?;

    let mut out = BufWriter::with_capacity(WRITE_BUF, File::create(dest)?);
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match out.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.progress_function(|_, _, _, _| !control.is_aborted())?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if e.is_aborted_by_callback() {
            return Err(FetchError::Aborted);
        }
        if e.is_write_error() {
            if let Some(io_err) = write_err.take() {
                return Err(FetchError::Io(io_err));
            }
        }
        return Err(FetchError::Curl(e));
    }
    out.flush()?;
    drop(out);

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(written)
}

/// [`fetch_to_path`] under the bounded backoff policy. Each attempt rewrites `dest` from scratch.
pub fn fetch_with_retry(
    url: &str,
    dest: &Path,
    opts: &FetchOptions,
    policy: &RetryPolicy,
    control: &RunControl,
) -> Result<u64, FetchError> {
    run_with_retry(policy, control, |attempt| {
        tracing::debug!(url, attempt, "fetch -> {}", dest.display());
        fetch_to_path(url, dest, opts, control)
    })
}
