//! Remote fetching: the injected [`Requester`] seam, its delayed reqwest
//! implementation, fetch-with-retry and the pagination driver.

pub mod http;
pub mod paginate;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::BTreeMap;
use thiserror::Error;

pub use http::{DelayedRequester, HttpResponse, Requester, RequesterConfig};
pub use paginate::{PageSource, PaginationConfig, collect_window};
pub use retry::{RetryPolicy, get_json, get_text};

/// Query string parameters, kept ordered so requests are reproducible
pub type QueryParams = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected response shape from {url}: {reason}")]
    UnexpectedShape { url: String, reason: String },

    #[error("Retries exceeded for {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}
