//! HTTP client
//!
//! A pool of workers pulling requests from a bounded queue. Each fetch goes
//! through the on-disk response cache, the per-host rate limiter and the retry
//! policy before its response reaches the handlers registered for its route.

mod cache;
mod collector;
mod fetcher;
mod request;
mod retry;
mod scheduler;
mod user_agent;

pub use cache::{CachedResponse, ResponseCache};
pub use collector::{Collector, FetchStats, Failure, Response};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use request::{Request, RequestContext, Route};
pub use retry::{RetryDecision, RetryPolicy};
pub use scheduler::{Admission, HostLimiter, RequestQueue};
pub use user_agent::{random_user_agent, BROWSER_USER_AGENTS};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the client itself; failed fetches go to the retry policy instead
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request queue is full ({capacity} URLs)")]
    QueueFull { capacity: usize },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Cache I/O error at {}: {source}", .path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
