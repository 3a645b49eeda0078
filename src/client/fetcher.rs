//! HTTP fetcher implementation
//!
//! This module handles the network side of a request:
//! - Building the shared HTTP client from a client configuration
//! - Sending GET requests with a rotated user agent and an optional Referer
//! - Classifying the outcome into success, HTTP error or network error

use super::cache::CachedResponse;
use super::user_agent::random_user_agent;
use crate::config::ClientConfig;
use reqwest::header::{REFERER, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        headers: Vec<(String, String)>,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-2xx status
    HttpError {
        status_code: u16,
        headers: Vec<(String, String)>,
        body: String,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Cache entry for outcomes that carried a status
    pub fn to_cached(&self, url: &str) -> Option<CachedResponse> {
        match self {
            FetchResult::Success {
                status_code,
                headers,
                body,
                ..
            }
            | FetchResult::HttpError {
                status_code,
                headers,
                body,
            } => Some(CachedResponse {
                url: url.to_string(),
                status: *status_code,
                headers: headers.clone(),
                body: body.clone(),
            }),
            FetchResult::NetworkError { .. } => None,
        }
    }

    /// Rebuilds the outcome a cached entry recorded
    pub fn from_cached(entry: CachedResponse) -> Self {
        if (200..300).contains(&entry.status) {
            FetchResult::Success {
                final_url: entry.url,
                status_code: entry.status,
                headers: entry.headers,
                body: entry.body,
            }
        } else {
            FetchResult::HttpError {
                status_code: entry.status,
                headers: entry.headers,
                body: entry.body,
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The client configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use michelin_my_maps::client::build_http_client;
/// use michelin_my_maps::config::ClientConfig;
///
/// let client = build_http_client(&ClientConfig::scrape_defaults()).unwrap();
/// ```
pub fn build_http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success |
/// | Any other status, including redirect overflow | HttpError |
/// | Timeout, connection failure, body read failure | NetworkError |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `referer` - Page that led to this URL, sent as `Referer`
pub async fn fetch_url(client: &Client, url: &str, referer: Option<&str>) -> FetchResult {
    let mut request = client.get(url).header(USER_AGENT, random_user_agent());
    if let Some(referer) = referer {
        request = request.header(REFERER, referer);
    }

    match request.send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();

            match response.text().await {
                Ok(body) if status.is_success() => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    headers,
                    body,
                },
                Ok(body) => FetchResult::HttpError {
                    status_code: status.as_u16(),
                    headers,
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            // Classify error
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else if e.is_redirect() {
                format!("Redirect error: {}", e)
            } else {
                e.to_string()
            };
            FetchResult::NetworkError { error }
        }
    }
}
