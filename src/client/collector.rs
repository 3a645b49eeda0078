//! Collector - the worker pool driving fetches through the cache, the rate
//! limiter and the retry policy
//!
//! A [`Collector`] is a cheap handle onto shared state. The main handle and the
//! handle returned by [`Collector::detail`] share the queue, cache, limiter and
//! statistics but register handlers independently: responses are dispatched to
//! the handlers of the route their request was enqueued on.

use super::cache::ResponseCache;
use super::fetcher::{build_http_client, fetch_url, FetchResult};
use super::request::{Request, RequestContext, Route};
use super::retry::{RetryDecision, RetryPolicy};
use super::scheduler::{Admission, HostLimiter, RequestQueue};
use super::ClientError;
use crate::config::ClientConfig;
use crate::url::{extract_domain, AllowedDomains};
use crate::HarvestError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// A fetched (or cached) 2xx response
#[derive(Debug, Clone)]
pub struct Response {
    pub request: Request,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub from_cache: bool,
}

/// A request that failed on its current attempt
#[derive(Debug, Clone)]
pub struct Failure {
    pub request: Request,
    /// Missing for network errors
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub error: String,
}

/// Counters for one run of the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Network fetches, cache hits excluded
    pub fetched: u64,
    pub cache_hits: u64,
    pub retries: u64,
    pub dropped: u64,
    pub handler_errors: u64,
}

#[derive(Debug, Default)]
struct Counters {
    fetched: AtomicU64,
    cache_hits: AtomicU64,
    retries: AtomicU64,
    dropped: AtomicU64,
    handler_errors: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FetchStats {
        FetchStats {
            fetched: self.fetched.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            handler_errors: self.handler_errors.load(Ordering::Relaxed),
        }
    }
}

type ResponseHandler = Arc<dyn Fn(&Response, &Collector) -> crate::Result<()> + Send + Sync>;
type ErrorHandler = Arc<dyn Fn(&Failure, &Collector) + Send + Sync>;

#[derive(Default)]
struct Handlers {
    response: HashMap<Route, Vec<ResponseHandler>>,
    error: HashMap<Route, Vec<ErrorHandler>>,
}

struct Shared {
    http: reqwest::Client,
    cache: ResponseCache,
    queue: RequestQueue,
    limiter: HostLimiter,
    allowed: AllowedDomains,
    retry: RetryPolicy,
    worker_count: usize,
    handlers: RwLock<Handlers>,
    next_id: AtomicU64,
    counters: Counters,
    /// Set when the run has to stop early; returned by `run`
    fatal: Mutex<Option<ClientError>>,
}

/// Handle onto a rate-limited, cached, domain-restricted worker pool
#[derive(Clone)]
pub struct Collector {
    shared: Arc<Shared>,
    route: Route,
}

impl Collector {
    /// Creates a collector from a client configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Cache location, allowed hosts, delays, pool and queue sizes
    ///
    /// # Returns
    ///
    /// * `Ok(Collector)` - The main handle
    /// * `Err(ClientError)` - The HTTP client could not be built
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let shared = Shared {
            http: build_http_client(config)?,
            cache: ResponseCache::new(&config.cache_path),
            queue: RequestQueue::new(config.max_queued_urls),
            limiter: HostLimiter::new(config.delay, config.random_delay),
            allowed: AllowedDomains::new(&config.allowed_domains),
            retry: RetryPolicy::from_config(config),
            worker_count: config.worker_count.max(1),
            handlers: RwLock::new(Handlers::default()),
            next_id: AtomicU64::new(1),
            counters: Counters::default(),
            fatal: Mutex::new(None),
        };

        Ok(Self {
            shared: Arc::new(shared),
            route: Route::Main,
        })
    }

    /// Handle for listing pages and CDX lookups
    pub fn main(&self) -> Collector {
        self.with_route(Route::Main)
    }

    /// Handle for detail pages and snapshots
    pub fn detail(&self) -> Collector {
        self.with_route(Route::Detail)
    }

    fn with_route(&self, route: Route) -> Collector {
        Collector {
            shared: Arc::clone(&self.shared),
            route,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Registers a handler for successful responses on this handle's route
    ///
    /// Handlers receive the main handle and may enqueue further requests on
    /// either route. Errors they return are logged and counted.
    pub fn on_response<F>(&self, handler: F)
    where
        F: Fn(&Response, &Collector) -> crate::Result<()> + Send + Sync + 'static,
    {
        let mut handlers = self
            .shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        handlers
            .response
            .entry(self.route)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Registers a handler called for every failed attempt on this handle's route
    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&Failure, &Collector) + Send + Sync + 'static,
    {
        let mut handlers = self
            .shared
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        handlers
            .error
            .entry(self.route)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Queues a URL with an empty context
    pub fn enqueue(&self, url: &str) -> Result<bool, ClientError> {
        self.enqueue_with(url, RequestContext::default(), None)
    }

    /// Queues a URL on this handle's route
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to fetch
    /// * `context` - Values copied onto the request for its handlers
    /// * `referer` - Page that led here
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The request is queued
    /// * `Ok(false)` - Skipped: the host is not allowed or the URL was already queued this run
    /// * `Err(ClientError)` - The URL does not parse or the queue is full
    pub fn enqueue_with(
        &self,
        url: &str,
        context: RequestContext,
        referer: Option<&str>,
    ) -> Result<bool, ClientError> {
        let parsed = Url::parse(url).map_err(|source| ClientError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        if !self.shared.allowed.allows(&parsed) {
            tracing::debug!("Skipping {}: host not allowed", url);
            return Ok(false);
        }

        let request = Request {
            id: self.shared.next_id.fetch_add(1, Ordering::Relaxed),
            url: parsed,
            route: self.route,
            context,
            attempt: 1,
            referer: referer.map(str::to_string),
        };

        match self.shared.queue.push(request)? {
            Admission::Queued => Ok(true),
            Admission::AlreadyVisited => {
                tracing::debug!("Skipping {}: already visited", url);
                Ok(false)
            }
        }
    }

    /// Deletes the cached response for a request
    pub async fn clear_cache(&self, request: &Request) -> Result<(), ClientError> {
        self.shared.cache.clear(request.url.as_str()).await
    }

    pub fn stats(&self) -> FetchStats {
        self.shared.counters.snapshot()
    }

    pub fn pending(&self) -> usize {
        self.shared.queue.pending()
    }

    /// Runs the worker pool until the queue drains or `cancel` fires
    ///
    /// On cancellation workers finish the request they hold, stop taking new
    /// ones, and pending retries are abandoned at their backoff sleep.
    ///
    /// A full queue is fatal: once a handler or a retry overflows it, the pool
    /// winds down as if cancelled and the overflow is returned.
    pub async fn run(&self, cancel: CancellationToken) -> Result<FetchStats, ClientError> {
        self.shared.cache.ensure_root().await?;
        let cancel = cancel.child_token();

        let started = Instant::now();
        tracing::info!(
            "Starting {} workers with {} queued URLs",
            self.shared.worker_count,
            self.pending()
        );

        let workers: Vec<_> = (0..self.shared.worker_count)
            .map(|worker| {
                let collector = self.main();
                let cancel = cancel.clone();
                tokio::spawn(async move { collector.work(worker, cancel).await })
            })
            .collect();

        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let stats = self.stats();
        tracing::info!(
            "Workers finished in {:?}: {} fetched, {} cache hits, {} retries, {} dropped",
            started.elapsed(),
            stats.fetched,
            stats.cache_hits,
            stats.retries,
            stats.dropped
        );

        let fatal = self
            .shared
            .fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match fatal {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }

    async fn work(&self, worker: usize, cancel: CancellationToken) {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = self.shared.queue.next() => next,
            };
            let Some(request) = next else {
                break;
            };

            self.process(request, &cancel).await;
            self.shared.queue.complete();
        }
        tracing::debug!("Worker {} stopped", worker);
    }

    async fn process(&self, request: Request, cancel: &CancellationToken) {
        let shared = &self.shared;
        let url = request.url.to_string();

        let outcome = match shared.cache.get(&url).await {
            Some(entry) => {
                tracing::debug!("Cache hit for {} (status {})", url, entry.status);
                Counters::bump(&shared.counters.cache_hits);
                (FetchResult::from_cached(entry), true)
            }
            None => {
                let host = extract_domain(&request.url).unwrap_or_default();
                let wait = shared.limiter.reserve(&host, Instant::now());
                if !wait.is_zero() && !sleep_or_cancel(wait, cancel).await {
                    tracing::debug!("Cancelled before fetching {}", url);
                    return;
                }

                tracing::debug!("Fetching {} (attempt {})", url, request.attempt);
                let result = fetch_url(&shared.http, &url, request.referer.as_deref()).await;
                Counters::bump(&shared.counters.fetched);

                if let Some(entry) = result.to_cached(&url) {
                    if let Err(e) = shared.cache.put(&entry).await {
                        tracing::warn!("Failed to cache {}: {}", url, e);
                    }
                }
                (result, false)
            }
        };

        match outcome {
            (
                FetchResult::Success {
                    status_code,
                    headers,
                    body,
                    ..
                },
                from_cache,
            ) => {
                self.dispatch(
                    Response {
                        request,
                        status: status_code,
                        headers,
                        body,
                        from_cache,
                    },
                    cancel,
                );
            }
            (
                FetchResult::HttpError {
                    status_code,
                    headers,
                    ..
                },
                _,
            ) => {
                let failure = Failure {
                    request,
                    status: Some(status_code),
                    headers,
                    error: format!("HTTP {}", status_code),
                };
                self.fail(failure, cancel).await;
            }
            (FetchResult::NetworkError { error }, _) => {
                let failure = Failure {
                    request,
                    status: None,
                    headers: Vec::new(),
                    error,
                };
                self.fail(failure, cancel).await;
            }
        }
    }

    fn dispatch(&self, response: Response, cancel: &CancellationToken) {
        let handlers = self
            .shared
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .response
            .get(&response.request.route)
            .cloned()
            .unwrap_or_default();

        for handler in handlers {
            match handler(&response, self) {
                Ok(()) => {}
                Err(HarvestError::Client(ClientError::QueueFull { capacity })) => {
                    Counters::bump(&self.shared.counters.handler_errors);
                    tracing::error!(
                        "Queue overflow while handling {}; stopping the run",
                        response.request.url
                    );
                    self.abort(ClientError::QueueFull { capacity }, cancel);
                }
                Err(e) => {
                    Counters::bump(&self.shared.counters.handler_errors);
                    tracing::warn!("Handler failed for {}: {}", response.request.url, e);
                }
            }
        }
    }

    /// Records the first fatal error and cancels the run
    fn abort(&self, error: ClientError, cancel: &CancellationToken) {
        let mut fatal = self
            .shared
            .fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if fatal.is_none() {
            *fatal = Some(error);
        }
        cancel.cancel();
    }

    async fn fail(&self, failure: Failure, cancel: &CancellationToken) {
        let handlers = self
            .shared
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .error
            .get(&failure.request.route)
            .cloned()
            .unwrap_or_default();
        for handler in handlers {
            handler(&failure, self);
        }

        let request = &failure.request;
        match self.shared.retry.decide(request.attempt, failure.status) {
            RetryDecision::Retry { delay } => {
                tracing::warn!(
                    "Retrying {} after {} (status {:?}, attempt {}) in {:?}",
                    request.url,
                    failure.error,
                    failure.status,
                    request.attempt,
                    delay
                );
                if let Err(e) = self.clear_cache(request).await {
                    tracing::warn!("Failed to evict {} from cache: {}", request.url, e);
                }
                Counters::bump(&self.shared.counters.retries);

                if !sleep_or_cancel(delay, cancel).await {
                    tracing::debug!("Cancelled while backing off {}", request.url);
                    return;
                }
                if let Err(e) = self.shared.queue.push_retry(request.next_attempt()) {
                    Counters::bump(&self.shared.counters.dropped);
                    tracing::error!("Dropping retry of {}: {}", request.url, e);
                    self.abort(e, cancel);
                }
            }
            RetryDecision::Drop => {
                Counters::bump(&self.shared.counters.dropped);
                tracing::error!(
                    "Giving up on {} after {} (status {:?}, attempt {}, headers {:?})",
                    request.url,
                    failure.error,
                    failure.status,
                    request.attempt,
                    failure.headers
                );
            }
        }
    }
}

/// Sleeps for `duration`; returns false if cancelled first
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
