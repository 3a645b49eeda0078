use url::Url;

/// Which handler set a request is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Listing pages or CDX lookups
    Main,
    /// Restaurant detail pages or snapshots
    Detail,
}

/// Values that travel with a request and are copied onto the requests it spawns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Location text shown on the listing card
    pub location: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,

    /// Restaurant URL a CDX lookup was issued for
    pub original_url: Option<String>,
}

/// One unit of work in the queue
#[derive(Debug, Clone)]
pub struct Request {
    /// Monotonic id, stable across retries
    pub id: u64,
    pub url: Url,
    pub route: Route,
    pub context: RequestContext,

    /// 1 on the first fetch, incremented by each retry
    pub attempt: u32,

    /// URL of the page that led here
    pub referer: Option<String>,
}

impl Request {
    /// Same request, one attempt later
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }
}
