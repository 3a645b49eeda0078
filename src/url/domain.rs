use url::Url;

/// Extracts the lowercase host of a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use michelin_my_maps::url::extract_domain;
///
/// let url = Url::parse("https://Guide.Michelin.com/en").unwrap();
/// assert_eq!(extract_domain(&url), Some("guide.michelin.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Host allow-list for a client
///
/// Entries are exact hosts (`guide.michelin.com`) or wildcards
/// (`*.michelin.com`, which also admits the bare `michelin.com`).
#[derive(Debug, Clone)]
pub struct AllowedDomains {
    patterns: Vec<String>,
}

impl AllowedDomains {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Returns true if the URL's host matches any pattern
    pub fn allows(&self, url: &Url) -> bool {
        match extract_domain(url) {
            Some(host) => self.patterns.iter().any(|p| host_matches(p, &host)),
            None => false,
        }
    }
}

fn host_matches(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => host == pattern,
    }
}
