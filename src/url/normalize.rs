use crate::UrlError;
use url::Url;

/// Normalizes a restaurant URL into its canonical stored form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not http(s)
/// 2. Lowercase scheme and host (done by the parser)
/// 3. Drop the query string and fragment
/// 4. Strip trailing slashes, except for the root path
///
/// Applying it twice gives the same result as applying it once.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse the URL
///
/// # Examples
///
/// ```
/// use michelin_my_maps::url::normalize_url;
///
/// let url = normalize_url("HTTPS://Guide.Michelin.COM/en/restaurant/les-amis/?utm=x").unwrap();
/// assert_eq!(url.as_str(), "https://guide.michelin.com/en/restaurant/les-amis");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_query(None);
    url.set_fragment(None);

    let trimmed = url.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&trimmed);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_scheme_and_host() {
        let result = normalize_url("HTTPS://GUIDE.Michelin.com/en/Restaurant").unwrap();
        // Path case is preserved
        assert_eq!(result.as_str(), "https://guide.michelin.com/en/Restaurant");
    }

    #[test]
    fn test_drops_query_and_fragment() {
        let result = normalize_url("https://guide.michelin.com/en/x?page=2#map").unwrap();
        assert_eq!(result.as_str(), "https://guide.michelin.com/en/x");
    }

    #[test]
    fn test_strips_trailing_slash() {
        let result = normalize_url("https://guide.michelin.com/en/x/").unwrap();
        assert_eq!(result.as_str(), "https://guide.michelin.com/en/x");

        let result = normalize_url("https://guide.michelin.com/en/x//").unwrap();
        assert_eq!(result.as_str(), "https://guide.michelin.com/en/x");
    }

    #[test]
    fn test_root_path_kept() {
        let result = normalize_url("https://guide.michelin.com").unwrap();
        assert_eq!(result.as_str(), "https://guide.michelin.com/");

        let result = normalize_url("https://guide.michelin.com/").unwrap();
        assert_eq!(result.as_str(), "https://guide.michelin.com/");
    }

    #[test]
    fn test_http_is_kept() {
        let result = normalize_url("http://127.0.0.1:8080/en/x/").unwrap();
        assert_eq!(result.as_str(), "http://127.0.0.1:8080/en/x");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "https://guide.michelin.com/en/singapore-region/singapore/restaurant/les-amis/",
            "HTTP://Example.COM/a/b/?q=1",
            "https://web.archive.org/",
            "https://guide.michelin.com/en/fr/occitanie/preneron/restaurant/la-table",
        ];
        for input in inputs {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(normalize_url("not a url"), Err(UrlError::Parse(_))));
        assert!(matches!(
            normalize_url("ftp://guide.michelin.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
    }
}
