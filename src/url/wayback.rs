//! Wayback Machine URL construction and decomposition

use crate::url::normalize::normalize_url;
use crate::{UrlError, UrlResult};
use url::Url;

/// Literal that separates the snapshot prefix from the archived URL
const RAW_MODIFIER: &str = "id_/";

/// Length of a full `YYYYMMDDhhmmss` timestamp
pub const TIMESTAMP_LEN: usize = 14;

/// Builds the CDX lookup URL listing every snapshot of `original`
///
/// ```
/// use michelin_my_maps::url::cdx_lookup_url;
///
/// assert_eq!(
///     cdx_lookup_url("https://web.archive.org/cdx/search/cdx", "https://guide.michelin.com/en/x"),
///     "https://web.archive.org/cdx/search/cdx?url=https://guide.michelin.com/en/x&output=json&fl=timestamp,original"
/// );
/// ```
pub fn cdx_lookup_url(endpoint: &str, original: &str) -> String {
    format!(
        "{}?url={}&output=json&fl=timestamp,original",
        endpoint.trim_end_matches('/'),
        original
    )
}

/// Builds the raw-bytes snapshot URL for `original` at `timestamp`
pub fn snapshot_url(base: &str, timestamp: &str, original: &str) -> String {
    format!(
        "{}/{}{}{}",
        base.trim_end_matches('/'),
        timestamp,
        RAW_MODIFIER,
        original
    )
}

/// Recovers the archived URL from a snapshot URL
///
/// Everything after the last `id_/` is taken, so an original URL that itself
/// contains the literal still decodes correctly. The result is normalized.
///
/// # Arguments
///
/// * `snapshot` - A URL of the form `.../web/<timestamp>id_/<original>`
///
/// # Returns
///
/// * `Ok(Url)` - The normalized original URL
/// * `Err(UrlError)` - No `id_/` marker, or the remainder is not a URL
///
/// # Examples
///
/// ```
/// use michelin_my_maps::url::extract_original_url;
///
/// let url = extract_original_url(
///     "https://web.archive.org/web/20220101000000id_/https://Guide.Michelin.com/en/x/?a=1",
/// )
/// .unwrap();
/// assert_eq!(url.as_str(), "https://guide.michelin.com/en/x");
/// ```
pub fn extract_original_url(snapshot: &str) -> UrlResult<Url> {
    let idx = snapshot
        .rfind(RAW_MODIFIER)
        .ok_or_else(|| UrlError::NotSnapshot(snapshot.to_string()))?;

    let original = &snapshot[idx + RAW_MODIFIER.len()..];
    if original.is_empty() {
        return Err(UrlError::NotSnapshot(snapshot.to_string()));
    }

    normalize_url(original)
}

/// Returns true for a well-formed 14 character CDX timestamp
pub fn is_valid_timestamp(timestamp: &str) -> bool {
    timestamp.len() >= TIMESTAMP_LEN && timestamp.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    const U: &str = "https://guide.michelin.com/en/ile-de-france/paris/restaurant/le-cinq";

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot = snapshot_url("https://web.archive.org/web", "20220101000000", U);
        assert_eq!(
            snapshot,
            format!("https://web.archive.org/web/20220101000000id_/{}", U)
        );
        assert_eq!(
            extract_original_url(&snapshot).unwrap(),
            normalize_url(U).unwrap()
        );
    }

    #[test]
    fn test_uses_last_marker() {
        let snapshot =
            "https://web.archive.org/web/20200101000000id_/https://example.com/a/id_/https://guide.michelin.com/en/x";
        let url = extract_original_url(snapshot).unwrap();
        assert_eq!(url.as_str(), "https://guide.michelin.com/en/x");
    }

    #[test]
    fn test_normalizes_original() {
        let snapshot = "https://web.archive.org/web/20200101000000id_/HTTPS://GUIDE.MICHELIN.COM/en/x/?lang=en";
        let url = extract_original_url(snapshot).unwrap();
        assert_eq!(url.as_str(), "https://guide.michelin.com/en/x");
    }

    #[test]
    fn test_rejects_non_snapshot() {
        assert!(matches!(
            extract_original_url("https://guide.michelin.com/en/x"),
            Err(UrlError::NotSnapshot(_))
        ));
        assert!(extract_original_url("https://web.archive.org/web/20200101000000id_/").is_err());
    }

    #[test]
    fn test_base_trailing_slash_is_tolerated() {
        assert_eq!(
            snapshot_url("http://127.0.0.1:9000/web/", "20200615123000", U),
            format!("http://127.0.0.1:9000/web/20200615123000id_/{}", U)
        );
        assert!(cdx_lookup_url("http://127.0.0.1:9000/cdx/", U)
            .starts_with("http://127.0.0.1:9000/cdx?url="));
    }

    #[test]
    fn test_timestamp_validation() {
        assert!(is_valid_timestamp("20200615123000"));
        assert!(!is_valid_timestamp("2020061512"));
        assert!(!is_valid_timestamp("timestamp"));
        assert!(!is_valid_timestamp(""));
    }
}
