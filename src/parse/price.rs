use crate::parse::text::normalize_whitespace;
use regex::Regex;
use std::sync::LazyLock;

/// Accepted price shapes, tried in order
static VALIDATORS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^[€$£¥₩₽₹฿₺]+$",
        r"^[0-9][0-9,.\-\s]*[0-9]\s*[A-Z]{2,4}$",
        r"^[0-9][0-9,.\-\s]*[0-9]$",
        r"^(Over|Under)\s+\d+",
        r"^Between\s+\d+.*\d+\s+[A-Z]{2,4}$",
        r"^\d+\s+to\s+\d+\s+[A-Z]{2,4}$",
        r"(?i)^Less\s+than\s+\d+(\.\d+)?\s+[A-Z]{2,4}$",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("price pattern should compile"))
    .collect()
});

/// Normalizes raw price text, returning `None` when no known shape matches
///
/// The text is trimmed, whitespace-collapsed and cut at the first `·` or `•`
/// before matching, so a whole "price · cuisine" block can be passed in.
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::parse_price;
///
/// assert_eq!(parse_price("$$$$ · French"), Some("$$$$".to_string()));
/// assert_eq!(parse_price("1,800 NOK"), Some("1,800 NOK".to_string()));
/// assert_eq!(parse_price("French"), None);
/// ```
pub fn parse_price(raw: &str) -> Option<String> {
    let mut text = normalize_whitespace(raw);
    if let Some(idx) = text.find(['·', '•']) {
        text.truncate(idx);
        text = text.trim().to_string();
    }

    if text.is_empty() {
        return None;
    }

    VALIDATORS
        .iter()
        .find_map(|re| re.find(&text).map(|m| m.as_str().to_string()))
        .filter(|m| !m.is_empty())
}

/// Maps a dLayer `CAT_Pnn` price category onto dollar signs
///
/// Anything else is returned trimmed and unchanged.
pub fn map_price_category(code: &str) -> String {
    match code.trim() {
        "CAT_P01" => "$".to_string(),
        "CAT_P02" => "$$".to_string(),
        "CAT_P03" => "$$$".to_string(),
        "CAT_P04" => "$$$$".to_string(),
        other => other.to_string(),
    }
}
