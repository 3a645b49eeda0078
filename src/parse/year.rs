//! Guide year from JSON-LD or from year-bearing text

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

const MIN_YEAR: i32 = 1900;

static TEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d{4})\s+MICHELIN Guide",
        r"MICHELIN Guide.*?(\d{4})",
        r"(\d{4}-\d{2}-\d{2})",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("year pattern should compile"))
    .collect()
});

/// Current UTC year
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// True when `1900 <= year <= current year + 1`
pub fn is_valid_year(year: i32) -> bool {
    (MIN_YEAR..=current_year() + 1).contains(&year)
}

/// Reads the award year from a JSON-LD document
///
/// `award.dateAwarded` is preferred over `review.datePublished`. Malformed
/// JSON or an unrecognized date yields `None`.
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::year_from_json_ld;
///
/// let json = r#"{"award":{"dateAwarded":"2020-06-01"},"review":{"datePublished":"2019-01-01"}}"#;
/// assert_eq!(year_from_json_ld(json), Some(2020));
/// assert_eq!(year_from_json_ld("not json"), None);
/// ```
pub fn year_from_json_ld(json: &str) -> Option<i32> {
    let value: Value = serde_json::from_str(json.trim()).ok()?;
    year_from_value(&value)
}

/// Same as [`year_from_json_ld`] for an already parsed document
pub fn year_from_value(value: &Value) -> Option<i32> {
    let candidates = [
        value.pointer("/award/dateAwarded"),
        value.pointer("/review/datePublished"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .find_map(parse_year)
}

/// Finds a year in free text such as "2023 MICHELIN Guide Singapore"
pub fn year_from_text(text: &str) -> Option<i32> {
    TEXT_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_year(m.as_str()))
    })
}

/// Parses a 4-digit year or an ISO-like date and validates the year
pub fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();

    let year = if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse::<i32>().ok()?
    } else {
        parse_date_year(raw)?
    };

    is_valid_year(year).then_some(year)
}

fn parse_date_year(raw: &str) -> Option<i32> {
    for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(dt.year());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}
