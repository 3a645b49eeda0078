//! Whitespace and delimiter helpers shared by the field extractors

/// Delimiters between price and cuisine, tried in this order
pub const PRICE_CUISINE_DELIMITERS: &[&str] = &["·", "•", "-", "|", "–", "—"];

/// Trims and collapses every run of whitespace into a single space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns a multi-line address block into a single line
pub fn normalize_address(text: &str) -> String {
    normalize_whitespace(&text.replace(['\n', '\r'], " "))
}

/// Splits a price-and-cuisine block on the first delimiter found
///
/// Delimiters are tried in order; the first one present in the text wins.
/// Without any delimiter the price is empty and the whole text is the cuisine.
///
/// # Returns
///
/// `(price_candidate, cuisine)`, both whitespace-normalized
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::split_price_and_cuisine;
///
/// assert_eq!(
///     split_price_and_cuisine("$$$$ · French"),
///     ("$$$$".to_string(), "French".to_string())
/// );
/// assert_eq!(
///     split_price_and_cuisine("Creative"),
///     (String::new(), "Creative".to_string())
/// );
/// ```
pub fn split_price_and_cuisine(text: &str) -> (String, String) {
    let text = normalize_whitespace(text);
    for delimiter in PRICE_CUISINE_DELIMITERS {
        if let Some((price, cuisine)) = text.split_once(delimiter) {
            return (normalize_whitespace(price), normalize_whitespace(cuisine));
        }
    }
    (String::new(), text)
}

/// Trims every entry, drops the empty ones, and joins the rest with commas
pub fn join_facilities<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| normalize_whitespace(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
