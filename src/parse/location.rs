/// City-states and territories whose addresses don't split cleanly
const OVERRIDES: &[(&str, &str)] = &[
    ("hong kong", "Hong Kong"),
    ("singapore", "Singapore"),
    ("dubai", "Dubai"),
    ("macau", "Macau"),
];

/// Derives a "City, Country" location from a comma-separated address
///
/// Used when the listing card didn't provide a location.
///
/// | Parts | Result |
/// |-------|--------|
/// | contains an override key | the override |
/// | 4 or more | `second-to-last, last`, postal code dropped from the city |
/// | 2 or 3 | last part |
/// | 0 or 1 | empty |
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::location_from_address;
///
/// assert_eq!(
///     location_from_address("Domaine de Baulieu, Lieu-dit Baulieu, 32190 Préneron, France"),
///     "Préneron, France"
/// );
/// assert_eq!(location_from_address("1 Scotts Road, 228208, Singapore"), "Singapore");
/// ```
pub fn location_from_address(address: &str) -> String {
    let lower = address.to_lowercase();
    if let Some((_, name)) = OVERRIDES.iter().find(|(key, _)| lower.contains(key)) {
        return name.to_string();
    }

    let parts: Vec<&str> = address
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.len() {
        0 | 1 => String::new(),
        2 | 3 => parts[parts.len() - 1].to_string(),
        n => {
            let city = strip_postal_code(parts[n - 2]);
            let country = parts[n - 1];
            if city.is_empty() {
                country.to_string()
            } else {
                format!("{}, {}", city, country)
            }
        }
    }
}

/// Drops leading tokens that contain digits ("32190 Préneron" -> "Préneron")
fn strip_postal_code(part: &str) -> String {
    let tokens: Vec<&str> = part.split_whitespace().collect();
    let start = tokens
        .iter()
        .position(|t| !t.chars().any(|c| c.is_ascii_digit()))
        .unwrap_or(tokens.len());
    tokens[start..].join(" ")
}
