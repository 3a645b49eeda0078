use phonenumber::Mode;

/// Formats a click-to-call href or raw number as E.164
///
/// Returns an empty string when the number cannot be parsed. Numbers must
/// carry their international prefix since no default region is assumed.
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::parse_phone;
///
/// assert_eq!(parse_phone("tel:+65 6733 2225"), "+6567332225");
/// assert_eq!(parse_phone("call us"), "");
/// ```
pub fn parse_phone(raw: &str) -> String {
    let number = raw.trim();
    let number = number
        .strip_prefix("tel:")
        .or_else(|| number.strip_prefix("TEL:"))
        .unwrap_or(number)
        .trim();

    if number.is_empty() {
        return String::new();
    }

    match phonenumber::parse(None, number) {
        Ok(parsed) => parsed.format().mode(Mode::E164).to_string(),
        Err(e) => {
            tracing::debug!("Unparseable phone number '{}': {}", raw, e);
            String::new()
        }
    }
}
