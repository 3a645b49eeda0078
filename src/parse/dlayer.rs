//! Values from the legacy `dLayer['key'] = 'value';` analytics assignments

use regex::Regex;

/// Extracts the value assigned to `dLayer['<key>']` in a script body
///
/// Only the assignment form is understood; object literals are ignored.
/// Escaped commas (`\u002c`) are decoded.
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::dlayer_value;
///
/// let script = "dLayer['distinction'] = '2 star';\ndLayer['price'] = 'CAT_P03';";
/// assert_eq!(dlayer_value(script, "price"), Some("CAT_P03".to_string()));
/// assert_eq!(dlayer_value(script, "cuisine"), None);
/// ```
pub fn dlayer_value(script: &str, key: &str) -> Option<String> {
    let pattern = format!(r"dLayer\['{}'\]\s*=\s*'([^']*)'", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;

    re.captures(script)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().replace(r"\u002c", ",").trim().to_string())
        .filter(|v| !v.is_empty())
}

/// True when the script looks like the dLayer block carrying award data
pub fn is_award_dlayer(script: &str) -> bool {
    script.contains("dLayer") && script.contains("distinction")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r"
        var dLayer = {};
        dLayer['distinction'] = '1 star';
        dLayer['price'] = 'CAT_P02';
        dLayer['greenstar'] = 'True';
        dLayer['cuisine'] = 'Modern Cuisine\u002c Creative';
        dLayer['empty'] = '';
    ";

    #[test]
    fn test_reads_assignments() {
        assert_eq!(dlayer_value(SCRIPT, "distinction"), Some("1 star".to_string()));
        assert_eq!(dlayer_value(SCRIPT, "price"), Some("CAT_P02".to_string()));
        assert_eq!(dlayer_value(SCRIPT, "greenstar"), Some("True".to_string()));
    }

    #[test]
    fn test_decodes_escaped_commas() {
        assert_eq!(
            dlayer_value(SCRIPT, "cuisine"),
            Some("Modern Cuisine, Creative".to_string())
        );
    }

    #[test]
    fn test_missing_or_empty() {
        assert_eq!(dlayer_value(SCRIPT, "city"), None);
        assert_eq!(dlayer_value(SCRIPT, "empty"), None);
    }

    #[test]
    fn test_object_literal_is_not_supported() {
        let script = "var dLayer = { 'distinction': '3 star' };";
        assert_eq!(dlayer_value(script, "distinction"), None);
    }

    #[test]
    fn test_award_block_detection() {
        assert!(is_award_dlayer(SCRIPT));
        assert!(!is_award_dlayer("window.dataLayer = [];"));
    }
}
