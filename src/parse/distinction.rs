use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// The five canonical guide classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Distinction {
    ThreeStars,
    TwoStars,
    OneStar,
    BibGourmand,
    SelectedRestaurants,
}

impl Distinction {
    pub const ALL: [Distinction; 5] = [
        Distinction::ThreeStars,
        Distinction::TwoStars,
        Distinction::OneStar,
        Distinction::BibGourmand,
        Distinction::SelectedRestaurants,
    ];

    /// Canonical string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Distinction::ThreeStars => "3 Stars",
            Distinction::TwoStars => "2 Stars",
            Distinction::OneStar => "1 Star",
            Distinction::BibGourmand => "Bib Gourmand",
            Distinction::SelectedRestaurants => "Selected Restaurants",
        }
    }
}

impl Default for Distinction {
    fn default() -> Self {
        Distinction::SelectedRestaurants
    }
}

impl fmt::Display for Distinction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distinction {
    type Err = String;

    /// Accepts only the canonical strings; use [`parse_distinction`] for raw page text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Distinction::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("not a canonical distinction: '{}'", s))
    }
}

static PATTERNS: LazyLock<Vec<(Regex, Distinction)>> = LazyLock::new(|| {
    [
        (r"(?i)\b(three|3)\b.*?\bstars?\b", Distinction::ThreeStars),
        (r"(?i)\b(two|2)\b.*?\bstars?\b", Distinction::TwoStars),
        (r"(?i)\b(one|1)\b.*?\bstar\b", Distinction::OneStar),
        (r"(?i)\bbib\b", Distinction::BibGourmand),
        (
            r"(?i)\bselected\s*restaurants?\b|\bplate\b",
            Distinction::SelectedRestaurants,
        ),
    ]
    .into_iter()
    .map(|(pattern, d)| (Regex::new(pattern).expect("distinction pattern should compile"), d))
    .collect()
});

/// Maps raw distinction text from any page layout onto a canonical value
///
/// Text that matches nothing falls back to [`Distinction::SelectedRestaurants`].
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::{parse_distinction, Distinction};
///
/// assert_eq!(parse_distinction("Three Stars: Exceptional cuisine"), Distinction::ThreeStars);
/// assert_eq!(parse_distinction("• Bib Gourmand"), Distinction::BibGourmand);
/// assert_eq!(parse_distinction(""), Distinction::SelectedRestaurants);
/// ```
pub fn parse_distinction(raw: &str) -> Distinction {
    let cleaned = clean(raw);
    PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(&cleaned))
        .map(|(_, d)| *d)
        .unwrap_or_default()
}

/// True when the text names the Green Star as the guide prints it
///
/// Case matters: prose such as "a green star in the making" is not an award.
pub fn is_green_star(raw: &str) -> bool {
    raw.contains("Green Star") || raw.contains("GREEN STAR")
}

fn clean(raw: &str) -> String {
    raw.to_lowercase()
        .replace("&bull;", "")
        .replace('•', "")
        .trim_matches(|c: char| c.is_whitespace() || " .!?,;:-".contains(c))
        .to_string()
}
