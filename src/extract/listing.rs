//! Award listing page extraction

use crate::client::RequestContext;
use crate::extract::selectors::{LISTING_CARD, LISTING_DETAIL_LINK, LISTING_LOCATION, NEXT_PAGE};
use crate::parse::normalize_whitespace;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// One restaurant card on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCard {
    /// Absolute detail page URL
    pub url: String,
    pub location: String,
    pub latitude: String,
    pub longitude: String,
}

impl ListingCard {
    /// Context handed to the detail request so card values survive the hop
    pub fn context(&self) -> RequestContext {
        RequestContext {
            location: Some(self.location.clone()).filter(|s| !s.is_empty()),
            latitude: Some(self.latitude.clone()).filter(|s| !s.is_empty()),
            longitude: Some(self.longitude.clone()).filter(|s| !s.is_empty()),
            original_url: None,
        }
    }
}

/// Cards and pagination found on one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub cards: Vec<ListingCard>,
    pub next_page: Option<String>,
}

/// Extracts every restaurant card and the next page link
///
/// Cards without a detail link are skipped. Links are resolved against
/// `page_url`.
///
/// # Example
///
/// ```
/// use michelin_my_maps::extract::extract_listing;
/// use scraper::Html;
/// use url::Url;
///
/// let html = r#"<div class="card__menu selection-card" data-lat="1.3" data-lng="103.8">
///   <a class="link" href="/en/sg/restaurant/x"></a>
///   <div class="card__menu-footer--score pl-text">Singapore</div>
/// </div>"#;
/// let page = extract_listing(
///     &Html::parse_document(html),
///     &Url::parse("https://guide.michelin.com/en/restaurants/3-stars-michelin").unwrap(),
/// );
/// assert_eq!(page.cards[0].url, "https://guide.michelin.com/en/sg/restaurant/x");
/// assert_eq!(page.cards[0].location, "Singapore");
/// ```
pub fn extract_listing(document: &Html, page_url: &Url) -> ListingPage {
    let (Ok(card_sel), Ok(link_sel), Ok(location_sel)) = (
        Selector::parse(LISTING_CARD),
        Selector::parse(LISTING_DETAIL_LINK),
        Selector::parse(LISTING_LOCATION),
    ) else {
        return ListingPage::default();
    };

    let cards = document
        .select(&card_sel)
        .filter_map(|card| {
            let href = card
                .select(&link_sel)
                .find_map(|a| a.value().attr("href"))?;
            let url = resolve(page_url, href)?;

            Some(ListingCard {
                url,
                location: card
                    .select(&location_sel)
                    .next()
                    .map(text_of)
                    .unwrap_or_default(),
                latitude: attr_of(card, "data-lat"),
                longitude: attr_of(card, "data-lng"),
            })
        })
        .collect();

    ListingPage {
        cards,
        next_page: next_page(document, page_url),
    }
}

/// Last arrow of the first selector that matches; the "next" arrow follows "previous"
fn next_page(document: &Html, page_url: &Url) -> Option<String> {
    NEXT_PAGE.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| resolve(page_url, href))
            .last()
    })
}

fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

fn text_of(el: ElementRef) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

fn attr_of(el: ElementRef, name: &str) -> String {
    el.value().attr(name).unwrap_or_default().trim().to_string()
}
