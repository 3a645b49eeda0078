//! Ordered, multi-generational selector tables
//!
//! Michelin pages have changed layout several times since 2016 and Wayback
//! snapshots cover all of them. Every field therefore carries a list of probes,
//! newest layout first; extraction takes the first probe whose value survives
//! the field's normalizer.

use scraper::{ElementRef, Html, Selector};

/// Which of the matched elements a probe reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    First,
    /// Zero-based position in document order
    Nth(usize),
    Last,
    /// Every match (list fields)
    All,
}

/// What a probe reads from the picked element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    /// All descendant text
    Text,
    /// Each direct text node of the element, separately
    OwnText,
    /// All descendant text of the parent element
    ParentText,
    /// Each direct text node of the parent element, separately
    ParentOwnText,
    /// An attribute value
    Attr(&'static str),
}

/// One CSS selector plus how to read it
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub css: &'static str,
    pub pick: Pick,
    pub read: Read,
}

impl Probe {
    pub const fn text(css: &'static str) -> Self {
        Self {
            css,
            pick: Pick::First,
            read: Read::Text,
        }
    }

    pub const fn nth_text(css: &'static str, n: usize) -> Self {
        Self {
            css,
            pick: Pick::Nth(n),
            read: Read::Text,
        }
    }

    pub const fn attr(css: &'static str, name: &'static str) -> Self {
        Self {
            css,
            pick: Pick::First,
            read: Read::Attr(name),
        }
    }

    pub const fn new(css: &'static str, pick: Pick, read: Read) -> Self {
        Self { css, pick, read }
    }

    /// Raw, trimmed, non-empty values read by this probe
    pub fn values(&self, document: &Html) -> Vec<String> {
        let selector = match Selector::parse(self.css) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Bad selector '{}': {:?}", self.css, e);
                return Vec::new();
            }
        };

        let matches: Vec<ElementRef> = document.select(&selector).collect();
        let picked: Vec<ElementRef> = match self.pick {
            Pick::First => matches.first().copied().into_iter().collect(),
            Pick::Nth(n) => matches.get(n).copied().into_iter().collect(),
            Pick::Last => matches.last().copied().into_iter().collect(),
            Pick::All => matches,
        };

        picked
            .into_iter()
            .flat_map(|el| read(el, self.read))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// First value read by this probe
    pub fn value(&self, document: &Html) -> Option<String> {
        self.values(document).into_iter().next()
    }
}

fn read(el: ElementRef, how: Read) -> Vec<String> {
    match how {
        Read::Text => vec![el.text().collect::<String>()],
        Read::OwnText => own_text(el),
        Read::ParentText => parent(el)
            .map(|p| vec![p.text().collect::<String>()])
            .unwrap_or_default(),
        Read::ParentOwnText => parent(el).map(own_text).unwrap_or_default(),
        Read::Attr(name) => el
            .value()
            .attr(name)
            .map(|v| vec![v.to_string()])
            .unwrap_or_default(),
    }
}

fn parent(el: ElementRef) -> Option<ElementRef> {
    el.parent().and_then(ElementRef::wrap)
}

fn own_text(el: ElementRef) -> Vec<String> {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|t| (&**t).to_string())
        .collect()
}

/// A named field and its ordered probes
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub probes: &'static [Probe],
}

impl Field {
    /// First probe value that `normalize` accepts
    pub fn first<T>(&self, document: &Html, normalize: impl Fn(&str) -> Option<T>) -> Option<T> {
        for probe in self.probes {
            if let Some(raw) = probe.value(document) {
                if let Some(parsed) = normalize(&raw) {
                    return Some(parsed);
                }
            }
        }
        None
    }

    /// All values of the first probe that yields any
    pub fn first_list(&self, document: &Html) -> Vec<String> {
        self.probes
            .iter()
            .map(|p| p.values(document))
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }
}

pub const NAME: Field = Field {
    name: "name",
    probes: &[
        Probe::text("[class='data-sheet__title']"),
        Probe::text("[class='restaurant-details__heading--title']"),
    ],
};

pub const DESCRIPTION: Field = Field {
    name: "description",
    probes: &[
        Probe::text("div[class*='data-sheet__description']"),
        Probe::text("[class*='js-show-description-text']"),
        Probe::text("div[class*='restaurant-details__description--text']"),
        Probe::text("div#opinion div[class*='tab__content-paragraph'] > p"),
    ],
};

pub const ADDRESS: Field = Field {
    name: "address",
    probes: &[
        Probe::text("[class*='data-sheet__block--text']"),
        Probe::text("[class*='restaurant-details__heading--address']"),
        Probe::text(
            "div[class*='collapse__block-title'] span[class*='fa-map-marker-alt'] ~ span[class*='flex-fill']",
        ),
        Probe::new("li > [class*='fa-map-marker-alt']", Pick::First, Read::ParentOwnText),
    ],
};

pub const PRICE_AND_CUISINE: Field = Field {
    name: "price_and_cuisine",
    probes: &[
        Probe::nth_text("div[class*='data-sheet__block--text']", 1),
        Probe::text("div[class*='restaurant-details__heading--price']"),
        Probe::text("[class*='restaurant-details__heading-price']"),
        Probe::new(
            "li > span[class*='jumbotron__card-detail--icon']",
            Pick::Last,
            Read::ParentText,
        ),
    ],
};

pub const PHONE: Field = Field {
    name: "phone_number",
    probes: &[
        Probe::attr("a[data-event='CTA_tel']", "href"),
        Probe::attr("a[href*='tel:']", "href"),
    ],
};

pub const WEBSITE: Field = Field {
    name: "website_url",
    probes: &[
        Probe::attr("a[data-event='CTA_website']", "href"),
        Probe::attr("a[class*='website']", "href"),
    ],
};

pub const FACILITIES: Field = Field {
    name: "facilities_and_services",
    probes: &[
        Probe::new("div[class*='col col-12 col-lg-6'] li", Pick::All, Read::Text),
        Probe::new(
            "div[class='restaurant-details__services'] div[class='restaurant-details__services--content']",
            Pick::All,
            Read::OwnText,
        ),
        Probe::new("div[class='restaurant-details__services'] li", Pick::All, Read::Text),
    ],
};

pub const GOOGLE_MAPS: Field = Field {
    name: "google_maps",
    probes: &[
        Probe::attr("div[class='google-map__static'] > iframe", "src"),
        Probe::attr("iframe[src*='google.com/maps']", "src"),
        Probe::attr("iframe[src*='maps.google']", "src"),
    ],
};

pub const MAP_LATITUDE: Field = Field {
    name: "map_latitude",
    probes: &[Probe::attr("div#map", "data-center-lat")],
};

pub const MAP_LONGITUDE: Field = Field {
    name: "map_longitude",
    probes: &[Probe::attr("div#map", "data-center-lng")],
};

pub const DISTINCTION: Field = Field {
    name: "distinction",
    probes: &[
        Probe::text("div[class='data-sheet__classification-item--content']"),
        Probe::text("ul[class*='restaurant-details__classification--list'] li"),
        Probe::text("div[class*='restaurant__classification'] p[class*='flex-fill']"),
        Probe::text("div[class*='classification']"),
    ],
};

pub const PRICE: Field = Field {
    name: "price",
    probes: &[
        Probe::nth_text("div[class*='data-sheet__block--text']", 1),
        Probe::text("div[class='col-lg-12'] > p"),
        Probe::text("[class*='restaurant-details__heading-price']"),
        Probe::text("span[class*='mg-price'], span[class*='mg-euro-circle']"),
        Probe::text("div[class*='data-sheet__block--text']"),
    ],
};

/// Elements whose own text may mention the Green Star
pub const GREEN_STAR_TEXT: Field = Field {
    name: "green_star",
    probes: &[Probe::new("div, span", Pick::All, Read::OwnText)],
};

pub const GREEN_STAR_MARKER: Field = Field {
    name: "green_star_marker",
    probes: &[Probe::new("div[class*='green-star']", Pick::First, Read::Attr("class"))],
};

pub const JSON_LD: Field = Field {
    name: "json_ld",
    probes: &[Probe::new("script[type='application/ld+json']", Pick::All, Read::Text)],
};

pub const SCRIPTS: Field = Field {
    name: "scripts",
    probes: &[Probe::new("script", Pick::All, Read::Text)],
};

pub const DATE_TEXT: Field = Field {
    name: "published_date",
    probes: &[
        Probe::text("div[class*='restaurant-details__heading--label-title']"),
        Probe::text("div[class*='label-text']"),
        Probe::attr("meta[name='description']", "content"),
    ],
};

/// Listing page: one element per restaurant card
pub const LISTING_CARD: &str = "div[class*='card__menu selection-card']";
pub const LISTING_DETAIL_LINK: &str = "a[class='link']";
pub const LISTING_LOCATION: &str = "div[class='card__menu-footer--score pl-text']";

/// Listing page: pagination arrows, newest markup first
pub const NEXT_PAGE: &[&str] = &[
    "li[class='arrow'] > a[class*='btn-outline-secondary']",
    "a[class*='btn-outline-secondary']",
];
