//! Page extractors
//!
//! Pure functions from one fetched HTML document to structured values. The
//! listing extractor enumerates restaurant cards; the detail extractor builds a
//! [`RestaurantData`] from any historical layout of a restaurant page.

mod detail;
mod listing;
pub mod selectors;

pub use detail::{extract_restaurant, json_ld_objects};
pub use listing::{extract_listing, ListingCard, ListingPage};

use crate::parse::Distinction;

/// Where an observation came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The live guide
    Live,
    /// A Wayback Machine snapshot
    Wayback { snapshot_url: String },
}

impl Source {
    /// Snapshot URL for Wayback observations, empty for live ones
    pub fn wayback_url(&self) -> &str {
        match self {
            Source::Live => "",
            Source::Wayback { snapshot_url } => snapshot_url,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Source::Live)
    }
}

/// Everything one detail page tells us about a restaurant and its award
///
/// String fields are empty when the page doesn't carry them; `year` is 0 when
/// unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantData {
    pub url: String,
    pub name: String,
    pub description: String,
    pub address: String,
    pub location: String,
    pub latitude: String,
    pub longitude: String,
    pub cuisine: String,
    pub phone_number: String,
    pub facilities_and_services: String,
    pub website_url: String,

    pub year: i32,
    pub distinction: Distinction,
    pub price: String,
    pub green_star: bool,
    pub source: Source,
}
