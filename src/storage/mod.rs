//! Storage module for persisting restaurants and their awards
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Restaurant upserts keyed by canonical URL
//! - Award reconciliation between live and Wayback observations
//! - Read-only statistics queries

mod reconcile;
mod schema;
mod sqlite;
mod traits;

pub use reconcile::{reconcile, AwardChange};
pub use sqlite::SqliteRepository;
pub use traits::{Repository, StorageError, StorageResult};

use crate::extract::{RestaurantData, Source};
use crate::parse::{current_year, is_valid_year, Distinction};
use crate::HarvestError;
use std::path::Path;

/// Opens (creating if needed) the repository at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteRepository)` - Successfully initialized repository
/// * `Err(HarvestError)` - Failed to create the parent directory or open the database
pub fn open_repository(path: &Path) -> Result<SqliteRepository, HarvestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    SqliteRepository::new(path)
}

/// Mutable attributes of a restaurant, keyed by `url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restaurant {
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
}

impl Restaurant {
    /// Checks the columns that must be non-empty on insert
    pub fn validate(&self) -> StorageResult<()> {
        for (field, value) in [
            ("url", &self.url),
            ("name", &self.name),
            ("address", &self.address),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(StorageError::Validation(format!(
                    "restaurant {} is empty (url '{}')",
                    field, self.url
                )));
            }
        }
        Ok(())
    }
}

impl From<&RestaurantData> for Restaurant {
    fn from(data: &RestaurantData) -> Self {
        Self {
            url: data.url.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            address: data.address.clone(),
            location: data.location.clone(),
            latitude: data.latitude.clone(),
            longitude: data.longitude.clone(),
            cuisine: data.cuisine.clone(),
            phone_number: data.phone_number.clone(),
            facilities_and_services: data.facilities_and_services.clone(),
            website_url: data.website_url.clone(),
        }
    }
}

/// A restaurant row as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantRecord {
    pub id: i64,
    pub restaurant: Restaurant,
    pub created_at: String,
    pub updated_at: String,
}

/// The award a restaurant held in one guide year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantAward {
    pub restaurant_id: i64,
    pub year: i32,
    pub distinction: Distinction,
    pub price: String,
    pub green_star: bool,
    /// Live scrape or the snapshot it was read from
    pub source: Source,
}

impl RestaurantAward {
    /// The award part of an extracted record
    pub fn from_data(restaurant_id: i64, data: &RestaurantData) -> Self {
        Self {
            restaurant_id,
            year: data.year,
            distinction: data.distinction,
            price: data.price.clone(),
            green_star: data.green_star,
            source: data.source.clone(),
        }
    }

    /// Checks price and year before the award is written
    pub fn validate(&self) -> StorageResult<()> {
        if self.price.trim().is_empty() {
            return Err(StorageError::Validation(format!(
                "award price is empty (restaurant {}, year {})",
                self.restaurant_id, self.year
            )));
        }
        if !is_valid_year(self.year) {
            return Err(StorageError::Validation(format!(
                "award year {} outside 1900..={} (restaurant {})",
                self.year,
                current_year() + 1,
                self.restaurant_id
            )));
        }
        Ok(())
    }

    /// True when distinction, price and green star all match
    pub fn same_award(&self, other: &RestaurantAward) -> bool {
        self.distinction == other.distinction
            && self.price == other.price
            && self.green_star == other.green_star
    }
}

/// An award row as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardRecord {
    pub id: i64,
    pub award: RestaurantAward,
    pub created_at: String,
    pub updated_at: String,
}

/// Row counts for `mym stats`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseCounts {
    pub restaurants: u64,
    pub awards: u64,
    pub live_awards: u64,
    pub wayback_awards: u64,
    pub green_stars: u64,
}
