//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use super::{AwardRecord, AwardChange, DatabaseCounts, Restaurant, RestaurantAward, RestaurantRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every write goes through this interface; callers share one implementation
/// behind a mutex.
pub trait Repository {
    // ===== Restaurants =====

    /// Inserts a restaurant or refreshes the one with the same URL
    ///
    /// On conflict the ten mutable attributes and `updated_at` are
    /// overwritten; `created_at` is kept.
    ///
    /// # Returns
    ///
    /// The restaurant ID (either newly created or existing)
    fn save_restaurant(&mut self, restaurant: &Restaurant) -> StorageResult<i64>;

    /// Looks up a restaurant by canonical URL
    fn find_restaurant_by_url(&self, url: &str) -> StorageResult<Option<RestaurantRecord>>;

    /// Every restaurant with a non-empty URL, ordered by ID
    fn list_all_restaurants_with_url(&self) -> StorageResult<Vec<RestaurantRecord>>;

    // ===== Awards =====

    /// Gets the award for one restaurant and year
    fn find_award(&self, restaurant_id: i64, year: i32) -> StorageResult<Option<AwardRecord>>;

    /// Gets every award of a restaurant, oldest year first
    fn awards_for_restaurant(&self, restaurant_id: i64) -> StorageResult<Vec<AwardRecord>>;

    /// Validates and reconciles an award against the stored one for its year
    ///
    /// # Returns
    ///
    /// The change that was applied
    fn save_award(&mut self, award: &RestaurantAward) -> StorageResult<AwardChange>;

    // ===== Statistics =====

    fn counts(&self) -> StorageResult<DatabaseCounts>;

    /// Award counts per canonical distinction, in canonical order
    fn awards_by_distinction(&self) -> StorageResult<Vec<(String, u64)>>;

    /// Award counts per guide year, oldest first
    fn awards_by_year(&self) -> StorageResult<Vec<(i32, u64)>>;
}
