//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Repository trait.

use crate::extract::Source;
use crate::parse::Distinction;
use crate::storage::reconcile::{reconcile, AwardChange};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Repository, StorageError, StorageResult};
use crate::storage::{AwardRecord, DatabaseCounts, Restaurant, RestaurantAward, RestaurantRecord};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RESTAURANT_COLUMNS: &str = "id, url, name, description, address, location, latitude, \
     longitude, cuisine, phone_number, facilities_and_services, website_url, created_at, updated_at";

const AWARD_COLUMNS: &str =
    "id, restaurant_id, year, distinction, price, green_star, wayback_url, created_at, updated_at";

/// SQLite storage backend
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new SqliteRepository instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRepository)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.set_prepared_statement_cache_capacity(32);

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn restaurant_from_row(row: &Row) -> rusqlite::Result<RestaurantRecord> {
    Ok(RestaurantRecord {
        id: row.get(0)?,
        restaurant: Restaurant {
            url: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            address: row.get(4)?,
            location: row.get(5)?,
            latitude: row.get(6)?,
            longitude: row.get(7)?,
            cuisine: row.get(8)?,
            phone_number: row.get(9)?,
            facilities_and_services: row.get(10)?,
            website_url: row.get(11)?,
        },
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn award_from_row(row: &Row) -> rusqlite::Result<AwardRecord> {
    let distinction: String = row.get(3)?;
    let distinction = distinction.parse::<Distinction>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;
    let wayback_url: String = row.get(6)?;
    let source = if wayback_url.is_empty() {
        Source::Live
    } else {
        Source::Wayback {
            snapshot_url: wayback_url,
        }
    };

    Ok(AwardRecord {
        id: row.get(0)?,
        award: RestaurantAward {
            restaurant_id: row.get(1)?,
            year: row.get(2)?,
            distinction,
            price: row.get(4)?,
            green_star: row.get(5)?,
            source,
        },
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

impl Repository for SqliteRepository {
    // ===== Restaurants =====

    fn save_restaurant(&mut self, restaurant: &Restaurant) -> StorageResult<i64> {
        restaurant.validate()?;
        let now = Utc::now().to_rfc3339();

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO restaurants (
                url, name, description, address, location, latitude, longitude,
                cuisine, phone_number, facilities_and_services, website_url,
                created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
             ON CONFLICT(url) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                address = excluded.address,
                location = excluded.location,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                cuisine = excluded.cuisine,
                phone_number = excluded.phone_number,
                facilities_and_services = excluded.facilities_and_services,
                website_url = excluded.website_url,
                updated_at = excluded.updated_at
             RETURNING id",
        )?;

        let id = stmt.query_row(
            params![
                restaurant.url,
                restaurant.name,
                restaurant.description,
                restaurant.address,
                restaurant.location,
                restaurant.latitude,
                restaurant.longitude,
                restaurant.cuisine,
                restaurant.phone_number,
                restaurant.facilities_and_services,
                restaurant.website_url,
                now,
            ],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn find_restaurant_by_url(&self, url: &str) -> StorageResult<Option<RestaurantRecord>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM restaurants WHERE url = ?1",
            RESTAURANT_COLUMNS
        ))?;

        let restaurant = stmt
            .query_row(params![url], restaurant_from_row)
            .optional()?;

        Ok(restaurant)
    }

    fn list_all_restaurants_with_url(&self) -> StorageResult<Vec<RestaurantRecord>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM restaurants WHERE url <> '' ORDER BY id",
            RESTAURANT_COLUMNS
        ))?;

        let restaurants = stmt
            .query_map([], restaurant_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(restaurants)
    }

    // ===== Awards =====

    fn find_award(&self, restaurant_id: i64, year: i32) -> StorageResult<Option<AwardRecord>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM restaurant_awards WHERE restaurant_id = ?1 AND year = ?2",
            AWARD_COLUMNS
        ))?;

        let award = stmt
            .query_row(params![restaurant_id, year], award_from_row)
            .optional()?;

        Ok(award)
    }

    fn awards_for_restaurant(&self, restaurant_id: i64) -> StorageResult<Vec<AwardRecord>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {} FROM restaurant_awards WHERE restaurant_id = ?1 ORDER BY year",
            AWARD_COLUMNS
        ))?;

        let awards = stmt
            .query_map(params![restaurant_id], award_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(awards)
    }

    fn save_award(&mut self, award: &RestaurantAward) -> StorageResult<AwardChange> {
        award.validate()?;

        let exists: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM restaurants WHERE id = ?1",
                params![award.restaurant_id],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StorageError::RestaurantNotFound(award.restaurant_id));
        }

        let existing = self.find_award(award.restaurant_id, award.year)?;
        let change = reconcile(existing.as_ref().map(|r| &r.award), award);
        let now = Utc::now().to_rfc3339();

        match (change, existing) {
            (AwardChange::Insert, _) => {
                self.conn.execute(
                    "INSERT INTO restaurant_awards (
                        restaurant_id, year, distinction, price, green_star, wayback_url,
                        created_at, updated_at
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                    params![
                        award.restaurant_id,
                        award.year,
                        award.distinction.as_str(),
                        award.price,
                        award.green_star,
                        award.source.wayback_url(),
                        now,
                    ],
                )?;
            }
            (
                AwardChange::Update {
                    distinction_changed,
                },
                Some(existing),
            ) => {
                if distinction_changed && !award.source.is_live() {
                    tracing::warn!(
                        "Wayback changes distinction of restaurant {} in {}: {} -> {} ({})",
                        award.restaurant_id,
                        award.year,
                        existing.award.distinction,
                        award.distinction,
                        award.source.wayback_url()
                    );
                }
                self.conn.execute(
                    "UPDATE restaurant_awards
                     SET distinction = ?1, price = ?2, green_star = ?3, year = ?4,
                         wayback_url = ?5, updated_at = ?6
                     WHERE id = ?7",
                    params![
                        award.distinction.as_str(),
                        award.price,
                        award.green_star,
                        award.year,
                        award.source.wayback_url(),
                        now,
                        existing.id,
                    ],
                )?;
            }
            (AwardChange::Update { .. }, None) | (AwardChange::Unchanged, _) => {}
        }

        tracing::debug!(
            "Award for restaurant {} in {}: {:?}",
            award.restaurant_id,
            award.year,
            change
        );
        Ok(change)
    }

    // ===== Statistics =====

    fn counts(&self) -> StorageResult<DatabaseCounts> {
        let restaurants: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM restaurants", [], |row| row.get(0))?;

        let (awards, wayback_awards, green_stars): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(wayback_url <> ''), 0),
                    COALESCE(SUM(green_star), 0)
             FROM restaurant_awards",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(DatabaseCounts {
            restaurants: restaurants as u64,
            awards: awards as u64,
            live_awards: (awards - wayback_awards) as u64,
            wayback_awards: wayback_awards as u64,
            green_stars: green_stars as u64,
        })
    }

    fn awards_by_distinction(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT COUNT(*) FROM restaurant_awards WHERE distinction = ?1",
        )?;

        let mut counts = Vec::with_capacity(Distinction::ALL.len());
        for distinction in Distinction::ALL {
            let count: i64 = stmt.query_row(params![distinction.as_str()], |row| row.get(0))?;
            counts.push((distinction.as_str().to_string(), count as u64));
        }

        Ok(counts)
    }

    fn awards_by_year(&self) -> StorageResult<Vec<(i32, u64)>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT year, COUNT(*) FROM restaurant_awards GROUP BY year ORDER BY year",
        )?;

        let years = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i32>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(years)
    }
}
