//! Database schema definitions
//!
//! This module contains the SQL schema for the restaurant database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per establishment, keyed by its canonical guide URL
CREATE TABLE IF NOT EXISTS restaurants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE CHECK (url <> ''),
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL,
    location TEXT NOT NULL,
    latitude TEXT NOT NULL DEFAULT '',
    longitude TEXT NOT NULL DEFAULT '',
    cuisine TEXT NOT NULL DEFAULT '',
    phone_number TEXT NOT NULL DEFAULT '',
    facilities_and_services TEXT NOT NULL DEFAULT '',
    website_url TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_restaurants_name ON restaurants(name);
CREATE INDEX IF NOT EXISTS idx_restaurants_location ON restaurants(location);

-- One award per restaurant and guide year
CREATE TABLE IF NOT EXISTS restaurant_awards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
    year INTEGER NOT NULL,
    distinction TEXT NOT NULL CHECK (
        distinction IN ('3 Stars', '2 Stars', '1 Star', 'Bib Gourmand', 'Selected Restaurants')
    ),
    price TEXT NOT NULL CHECK (price <> ''),
    green_star INTEGER NOT NULL DEFAULT 0,
    wayback_url TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(restaurant_id, year)
);

CREATE INDEX IF NOT EXISTS idx_restaurant_awards_year ON restaurant_awards(year);
CREATE INDEX IF NOT EXISTS idx_restaurant_awards_distinction ON restaurant_awards(distinction);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Initialize twice
        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_and_indexes_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for (kind, name) in [
            ("table", "restaurants"),
            ("table", "restaurant_awards"),
            ("index", "idx_restaurants_name"),
            ("index", "idx_restaurants_location"),
            ("index", "idx_restaurant_awards_year"),
            ("index", "idx_restaurant_awards_distinction"),
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2",
                    [kind, name],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "{} {} should exist", kind, name);
        }
    }

    #[test]
    fn test_award_uniqueness_is_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO restaurants (url, name, address, location, created_at, updated_at)
             VALUES ('https://guide.michelin.com/en/x', 'X', 'A', 'L', 'now', 'now')",
            [],
        )
        .unwrap();

        let insert = "INSERT INTO restaurant_awards
            (restaurant_id, year, distinction, price, created_at, updated_at)
            VALUES (1, 2024, '1 Star', '$$', 'now', 'now')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }

    #[test]
    fn test_non_canonical_distinction_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO restaurants (url, name, address, location, created_at, updated_at)
             VALUES ('https://guide.michelin.com/en/x', 'X', 'A', 'L', 'now', 'now')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO restaurant_awards
             (restaurant_id, year, distinction, price, created_at, updated_at)
             VALUES (1, 2024, 'three stars', '$$', 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }
}
