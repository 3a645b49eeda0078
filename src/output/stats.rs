//! Statistics generation from the restaurant database
//!
//! This module provides functionality for extracting and displaying
//! database statistics from the storage layer.

use crate::storage::{DatabaseCounts, Repository};
use crate::HarvestError;
use std::fmt::Write;

/// Database statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseStatistics {
    /// Row counts per table and award source
    pub counts: DatabaseCounts,

    /// Awards per canonical distinction
    pub awards_by_distinction: Vec<(String, u64)>,

    /// Awards per guide year, oldest first
    pub awards_by_year: Vec<(i32, u64)>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `repository` - The storage backend to query
///
/// # Returns
///
/// * `Ok(DatabaseStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(repository: &dyn Repository) -> Result<DatabaseStatistics, HarvestError> {
    Ok(DatabaseStatistics {
        counts: repository.counts()?,
        awards_by_distinction: repository.awards_by_distinction()?,
        awards_by_year: repository.awards_by_year()?,
    })
}

/// Renders statistics as the text `mym stats` prints
pub fn format_statistics(stats: &DatabaseStatistics) -> String {
    let mut out = String::new();
    let counts = &stats.counts;

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Database Statistics ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Restaurants: {}", counts.restaurants);
    let _ = writeln!(
        out,
        "  Awards: {} ({} live, {} from Wayback)",
        counts.awards, counts.live_awards, counts.wayback_awards
    );
    let _ = writeln!(out, "  Green Stars: {}", counts.green_stars);
    let _ = writeln!(out);

    let _ = writeln!(out, "Awards by Distinction:");
    for (distinction, count) in &stats.awards_by_distinction {
        let percentage = if counts.awards > 0 {
            (*count as f64 / counts.awards as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", distinction, count, percentage);
    }

    if !stats.awards_by_year.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Awards by Year:");
        for (year, count) in &stats.awards_by_year {
            let _ = writeln!(out, "  {}: {}", year, count);
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatabaseStatistics) {
    print!("{}", format_statistics(stats));
}
