//! Output module for reporting on the populated database
//!
//! This module handles the read-only `stats` view: row counts, awards per
//! distinction and awards per guide year.

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, DatabaseStatistics};
