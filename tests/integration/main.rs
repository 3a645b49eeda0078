//! Integration tests for the scrape and backfill flows
//!
//! These tests use wiremock to stand in for both the guide and the Wayback
//! Machine, and run each flow end-to-end against a temporary database.

mod backfill_tests;
mod common;
mod scrape_tests;
