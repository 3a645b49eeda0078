//! URL handling
//!
//! Canonical restaurant URLs, host allow-lists, and the Wayback Machine's
//! CDX and snapshot URL formats.

mod domain;
mod normalize;
mod wayback;

pub use domain::{extract_domain, AllowedDomains};
pub use normalize::normalize_url;
pub use wayback::{
    cdx_lookup_url, extract_original_url, is_valid_timestamp, snapshot_url, TIMESTAMP_LEN,
};
