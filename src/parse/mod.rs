//! Field-level normalizers
//!
//! Each parser turns one piece of raw page text into its stored form. None of
//! them fail loudly: unrecognized input becomes `None`, an empty string, or a
//! documented default, and the record carries on.

mod coordinates;
mod distinction;
mod dlayer;
mod location;
mod phone;
mod price;
mod text;
mod year;

pub use coordinates::{
    coordinates_from_json_ld, coordinates_from_maps_src, is_valid_coordinate, Coordinates,
};
pub use distinction::{is_green_star, parse_distinction, Distinction};
pub use dlayer::{dlayer_value, is_award_dlayer};
pub use location::location_from_address;
pub use phone::parse_phone;
pub use price::{map_price_category, parse_price};
pub use text::{
    join_facilities, normalize_address, normalize_whitespace, split_price_and_cuisine,
    PRICE_CUISINE_DELIMITERS,
};
pub use year::{
    current_year, is_valid_year, parse_year, year_from_json_ld, year_from_text, year_from_value,
};
