//! Restaurant detail page extraction

use crate::client::RequestContext;
use crate::extract::selectors::{
    ADDRESS, DATE_TEXT, DESCRIPTION, DISTINCTION, FACILITIES, GOOGLE_MAPS,
    GREEN_STAR_MARKER, GREEN_STAR_TEXT, JSON_LD, MAP_LATITUDE, MAP_LONGITUDE, NAME, PHONE,
    PRICE, PRICE_AND_CUISINE, SCRIPTS, WEBSITE,
};
use crate::extract::{RestaurantData, Source};
use crate::parse::{
    coordinates_from_json_ld, coordinates_from_maps_src, dlayer_value, is_award_dlayer,
    is_green_star, join_facilities, location_from_address, map_price_category,
    normalize_address, normalize_whitespace, parse_distinction, parse_phone, parse_price,
    split_price_and_cuisine, year_from_text, year_from_value, Coordinates, Distinction,
};
use scraper::Html;
use serde_json::Value;

/// Builds a [`RestaurantData`] from a restaurant page of any layout generation
///
/// # Arguments
///
/// * `document` - The parsed page
/// * `url` - Canonical restaurant URL (for snapshots, the decoded original)
/// * `source` - Live page or Wayback snapshot
/// * `context` - Values carried over from the listing card, if any
///
/// # Returns
///
/// A filled record. Fields the page doesn't carry are empty, `year` is 0 when
/// no year could be found, and the distinction defaults to Selected Restaurants.
pub fn extract_restaurant(
    document: &Html,
    url: &str,
    source: Source,
    context: &RequestContext,
) -> RestaurantData {
    let json_ld = json_ld_objects(document);
    let dlayer = award_dlayer(document);

    let name = NAME.first(document, non_empty_ws).unwrap_or_default();
    let address = ADDRESS
        .first(document, |raw| non_empty(normalize_address(raw)))
        .unwrap_or_default();
    let description = DESCRIPTION.first(document, non_empty_ws).unwrap_or_default();

    let (price_candidate, cuisine) = PRICE_AND_CUISINE
        .first(document, non_empty_ws)
        .map(|block| split_price_and_cuisine(&block))
        .unwrap_or_default();

    let price = extract_price(document, &price_candidate, dlayer.as_deref());
    let distinction = extract_distinction(document, dlayer.as_deref());
    let green_star = extract_green_star(document, dlayer.as_deref());

    let phone_number = PHONE
        .first(document, |href| non_empty(parse_phone(href)))
        .unwrap_or_default();
    let website_url = WEBSITE.first(document, non_empty_ws).unwrap_or_default();
    let facilities_and_services = join_facilities(FACILITIES.first_list(document));

    let coordinates = context_coordinates(context)
        .or_else(|| extract_coordinates(document, &json_ld))
        .unwrap_or_default();

    let location = context
        .location
        .as_deref()
        .map(normalize_whitespace)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| location_from_address(&address));

    let year = extract_year(document, &json_ld).unwrap_or(0);

    RestaurantData {
        url: url.to_string(),
        name,
        description,
        address,
        location,
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
        cuisine,
        phone_number,
        facilities_and_services,
        website_url,
        year,
        distinction,
        price,
        green_star,
        source,
    }
}

/// Every JSON-LD object on the page, arrays and `@graph` flattened
pub fn json_ld_objects(document: &Html) -> Vec<Value> {
    let mut objects = Vec::new();
    for raw in JSON_LD.first_list(document) {
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => flatten_json_ld(value, &mut objects),
            Err(e) => tracing::debug!("Skipping malformed JSON-LD: {}", e),
        }
    }
    objects
}

fn flatten_json_ld(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_json_ld(item, out);
            }
        }
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten_json_ld(graph, out);
            }
            out.push(Value::Object(map));
        }
        _ => {}
    }
}

fn award_dlayer(document: &Html) -> Option<String> {
    SCRIPTS
        .first_list(document)
        .into_iter()
        .find(|script| is_award_dlayer(script))
}

fn extract_distinction(document: &Html, dlayer: Option<&str>) -> Distinction {
    DISTINCTION
        .first(document, |raw| Some(parse_distinction(raw)))
        .or_else(|| {
            dlayer
                .and_then(|s| dlayer_value(s, "distinction"))
                .map(|d| parse_distinction(&d))
        })
        .unwrap_or_default()
}

/// Price selectors, then the split-off block text, then the dLayer category
///
/// Free-form text that matches no known shape is kept as a last resort so a
/// priced page never ends up with an empty price.
fn extract_price(document: &Html, candidate: &str, dlayer: Option<&str>) -> String {
    PRICE
        .first(document, parse_price)
        .or_else(|| parse_price(candidate))
        .or_else(|| {
            dlayer
                .and_then(|s| dlayer_value(s, "price"))
                .map(|code| map_price_category(&code))
                .and_then(non_empty)
        })
        .or_else(|| non_empty(candidate.to_string()))
        .unwrap_or_default()
}

fn extract_green_star(document: &Html, dlayer: Option<&str>) -> bool {
    if GREEN_STAR_MARKER.first(document, |_| Some(())).is_some() {
        return true;
    }
    if GREEN_STAR_TEXT
        .first_list(document)
        .iter()
        .any(|text| is_green_star(text))
    {
        return true;
    }
    dlayer
        .and_then(|s| dlayer_value(s, "greenstar"))
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn context_coordinates(context: &RequestContext) -> Option<Coordinates> {
    match (&context.latitude, &context.longitude) {
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
        _ => None,
    }
}

/// JSON-LD, then the Google Maps iframe, then the map div's data attributes
fn extract_coordinates(document: &Html, json_ld: &[Value]) -> Option<Coordinates> {
    json_ld
        .iter()
        .find_map(coordinates_from_json_ld)
        .or_else(|| GOOGLE_MAPS.first(document, coordinates_from_maps_src))
        .or_else(|| {
            let lat = MAP_LATITUDE.first(document, non_empty_ws)?;
            let lng = MAP_LONGITUDE.first(document, non_empty_ws)?;
            Coordinates::new(&lat, &lng)
        })
}

/// JSON-LD award date, then year-bearing text in the date block or meta description
fn extract_year(document: &Html, json_ld: &[Value]) -> Option<i32> {
    json_ld
        .iter()
        .find_map(year_from_value)
        .or_else(|| DATE_TEXT.first(document, year_from_text))
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

fn non_empty_ws(raw: &str) -> Option<String> {
    non_empty(normalize_whitespace(raw))
}
