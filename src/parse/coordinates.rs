use serde_json::Value;
use url::Url;

/// A latitude/longitude pair kept as text to preserve source precision
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    /// Builds a pair when both halves are valid coordinates
    pub fn new(latitude: &str, longitude: &str) -> Option<Self> {
        let latitude = latitude.trim();
        let longitude = longitude.trim();
        if is_valid_coordinate(latitude) && is_valid_coordinate(longitude) {
            Some(Self {
                latitude: latitude.to_string(),
                longitude: longitude.to_string(),
            })
        } else {
            None
        }
    }
}

/// True when the text parses as a float within [-180, 180]
pub fn is_valid_coordinate(raw: &str) -> bool {
    raw.trim()
        .parse::<f64>()
        .is_ok_and(|v| v.is_finite() && (-180.0..=180.0).contains(&v))
}

/// Reads `latitude`/`longitude` from a JSON-LD object, top level first, then `geo`
pub fn coordinates_from_json_ld(value: &Value) -> Option<Coordinates> {
    pair_from(value).or_else(|| value.get("geo").and_then(pair_from))
}

fn pair_from(value: &Value) -> Option<Coordinates> {
    let latitude = coordinate_text(value.get("latitude")?)?;
    let longitude = coordinate_text(value.get("longitude")?)?;
    Coordinates::new(&latitude, &longitude)
}

fn coordinate_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        // f64 Display never uses exponent notation and drops a trailing ".0"
        Value::Number(n) => n.as_f64().map(|f| f.to_string()),
        _ => None,
    }
}

/// Reads the `q=lat,lng` parameter of an embedded Google Maps iframe
///
/// # Examples
///
/// ```
/// use michelin_my_maps::parse::coordinates_from_maps_src;
///
/// let c = coordinates_from_maps_src("https://www.google.com/maps/embed/v1/place?key=k&q=1.3047,103.8317").unwrap();
/// assert_eq!(c.latitude, "1.3047");
/// assert_eq!(c.longitude, "103.8317");
/// ```
pub fn coordinates_from_maps_src(src: &str) -> Option<Coordinates> {
    let src = if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    };
    let url = Url::parse(&src).ok()?;
    let q = url
        .query_pairs()
        .find(|(k, _)| k == "q")
        .map(|(_, v)| v.into_owned())?;

    let (latitude, longitude) = q.split_once(',')?;
    if longitude.contains(',') {
        return None;
    }
    Coordinates::new(latitude, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validity() {
        assert!(is_valid_coordinate("1.304"));
        assert!(is_valid_coordinate("-180"));
        assert!(is_valid_coordinate(" 103.83 "));
        assert!(!is_valid_coordinate("180.5"));
        assert!(!is_valid_coordinate("north"));
        assert!(!is_valid_coordinate(""));
        assert!(!is_valid_coordinate("NaN"));
    }

    #[test]
    fn test_json_ld_top_level_strings() {
        let value = json!({"latitude": "43.6123", "longitude": "0.9123"});
        assert_eq!(
            coordinates_from_json_ld(&value),
            Some(Coordinates {
                latitude: "43.6123".to_string(),
                longitude: "0.9123".to_string()
            })
        );
    }

    #[test]
    fn test_json_ld_geo_numbers() {
        let value = json!({"geo": {"@type": "GeoCoordinates", "latitude": 57.0649323, "longitude": 45}});
        let c = coordinates_from_json_ld(&value).unwrap();
        assert_eq!(c.latitude, "57.0649323");
        assert_eq!(c.longitude, "45");
    }

    #[test]
    fn test_json_ld_invalid_values() {
        assert_eq!(coordinates_from_json_ld(&json!({"latitude": "x", "longitude": "1"})), None);
        assert_eq!(coordinates_from_json_ld(&json!({"latitude": true, "longitude": 1})), None);
        assert_eq!(coordinates_from_json_ld(&json!({"name": "Les Amis"})), None);
    }

    #[test]
    fn test_maps_src() {
        let c = coordinates_from_maps_src("//maps.google.com/maps?q=48.8534,2.3488&z=15").unwrap();
        assert_eq!(c.latitude, "48.8534");
        assert_eq!(c.longitude, "2.3488");

        assert_eq!(coordinates_from_maps_src("https://www.google.com/maps?q=Paris"), None);
        assert_eq!(coordinates_from_maps_src("https://www.google.com/maps?q=1,2,3"), None);
        assert_eq!(coordinates_from_maps_src("https://www.google.com/maps"), None);
    }
}
