use crate::error::LocationError;
use crate::geo::GeoPoint;

/// One-shot source of the user's coordinates.
///
/// A terminal has no geolocation API, so the position comes from
/// configuration (`USER_LAT` / `USER_LON` or `--lat` / `--lon`).
#[derive(Debug, Clone, PartialEq)]
pub enum Geolocator {
    Fixed(GeoPoint),
    Misconfigured(String),
    Unsupported,
}

impl Geolocator {
    /// Builds a locator from the raw `USER_LAT` / `USER_LON` values.
    pub fn from_values(lat: Option<&str>, lon: Option<&str>) -> Self {
        match (lat, lon) {
            (None, None) => Self::Unsupported,
            (Some(lat), Some(lon)) => match (parse_degrees(lat, 90.0), parse_degrees(lon, 180.0)) {
                (Some(lat), Some(lon)) => Self::Fixed(GeoPoint::new(lat, lon)),
                _ => Self::Misconfigured(format!("invalid coordinates \"{lat}\", \"{lon}\"")),
            },
            _ => Self::Misconfigured("both latitude and longitude are required".to_string()),
        }
    }

    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    #[allow(clippy::unused_async)]
    pub async fn locate(&self) -> Result<GeoPoint, LocationError> {
        match self {
            Self::Fixed(point) => Ok(*point),
            Self::Misconfigured(reason) => Err(LocationError::Unavailable(reason.clone())),
            Self::Unsupported => Err(LocationError::Unsupported),
        }
    }
}

fn parse_degrees(value: &str, limit: f64) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|degrees| degrees.is_finite() && degrees.abs() <= limit)
}
