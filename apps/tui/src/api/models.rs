use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::OutletId;
use crate::geo::GeoPoint;

/// Body of `POST /chatbot/query`. Coordinates are omitted when unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl ChatQuery {
    pub fn new(query: impl Into<String>, location: Option<GeoPoint>) -> Self {
        Self {
            query: query.into(),
            lat: location.map(|point| point.lat),
            lon: location.map(|point| point.lon),
        }
    }
}

/// Answer from `POST /chatbot/query`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    /// Absent, null or empty all mean "clear the selection".
    #[serde(default, deserialize_with = "nullable_ids")]
    pub related_ids: Vec<OutletId>,
    #[serde(default, deserialize_with = "optional_center")]
    pub center: Option<GeoPoint>,
}

fn nullable_ids<'de, D>(deserializer: D) -> Result<Vec<OutletId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<OutletId>>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_center<'de, D>(deserializer: D) -> Result<Option<GeoPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };

    Ok(match items.as_slice() {
        [lat, lon] => lat
            .as_f64()
            .zip(lon.as_f64())
            .map(|(lat, lon)| GeoPoint::new(lat, lon)),
        _ => None,
    })
}
