//! Great-circle distance, radius membership and bounding boxes.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use crate::domain::{Outlet, OutletId};
use crate::store::OutletStore;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius used for the proximity overlay. Fixed, not configurable.
pub const RADIUS_KM: f64 = 5.0;

const KM_PER_LAT_DEGREE: f64 = EARTH_RADIUS_KM * PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    pub fn distance_km(self, other: Self) -> f64 {
        haversine_km(self, other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Haversine distance in kilometres. Non-finite input yields NaN.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// True when `candidate` lies within [`RADIUS_KM`] of the outlet `reference_id`.
///
/// An outlet is never within its own radius, and an unknown or unplaceable
/// reference matches nothing.
pub fn is_within_radius(store: &OutletStore, candidate: &Outlet, reference_id: OutletId) -> bool {
    if candidate.id == reference_id {
        return false;
    }

    let Some(reference) = store.get(reference_id) else {
        return false;
    };

    match (reference.position(), candidate.position()) {
        (Some(from), Some(to)) => from.distance_km(to) <= RADIUS_KM,
        _ => false,
    }
}

pub fn km_to_lat_degrees(km: f64) -> f64 {
    km / KM_PER_LAT_DEGREE
}

/// Longitude span of `km` at the given latitude. Clamped near the poles.
pub fn km_to_lon_degrees(km: f64, lat: f64) -> f64 {
    let scale = lat.to_radians().cos().abs().max(0.01);
    km_to_lat_degrees(km) / scale
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                None => Self {
                    south: point.lat,
                    west: point.lon,
                    north: point.lat,
                    east: point.lon,
                },
                Some(b) => Self {
                    south: b.south.min(point.lat),
                    west: b.west.min(point.lon),
                    north: b.north.max(point.lat),
                    east: b.east.max(point.lon),
                },
            })
        })
    }

    /// Finite corners in the right order. A single point is still valid.
    pub fn is_valid(&self) -> bool {
        [self.south, self.west, self.north, self.east]
            .iter()
            .all(|value| value.is_finite())
            && self.south <= self.north
            && self.west <= self.east
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lon)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.5}, {:.5}] - [{:.5}, {:.5}]",
            self.south, self.west, self.north, self.east
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outlet(id: OutletId, lat: f64, lon: f64) -> Outlet {
        Outlet {
            id,
            name: format!("Outlet {id}"),
            address: String::new(),
            latitude: Some(lat),
            longitude: Some(lon),
            operating_hours: String::new(),
            google_maps_link: None,
            waze_link: None,
        }
    }

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < tolerance,
            "expected {expected}, got {actual}, diff {diff}"
        );
    }

    #[test]
    fn known_distance_between_cities() {
        // Kuala Lumpur to Singapore, roughly 316 km as the crow flies.
        let kl = GeoPoint::new(3.139, 101.6869);
        let sg = GeoPoint::new(1.3521, 103.8198);
        assert_close(haversine_km(kl, sg), 316.0, 3.0);
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = GeoPoint::new(3.0, 101.0);
        let b = GeoPoint::new(3.01, 101.01);

        assert_close(haversine_km(a, b), haversine_km(b, a), 1e-12);
        assert_close(haversine_km(a, a), 0.0, 1e-12);
    }

    #[test]
    fn non_finite_input_yields_nan() {
        let a = GeoPoint::new(f64::NAN, 101.0);
        let b = GeoPoint::new(3.0, 101.0);
        assert!(haversine_km(a, b).is_nan());
    }

    #[test]
    fn radius_excludes_self_and_unknown_reference() {
        let store = OutletStore::from_outlets(vec![outlet(1, 3.0, 101.0), outlet(2, 3.01, 101.01)]);
        let first = store.get(1).cloned();
        let Some(first) = first else {
            panic!("outlet 1 should be in the store");
        };

        assert!(!is_within_radius(&store, &first, 1));
        assert!(!is_within_radius(&store, &first, 99));
        assert!(is_within_radius(&store, &first, 2));
    }

    #[test]
    fn radius_boundary_is_inclusive_of_nearby_and_excludes_far() {
        // 0.044 degrees of latitude is about 4.9 km, 0.046 about 5.1 km.
        let store = OutletStore::from_outlets(vec![
            outlet(1, 3.0, 101.0),
            outlet(2, 3.044, 101.0),
            outlet(3, 3.046, 101.0),
        ]);

        let near = store.get(2).cloned();
        let far = store.get(3).cloned();
        let (Some(near), Some(far)) = (near, far) else {
            panic!("outlets 2 and 3 should be in the store");
        };

        assert!(is_within_radius(&store, &near, 1));
        assert!(!is_within_radius(&store, &far, 1));
    }

    #[test]
    fn bounding_box_covers_all_points() {
        let bounds = BoundingBox::from_points([
            GeoPoint::new(3.0, 101.0),
            GeoPoint::new(3.01, 101.01),
            GeoPoint::new(2.99, 101.005),
        ]);

        let Some(bounds) = bounds else {
            panic!("expected a bounding box");
        };
        assert!(bounds.is_valid());
        assert_close(bounds.south, 2.99, 1e-12);
        assert_close(bounds.north, 3.01, 1e-12);
        assert_close(bounds.west, 101.0, 1e-12);
        assert_close(bounds.east, 101.01, 1e-12);
        assert!(bounds.contains(GeoPoint::new(3.0, 101.005)));
    }

    #[test]
    fn bounding_box_rejects_nan_and_empty_input() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());

        let bounds = BoundingBox::from_points([GeoPoint::new(f64::NAN, 101.0)]);
        assert!(bounds.is_some_and(|b| !b.is_valid()));
    }

    #[test]
    fn km_conversion_matches_earth_radius() {
        assert_close(km_to_lat_degrees(KM_PER_LAT_DEGREE), 1.0, 1e-12);
        assert!(km_to_lon_degrees(5.0, 60.0) > km_to_lat_degrees(5.0));
    }
}
