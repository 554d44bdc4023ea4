use geojson::{Geometry, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

/// Validated lat/lng in degrees. Deserializing goes through the same checks
/// as [`LatLng::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLatLng")]
pub struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawLatLng> for LatLng {
    type Error = CoordinateError;

    fn try_from(raw: RawLatLng) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }

    #[must_use]
    pub fn distance_km(self, other: Self, earth_radius_km: f64) -> f64 {
        haversine_km(self, other, earth_radius_km)
    }
}

impl TryFrom<(f64, f64)> for LatLng {
    type Error = CoordinateError;

    fn try_from((lat, lng): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lng)
    }
}

/// Great-circle distance on a sphere of radius `earth_radius_km`.
#[must_use]
pub fn haversine_km(p1: LatLng, p2: LatLng, earth_radius_km: f64) -> f64 {
    const EPSILON: f64 = 1e-12;

    if (p1.lat - p2.lat).abs() < EPSILON && (p1.lng - p2.lng).abs() < EPSILON {
        return 0.0;
    }

    let lat1_rad = p1.lat.to_radians();
    let lat2_rad = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);

    // rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().asin();

    earth_radius_km * c
}

/// GeoJSON `LineString` in `[lng, lat]` axis order, as map layers expect.
#[must_use]
pub fn line_string<I>(points: I) -> Geometry
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let positions = points
        .into_iter()
        .map(|(lat, lng)| vec![lng, lat])
        .collect();
    Geometry::new(Value::LineString(positions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_coordinates() {
        assert_eq!(LatLng::new(f64::NAN, 0.0), Err(CoordinateError::NonFinite));
        assert_eq!(
            LatLng::new(0.0, f64::INFINITY),
            Err(CoordinateError::NonFinite)
        );
        assert_eq!(
            LatLng::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            LatLng::new(0.0, -181.0),
            Err(CoordinateError::LongitudeOutOfRange(-181.0))
        );
        assert!(LatLng::new(90.0, 180.0).is_ok());
        assert!(LatLng::try_from((38.7, -9.1)).is_ok());
    }

    #[test]
    fn deserializing_validates() {
        let ok: LatLng = serde_json::from_str(r#"{"lat":38.7,"lng":-9.1}"#).unwrap();
        assert_eq!(ok, LatLng::new(38.7, -9.1).unwrap());

        assert!(serde_json::from_str::<LatLng>(r#"{"lat":91,"lng":0}"#).is_err());
        assert!(serde_json::from_str::<LatLng>(r#"{"lat":0,"lng":-181}"#).is_err());
    }

    #[test]
    fn same_point_is_zero() {
        let p = LatLng::new(38.7223, -9.1393).unwrap();
        assert_eq!(haversine_km(p, p, EARTH_RADIUS_KM), 0.0);
    }

    #[test]
    fn lisbon_to_porto() {
        let lisbon = LatLng::new(38.7223, -9.1393).unwrap();
        let porto = LatLng::new(41.1579, -8.6291).unwrap();
        let d = lisbon.distance_km(porto, EARTH_RADIUS_KM);
        assert!((d - 274.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn small_step_along_a_meridian() {
        let a = LatLng::new(38.7, -9.1).unwrap();
        let b = LatLng::new(38.7009, -9.1).unwrap();
        let expected = 0.0009_f64.to_radians() * EARTH_RADIUS_KM;
        assert!((haversine_km(a, b, EARTH_RADIUS_KM) - expected).abs() < 1e-9);
    }

    #[test]
    fn antipodal_is_half_circumference() {
        let a = LatLng::new(0.0, 0.0).unwrap();
        let b = LatLng::new(0.0, 180.0).unwrap();
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((haversine_km(a, b, EARTH_RADIUS_KM) - expected).abs() < 1e-6);
    }

    #[test]
    fn scales_with_radius() {
        let a = LatLng::new(38.7, -9.1).unwrap();
        let b = LatLng::new(38.8, -9.2).unwrap();
        let earth = haversine_km(a, b, EARTH_RADIUS_KM);
        let doubled = haversine_km(a, b, EARTH_RADIUS_KM * 2.0);
        assert!((doubled - 2.0 * earth).abs() < 1e-9);
    }

    #[test]
    fn line_string_swaps_axis_order() {
        let geometry = line_string([(38.7, -9.1), (38.8, -9.2)]);
        match geometry.value {
            Value::LineString(positions) => {
                assert_eq!(positions, vec![vec![-9.1, 38.7], vec![-9.2, 38.8]]);
            }
            other => panic!("expected a line string, got {other:?}"),
        }
    }
}
