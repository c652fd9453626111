//! Geographic helpers: coordinate validation, great-circle distance and
//! meeting-point calculation.

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Mean Earth radius used by the Haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of Greenwich.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> AppResult<Self> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check that latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn validate(&self) -> AppResult<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::Validation(format!(
                "latitude must be between -90 and 90, got {}",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::Validation(format!(
                "longitude must be between -180 and 180, got {}",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Great-circle distance to `other`, in kilometres.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Great-circle distance between two coordinates using the Haversine formula.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Arithmetic mean of the given coordinates.
///
/// Returns `None` for an empty slice. A single point is its own centroid.
#[must_use]
pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
    match points {
        [] => None,
        [only] => Some(*only),
        _ => {
            let n = points.len() as f64;
            let (lat_sum, lon_sum) = points.iter().fold((0.0, 0.0), |(lat, lon), p| {
                (lat + p.latitude, lon + p.longitude)
            });
            Some(Coordinate {
                latitude: lat_sum / n,
                longitude: lon_sum / n,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TAIPEI_101: Coordinate = Coordinate {
        latitude: 25.0340,
        longitude: 121.5645,
    };
    const TAIPEI_MAIN: Coordinate = Coordinate {
        latitude: 25.0478,
        longitude: 121.5170,
    };

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(TAIPEI_101.distance_to(&TAIPEI_101), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let ab = haversine_km(TAIPEI_101, TAIPEI_MAIN);
        let ba = haversine_km(TAIPEI_MAIN, TAIPEI_101);
        assert!((ab - ba).abs() < 1e-9);
        // Roughly 5 km across the city.
        assert!(ab > 4.5 && ab < 5.5, "unexpected distance {ab}");
    }

    #[test]
    fn test_quarter_meridian() {
        let equator = Coordinate::new(0.0, 0.0).unwrap();
        let pole = Coordinate::new(90.0, 0.0).unwrap();
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((equator.distance_to(&pole) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(0.0, 180.0).unwrap();
        let d = a.distance_to(&b);
        assert!(d.is_finite());
        assert!((d - EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_coordinate_range_validation() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(matches!(
            Coordinate::new(90.5, 0.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            Coordinate::new(0.0, -181.0),
            Err(AppError::Validation(_))
        ));
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_centroid_of_identical_points() {
        let points = vec![TAIPEI_101; 4];
        assert_eq!(centroid(&points), Some(TAIPEI_101));
    }

    #[test]
    fn test_centroid_of_symmetric_pair_is_midpoint() {
        let a = Coordinate::new(10.0, 20.0).unwrap();
        let b = Coordinate::new(-10.0, -20.0).unwrap();
        let c = centroid(&[a, b]).unwrap();
        assert!(c.latitude.abs() < 1e-12);
        assert!(c.longitude.abs() < 1e-12);
    }

    #[test]
    fn test_centroid_single_and_empty() {
        assert_eq!(centroid(&[TAIPEI_MAIN]), Some(TAIPEI_MAIN));
        assert_eq!(centroid(&[]), None);
    }
}
