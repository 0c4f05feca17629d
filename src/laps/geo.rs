//! Great-circle distance between GPS fixes.

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// `None` for the (0, 0) fix the simulator writes when it has no position.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() || (lat == 0.0 && lon == 0.0) {
            return None;
        }
        Some(Self { lat, lon })
    }

    /// Haversine distance in metres.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(10.0, 20.0).unwrap();
        let b = GeoPoint::new(11.0, 20.0).unwrap();
        assert!((a.distance_m(&b) - 111_195.0).abs() < 1.0);
    }

    #[test]
    fn null_island_means_no_fix() {
        assert!(GeoPoint::new(0.0, 0.0).is_none());
        assert!(GeoPoint::new(f64::NAN, 1.0).is_none());
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(
            lat1 in -80.0f64..80.0, lon1 in -179.0f64..179.0,
            lat2 in -80.0f64..80.0, lon2 in -179.0f64..179.0,
        ) {
            let a = GeoPoint { lat: lat1, lon: lon1 };
            let b = GeoPoint { lat: lat2, lon: lon2 };
            prop_assert!((a.distance_m(&b) - b.distance_m(&a)).abs() < 1e-6);
            prop_assert!(a.distance_m(&a) < 1e-9);
        }
    }
}
