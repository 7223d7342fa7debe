use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees in `[-90, 90]`.
    pub latitude: f64,
    /// Degrees in `[-180, 180]`.
    pub longitude: f64,
}

impl GeoPoint {
    /// Constructs a validated geo-point.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::OutOfBounds {
                field: "latitude",
                value: latitude.to_string(),
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::OutOfBounds {
                field: "longitude",
                value: longitude.to_string(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// True when both components are equal.
    pub fn is_equal(&self, other: &GeoPoint) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_compares_both_components() {
        let a = GeoPoint::new(37.4, -122.1).unwrap();
        assert!(a.is_equal(&GeoPoint::new(37.4, -122.1).unwrap()));
        assert!(!a.is_equal(&GeoPoint::new(37.4, 122.1).unwrap()));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -181.0).is_err());
    }
}
