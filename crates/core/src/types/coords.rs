//! Geographic coordinates for business locations.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Coordinates`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoordinatesError {
    /// Latitude outside the -90..=90 range.
    #[error("latitude {0} out of range (-90..=90)")]
    LatitudeOutOfRange(f64),
    /// Longitude outside the -180..=180 range.
    #[error("longitude {0} out of range (-180..=180)")]
    LongitudeOutOfRange(f64),
    /// A coordinate was not a finite number.
    #[error("coordinates must be finite numbers")]
    NotFinite,
}

/// A validated latitude/longitude pair.
///
/// The device locator is the source of these values; validation here only
/// guards against garbage making it into a listing record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create coordinates, validating the ranges.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is non-finite or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinatesError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let c = Coordinates::new(12.9716, 77.5946).unwrap();
        assert!((c.latitude() - 12.9716).abs() < f64::EPSILON);
        assert!((c.longitude() - 77.5946).abs() < f64::EPSILON);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(
            Coordinates::new(91.0, 0.0),
            Err(CoordinatesError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coordinates::new(0.0, -181.0),
            Err(CoordinatesError::LongitudeOutOfRange(-181.0))
        );
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(
            Coordinates::new(f64::NAN, 0.0),
            Err(CoordinatesError::NotFinite)
        );
    }
}
