//! Geometric point attached to every index object.

use serde::{Deserialize, Serialize};

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    latitude: f64,
    longitude: f64,
}

impl Point {
    /// Create a point from raw coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Start building a point.
    pub fn builder() -> PointBuilder {
        PointBuilder::default()
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Whether both coordinates are finite; JSON cannot carry NaN or infinity
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Builder for [`Point`]
#[derive(Debug, Default)]
pub struct PointBuilder {
    latitude: f64,
    longitude: f64,
}

impl PointBuilder {
    /// Set the latitude
    pub fn latitude(mut self, latitude: f64) -> Self {
        self.latitude = latitude;
        self
    }

    /// Set the longitude
    pub fn longitude(mut self, longitude: f64) -> Self {
        self.longitude = longitude;
        self
    }

    /// Build the point
    pub fn build(self) -> Point {
        Point::new(self.latitude, self.longitude)
    }
}
