//! The unit of storage in a spatial index.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// An identifier, an opaque payload and the point it is located at.
///
/// `T` identifies the object (an ID or UUID), `O` is whatever the
/// application stores alongside it (a vendor, a restaurant, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexObject<T, O> {
    id: T,
    data: O,
    point: Point,
}

impl<T, O> IndexObject<T, O> {
    /// Create an object at an already-built point.
    pub fn new(id: T, data: O, point: Point) -> Self {
        Self { id, data, point }
    }

    /// Start building an object from raw coordinates.
    pub fn builder() -> IndexObjectBuilder<T, O> {
        IndexObjectBuilder::default()
    }

    /// Identifier of the object
    pub fn id(&self) -> &T {
        &self.id
    }

    /// Payload of the object
    pub fn data(&self) -> &O {
        &self.data
    }

    /// Location of the object
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// Replace the payload
    pub fn set_data(&mut self, data: O) {
        self.data = data;
    }

    /// Move the object
    pub fn set_point(&mut self, point: Point) {
        self.point = point;
    }

    /// Split into identifier, payload and point.
    pub fn into_parts(self) -> (T, O, Point) {
        (self.id, self.data, self.point)
    }
}

/// Builder for [`IndexObject`]
///
/// The point is derived from the latitude/longitude pair when
/// [`build`](IndexObjectBuilder::build) is called.
#[derive(Debug)]
pub struct IndexObjectBuilder<T, O> {
    id: Option<T>,
    data: Option<O>,
    latitude: f64,
    longitude: f64,
}

impl<T, O> Default for IndexObjectBuilder<T, O> {
    fn default() -> Self {
        Self {
            id: None,
            data: None,
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

impl<T, O> IndexObjectBuilder<T, O> {
    /// Set the identifier
    pub fn id(mut self, id: T) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the payload
    pub fn data(mut self, data: O) -> Self {
        self.data = Some(data);
        self
    }

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

    /// Build the object
    ///
    /// Fails if the identifier or payload was never set, or if either
    /// coordinate is NaN or infinite.
    pub fn build(self) -> crate::Result<IndexObject<T, O>> {
        let id = self.id.ok_or_else(|| {
            crate::Error::InvalidOperation("index object requires an id".to_string())
        })?;
        let data = self.data.ok_or_else(|| {
            crate::Error::InvalidOperation("index object requires data".to_string())
        })?;

        let point = Point::builder()
            .latitude(self.latitude)
            .longitude(self.longitude)
            .build();
        if !point.is_finite() {
            return Err(crate::Error::InvalidOperation(format!(
                "index object coordinates must be finite, got ({}, {})",
                self.latitude, self.longitude
            )));
        }

        Ok(IndexObject::new(id, data, point))
    }
}
