//! Geographic value objects.

use geo::{HaversineDistance, Point};

/// A latitude/longitude pair in decimal degrees.
///
/// No bounds are enforced: any finite or non-finite pair is accepted, which
/// matches how reports arrive from handsets with unreliable fixes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPosition {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl GeoPosition {
    /// Create a new position
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Convert to a `geo` point (x = longitude, y = latitude)
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance to another position in kilometres
    pub fn distance_km(&self, other: &GeoPosition) -> f64 {
        self.to_point().haversine_distance(&other.to_point()) / 1000.0
    }
}

impl From<Point<f64>> for GeoPosition {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// A named place on the map.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Coordinates
    pub position: GeoPosition,
    /// Human-readable place name
    pub name: String,
}

impl Location {
    /// Create a new location
    pub fn new(latitude: f64, longitude: f64, name: impl Into<String>) -> Self {
        Self {
            position: GeoPosition::new(latitude, longitude),
            name: name.into(),
        }
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.position.latitude
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.position.longitude
    }
}
