use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 position. Serialized as a `[longitude, latitude]` pair, the same
/// order GeoJSON uses.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    longitude: f64,
    latitude: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InvalidCoordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid coordinate: lng={}, lat={}",
            self.longitude, self.latitude
        )
    }
}

impl std::error::Error for InvalidCoordinate {}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, InvalidCoordinate> {
        // NaN fails both range checks, infinities are out of range anyway.
        if (-180.0..=180.0).contains(&longitude) && (-90.0..=90.0).contains(&latitude) {
            Ok(Coordinate {
                longitude,
                latitude,
            })
        } else {
            Err(InvalidCoordinate {
                longitude,
                latitude,
            })
        }
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// `true` when both axes differ by no more than `epsilon`. This is a
    /// per-axis comparison in degrees, not a geodesic distance.
    pub fn is_within(&self, other: &Coordinate, epsilon: f64) -> bool {
        (self.longitude - other.longitude).abs() <= epsilon
            && (self.latitude - other.latitude).abs() <= epsilon
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from((longitude, latitude): (f64, f64)) -> Result<Self, Self::Error> {
        Coordinate::new(longitude, latitude)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.longitude, c.latitude)
    }
}

impl From<Coordinate> for geo_types::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo_types::Coord {
            x: c.longitude,
            y: c.latitude,
        }
    }
}

/// A raw location update as delivered by a position source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub timestamp_ms: i64,
    pub accuracy: Option<f32>,
    pub altitude: Option<f32>,
    pub speed: Option<f32>,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, timestamp_ms: i64) -> Self {
        PositionSample {
            coordinate,
            timestamp_ms,
            accuracy: None,
            altitude: None,
            speed: None,
        }
    }
}
