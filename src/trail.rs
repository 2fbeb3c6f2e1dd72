use itertools::{Itertools, Position};
use serde::{Deserialize, Serialize};

use crate::coordinate::{Coordinate, PositionSample};

/// Per-axis threshold in degrees, roughly one metre of latitude.
pub const DEFAULT_EPSILON: f64 = 0.00001;

/// Whether an offered sample grew the trail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OfferResult {
    Append,
    Ignore,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Start,
    End,
    Plain,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrailPoint {
    pub coordinate: Coordinate,
    pub kind: PointKind,
}

/// Session-scoped, append-only history of visited coordinates.
pub struct TrailAccumulator {
    epsilon: f64,
    coordinates: Vec<Coordinate>,
    visible: bool,
}

impl TrailAccumulator {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    pub fn with_epsilon(epsilon: f64) -> Self {
        TrailAccumulator {
            epsilon,
            coordinates: Vec::new(),
            visible: true,
        }
    }

    // NOTE: this is a coarse jitter filter on raw degrees. A change of ε in
    // longitude is a lot shorter near the poles than at the equator; we accept
    // that since nothing here depends on real distances.
    pub fn offer(&mut self, sample: &PositionSample) -> OfferResult {
        let coordinate = sample.coordinate;
        let result = match self.coordinates.last() {
            Some(last) if last.is_within(&coordinate, self.epsilon) => OfferResult::Ignore,
            _ => OfferResult::Append,
        };
        if result == OfferResult::Append {
            self.coordinates.push(coordinate);
        }
        result
    }

    pub fn clear(&mut self) {
        if !self.coordinates.is_empty() {
            debug!("clearing trail of {} points", self.coordinates.len());
        }
        self.coordinates.clear();
    }

    pub fn toggle_visibility(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.coordinates.last()
    }

    /// The trail as a polyline. `None` until there are at least two points.
    pub fn line(&self) -> Option<geo_types::LineString<f64>> {
        if self.coordinates.len() < 2 {
            return None;
        }
        Some(geo_types::LineString::new(
            self.coordinates.iter().map(|c| (*c).into()).collect(),
        ))
    }

    pub fn points(&self) -> Vec<TrailPoint> {
        self.coordinates
            .iter()
            .with_position()
            .map(|(position, coordinate)| {
                let kind = match position {
                    Position::First | Position::Only => PointKind::Start,
                    Position::Last => PointKind::End,
                    Position::Middle => PointKind::Plain,
                };
                TrailPoint {
                    coordinate: *coordinate,
                    kind,
                }
            })
            .collect()
    }
}
