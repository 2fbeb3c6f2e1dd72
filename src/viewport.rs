use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;

/// Camera of the map view. Either the user moves it around, or, while
/// tracking, its center follows the latest accepted position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub center: Coordinate,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl ViewportState {
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        ViewportState {
            center,
            zoom,
            bearing: 0.0,
            pitch: 0.0,
        }
    }

    // only the center moves, zoom/bearing/pitch stay whatever the user chose
    pub fn follow(&mut self, center: Coordinate) {
        self.center = center;
    }
}
