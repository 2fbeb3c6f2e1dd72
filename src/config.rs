use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::coordinate::Coordinate;
use crate::position_source::PositionOptions;
use crate::trail::DEFAULT_EPSILON;

/// The fixed place the map is about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub coordinate: Coordinate,
    pub label: String,
}

impl Default for PointOfInterest {
    fn default() -> Self {
        PointOfInterest {
            // Ferry Building, San Francisco
            coordinate: Coordinate::new(-122.3937, 37.7955).unwrap(),
            label: "Point of interest".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub point_of_interest: PointOfInterest,
    /// Per-axis movement threshold in degrees for the trail filter.
    pub epsilon: f64,
    pub initial_zoom: f64,
    pub position_options: PositionOptions,
    /// How much faster than real time a recorded track is replayed.
    pub replay_speedup: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            point_of_interest: PointOfInterest::default(),
            epsilon: DEFAULT_EPSILON,
            initial_zoom: 14.0,
            position_options: PositionOptions::default(),
            replay_speedup: 1.0,
        }
    }
}

impl TrackerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json_str(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: TrackerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            bail!("`epsilon` must be a positive number, got {}", self.epsilon);
        }
        if !(0.0..=22.0).contains(&self.initial_zoom) {
            bail!("`initial_zoom` must be within 0-22, got {}", self.initial_zoom);
        }
        if !(self.replay_speedup.is_finite() && self.replay_speedup > 0.0) {
            bail!(
                "`replay_speedup` must be a positive number, got {}",
                self.replay_speedup
            );
        }
        Ok(())
    }
}
