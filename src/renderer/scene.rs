use chrono::{Local, TimeZone};
use geo_types::LineString;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt::Display;

use crate::config::PointOfInterest;
use crate::coordinate::{Coordinate, PositionSample};
use crate::tracking::TrackingState;
use crate::trail::{PointKind, TrailAccumulator};
use crate::utils;
use crate::viewport::ViewportState;

/// Borrowed view of everything a scene is derived from.
#[derive(Clone, Copy)]
pub struct SceneState<'a> {
    pub viewport: &'a ViewportState,
    pub user_location: Option<&'a PositionSample>,
    pub trail: &'a TrailAccumulator,
    pub tracking_state: TrackingState,
    pub error: Option<&'a str>,
    pub point_of_interest: &'a PointOfInterest,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    PointOfInterest,
    User,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub coordinate: Coordinate,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointFeature {
    pub coordinate: Coordinate,
    pub kind: PointKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ControlPanel {
    pub tracking_state: TrackingState,
    pub tracking_label: &'static str,
    pub trail_label: &'static str,
    pub clear_enabled: bool,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub last_update: Option<String>,
    pub point_count: usize,
    pub error: Option<String>,
}

/// What the view should draw. Line and points are serialized GeoJSON-style
/// so a web map can take them as sources directly.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub markers: Vec<Marker>,
    #[serde(serialize_with = "serialize_line")]
    pub line: Option<LineString<f64>>,
    #[serde(serialize_with = "serialize_points")]
    pub points: Option<Vec<PointFeature>>,
    pub panel: ControlPanel,
}

pub const USER_MARKER_CONTENT: &str = "You are here";

pub fn derive_scene(state: &SceneState) -> Scene {
    derive_scene_in(state, &Local)
}

pub fn derive_scene_in<Tz>(state: &SceneState, tz: &Tz) -> Scene
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let trail = state.trail;

    let mut markers = vec![Marker {
        kind: MarkerKind::PointOfInterest,
        coordinate: state.point_of_interest.coordinate,
        content: state.point_of_interest.label.clone(),
    }];
    if let Some(location) = state.user_location {
        markers.push(Marker {
            kind: MarkerKind::User,
            coordinate: location.coordinate,
            content: USER_MARKER_CONTENT.to_string(),
        });
    }

    let (line, points) = if trail.is_visible() {
        let points = if trail.is_empty() {
            None
        } else {
            Some(
                trail
                    .points()
                    .into_iter()
                    .map(|p| PointFeature {
                        coordinate: p.coordinate,
                        kind: p.kind,
                    })
                    .collect(),
            )
        };
        (trail.line(), points)
    } else {
        (None, None)
    };

    let panel = ControlPanel {
        tracking_state: state.tracking_state,
        tracking_label: match state.tracking_state {
            TrackingState::Idle => "Start tracking",
            TrackingState::Active => "Stop tracking",
        },
        trail_label: if trail.is_visible() {
            "Hide trail"
        } else {
            "Show trail"
        },
        clear_enabled: !trail.is_empty(),
        latitude: state
            .user_location
            .map(|l| utils::format_degrees(l.coordinate.latitude())),
        longitude: state
            .user_location
            .map(|l| utils::format_degrees(l.coordinate.longitude())),
        last_update: state
            .user_location
            .and_then(|l| utils::format_clock_time(l.timestamp_ms, tz)),
        point_count: trail.len(),
        error: state.error.map(str::to_string),
    };

    Scene {
        markers,
        line,
        points,
        panel,
    }
}

fn serialize_line<S: Serializer>(line: &Option<LineString<f64>>, s: S) -> Result<S::Ok, S::Error> {
    match line {
        None => s.serialize_none(),
        Some(line) => {
            let coordinates: Vec<[f64; 2]> = line.0.iter().map(|c| [c.x, c.y]).collect();
            let mut map = s.serialize_map(Some(2))?;
            map.serialize_entry("type", "LineString")?;
            map.serialize_entry("coordinates", &coordinates)?;
            map.end()
        }
    }
}

#[derive(Serialize)]
struct GeoJsonPointGeometry {
    #[serde(rename = "type")]
    geometry_type: &'static str,
    coordinates: Coordinate,
}

#[derive(Serialize)]
struct GeoJsonPointProperties {
    kind: PointKind,
}

#[derive(Serialize)]
struct GeoJsonPointFeature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    geometry: GeoJsonPointGeometry,
    properties: GeoJsonPointProperties,
}

fn serialize_points<S: Serializer>(
    points: &Option<Vec<PointFeature>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match points {
        None => s.serialize_none(),
        Some(points) => {
            let features: Vec<GeoJsonPointFeature> = points
                .iter()
                .map(|p| GeoJsonPointFeature {
                    feature_type: "Feature",
                    geometry: GeoJsonPointGeometry {
                        geometry_type: "Point",
                        coordinates: p.coordinate,
                    },
                    properties: GeoJsonPointProperties { kind: p.kind },
                })
                .collect();
            let mut map = s.serialize_map(Some(2))?;
            map.serialize_entry("type", "FeatureCollection")?;
            map.serialize_entry("features", &features)?;
            map.end()
        }
    }
}
