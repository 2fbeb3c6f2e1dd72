#![allow(dead_code)]

use livetrail_core::config::TrackerConfig;
use livetrail_core::coordinate::{Coordinate, PositionSample};
use livetrail_core::position_source::{ManualPositionSource, PositionEvent};
use livetrail_core::renderer::{Scene, ViewPresenter};
use livetrail_core::tracking::TrackingController;
use livetrail_core::viewport::ViewportState;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;

pub fn sample(longitude: f64, latitude: f64, timestamp_ms: i64) -> PositionSample {
    PositionSample::new(Coordinate::new(longitude, latitude).unwrap(), timestamp_ms)
}

pub fn coordinate(longitude: f64, latitude: f64) -> Coordinate {
    Coordinate::new(longitude, latitude).unwrap()
}

pub type ManualController = TrackingController<ManualPositionSource>;

pub fn manual_controller() -> (ManualController, UnboundedReceiver<PositionEvent>) {
    TrackingController::new(ManualPositionSource::new(), &TrackerConfig::default())
}

/// Feeds every queued position event into the controller.
pub fn pump(controller: &mut ManualController, rx: &mut UnboundedReceiver<PositionEvent>) -> usize {
    let mut n = 0;
    while let Ok(event) = rx.try_recv() {
        controller.handle_event(event);
        n += 1;
    }
    n
}

/// Pushes a sample through the source's live watch and applies it.
pub fn deliver(
    controller: &mut ManualController,
    rx: &mut UnboundedReceiver<PositionEvent>,
    sample: &PositionSample,
) {
    controller.source_mut().push_sample(sample);
    pump(controller, rx);
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub frames: Vec<(ViewportState, Scene)>,
}

impl ViewPresenter for RecordingPresenter {
    fn present(&mut self, viewport: &ViewportState, scene: &Scene) {
        self.frames.push((viewport.clone(), scene.clone()));
    }
}

pub fn write_gpx(dir: &Path, name: &str, points: &[(f64, f64, &str)]) -> PathBuf {
    let mut content = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <gpx version=\"1.1\" creator=\"livetrail tests\" xmlns=\"http://www.topografix.com/GPX/1/1\">\n\
         <trk><trkseg>\n",
    );
    for (lon, lat, time) in points {
        content.push_str(&format!(
            "<trkpt lat=\"{lat}\" lon=\"{lon}\"><time>{time}</time></trkpt>\n"
        ));
    }
    content.push_str("</trkseg></trk></gpx>\n");
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}
