use anyhow::Result;
use chrono::{DateTime, Utc};
use gpx::read;
use std::{fs::File, io::BufReader, io::Read};

use crate::coordinate::{Coordinate, PositionSample};

/// Reads every track point of a GPX file as a position sample, in file order.
///
/// Points without a usable timestamp take the previous point's timestamp so
/// the sequence stays non-decreasing. Points outside the valid coordinate
/// range are skipped.
pub fn load_gpx_samples(file_path: &str) -> Result<Vec<PositionSample>> {
    read_gpx_samples(BufReader::new(File::open(file_path)?))
}

pub fn read_gpx_samples<R: Read>(reader: R) -> Result<Vec<PositionSample>> {
    let gpx_data = read(reader)?;
    let mut samples = Vec::new();
    let mut skipped = 0;
    let mut last_timestamp_ms = 0;
    for point in gpx_data
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
    {
        let timestamp_ms = match &point.time {
            Some(time) => DateTime::<Utc>::from(DateTime::parse_from_rfc3339(&time.format()?)?)
                .timestamp_millis(),
            None => last_timestamp_ms,
        };
        // keep it non-decreasing, a recorded track is replayed as if live
        let timestamp_ms = timestamp_ms.max(last_timestamp_ms);
        last_timestamp_ms = timestamp_ms;

        let coordinate = match Coordinate::new(point.point().x(), point.point().y()) {
            Ok(coordinate) => coordinate,
            Err(e) => {
                skipped += 1;
                debug!("skipping gpx point: {e}");
                continue;
            }
        };
        samples.push(PositionSample {
            coordinate,
            timestamp_ms,
            accuracy: point.hdop.map(|hdop| hdop as f32),
            altitude: point.elevation.map(|value| value as f32),
            speed: point.speed.map(|value| value as f32),
        });
    }
    if skipped > 0 {
        warn!("skipped {skipped} gpx points with invalid coordinates");
    }
    Ok(samples)
}
