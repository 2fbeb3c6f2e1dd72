pub mod test_utils;

use livetrail_core::import_data;
use tempdir::TempDir;
use test_utils::{coordinate, write_gpx};

#[test]
fn load_gpx_samples() {
    let temp_dir = TempDir::new("import_data-load_gpx_samples").unwrap();
    let path = write_gpx(
        temp_dir.path(),
        "walk.gpx",
        &[
            (-122.4, 37.75, "2024-03-31T23:00:00Z"),
            (-122.401, 37.751, "2024-03-31T23:00:01Z"),
            (-122.402, 37.752, "2024-03-31T23:00:03Z"),
        ],
    );
    let samples = import_data::load_gpx_samples(path.to_str().unwrap()).unwrap();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].coordinate, coordinate(-122.4, 37.75));
    assert_eq!(samples[0].timestamp_ms, 1711926000000);
    assert_eq!(samples[1].timestamp_ms, 1711926001000);
    assert_eq!(samples[2].timestamp_ms, 1711926003000);
    assert!(samples[0].accuracy.is_none());
}

#[test]
fn timestamps_never_go_backwards() {
    let temp_dir = TempDir::new("import_data-backwards").unwrap();
    let path = write_gpx(
        temp_dir.path(),
        "backwards.gpx",
        &[
            (1.0, 1.0, "2024-03-31T23:00:05Z"),
            (1.1, 1.1, "2024-03-31T23:00:01Z"),
            (1.2, 1.2, "2024-03-31T23:00:06Z"),
        ],
    );
    let samples = import_data::load_gpx_samples(path.to_str().unwrap()).unwrap();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[1].timestamp_ms, samples[0].timestamp_ms);
    assert!(samples[2].timestamp_ms > samples[1].timestamp_ms);
}

#[test]
fn missing_file() {
    assert!(import_data::load_gpx_samples("./tests/data/does_not_exist.gpx").is_err());
}

#[test]
fn not_a_gpx_file() {
    assert!(import_data::read_gpx_samples("definitely not xml".as_bytes()).is_err());
}
