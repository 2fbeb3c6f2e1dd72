use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Degrees with a fixed 6 digit precision, about 10cm.
pub fn format_degrees(value: f64) -> String {
    format!("{value:.6}")
}

pub fn format_clock_time<Tz>(timestamp_ms: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|utc| utc.with_timezone(tz).format("%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};

    use crate::utils::{format_clock_time, format_degrees};

    #[test]
    fn degrees() {
        assert_eq!(format_degrees(37.75), "37.750000");
        assert_eq!(format_degrees(-122.40000001), "-122.400000");
        assert_eq!(format_degrees(1.2345678), "1.234568");
    }

    #[test]
    fn clock_time_is_local_time() {
        // 2024-03-31T23:00:00Z
        let timestamp_ms = 1711926000000;
        assert_eq!(
            format_clock_time(timestamp_ms, &Utc).unwrap(),
            "23:00:00"
        );
        let plus8 = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            format_clock_time(timestamp_ms, &plus8).unwrap(),
            "07:00:00"
        );
        assert!(format_clock_time(i64::MAX, &Utc).is_none());
    }
}
