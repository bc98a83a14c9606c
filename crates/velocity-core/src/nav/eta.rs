//! Arrival-time math and formatting

use chrono::{DateTime, Duration, Local, TimeZone};

/// Arrival time for a route duration starting at `now`
pub fn arrival_time<Tz: TimeZone>(now: DateTime<Tz>, duration_seconds: f64) -> DateTime<Tz> {
    now + Duration::milliseconds((duration_seconds * 1000.0).round() as i64)
}

/// Clock-time ETA string for a route duration, e.g. `05:42:10 PM`
pub fn format_eta(duration_seconds: f64) -> String {
    arrival_time(Local::now(), duration_seconds)
        .format("%I:%M:%S %p")
        .to_string()
}
