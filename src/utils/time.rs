use chrono::{DateTime, Utc};

/// Raw values below this are taken to be epoch seconds. In milliseconds it
/// is early 1973; in seconds it is past the year 5000.
pub const SECONDS_THRESHOLD: f64 = 1e11;

/// Normalizes an epoch timestamp in seconds or milliseconds to whole
/// milliseconds. Returns `None` for negative or non-finite input.
pub fn normalize_epoch_millis(raw: f64) -> Option<i64> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    let millis = if raw < SECONDS_THRESHOLD { raw * 1000.0 } else { raw };
    if millis > i64::MAX as f64 {
        return None;
    }
    Some(millis.trunc() as i64)
}

pub fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Convert epoch milliseconds to human readable format
pub fn format_timestamp_millis(millis: i64) -> String {
    match millis_to_datetime(millis) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{}ms", millis),
    }
}
