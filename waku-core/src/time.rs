use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch, as used for message and envelope
/// timestamps.
pub fn unix_epoch_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or_default()
}
