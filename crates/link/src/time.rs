use std::time::{SystemTime, UNIX_EPOCH};

/// Microseconds since the Unix epoch. Both peers stamp packets with this so
/// one-way delay can be read off a receive log when the clocks are synced.
pub fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_micros() as u64)
}
