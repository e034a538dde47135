//! Expiry policy
//!
//! Pure deadline arithmetic, no state of its own. Deadlines are absolute
//! wall-clock instants in milliseconds since the UNIX epoch so they stay
//! meaningful across snapshot round trips and process restarts.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the UNIX epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Absolute deadline for a TTL starting at `now_ms`
pub fn deadline_after(now_ms: u64, ttl: Duration) -> u64 {
    now_ms.saturating_add(ttl.as_millis() as u64)
}

/// Whether a deadline has passed at `now_ms`
///
/// A TTL of zero produces a deadline equal to "now", which is already
/// expired on the next check.
pub fn is_expired(deadline_ms: u64, now_ms: u64) -> bool {
    now_ms >= deadline_ms
}

/// Remaining time until the deadline, `None` if already expired
pub fn remaining(deadline_ms: u64, now_ms: u64) -> Option<Duration> {
    if is_expired(deadline_ms, now_ms) {
        None
    } else {
        Some(Duration::from_millis(deadline_ms - now_ms))
    }
}
