// A simple module to define the time types used in the project
//
// IMPORTANT:
// The helper below reads SystemTime::now() which is NON-DETERMINISTIC.
// Every governance state transition takes its timestamp from the
// RuntimeContext handed in by the caller (the external ledger clock),
// never from this module.
//
// SAFE USAGE:
// - Logging timestamps
// - Test/deployment harness wiring
//
// UNSAFE USAGE:
// - Readiness checks inside the timelock engine
// - Anything that must replay identically from a ledger history

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Seconds timestamps used to determine it using its type
pub type TimestampSeconds = u64;

#[inline]
pub fn get_current_time() -> Duration {
    let start = SystemTime::now();

    start
        .duration_since(UNIX_EPOCH)
        .expect("Incorrect time returned from get_current_time")
}

// Return timestamp in seconds
// SAFETY: Non-consensus operation - uses system time
pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}
