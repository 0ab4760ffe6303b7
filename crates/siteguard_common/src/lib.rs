//! Shared types and pure engine logic for siteguard.
//!
//! Everything in this crate is deterministic and I/O-free. The daemon owns
//! persistence, scheduling and collaborator plumbing; the CLI owns
//! presentation. Both speak the protocol defined in [`ipc`] and reason about
//! the document model defined in [`store`].

pub mod alert;
pub mod attribution;
pub mod cookies;
pub mod error;
pub mod history;
pub mod ipc;
pub mod origin;
pub mod paths;
pub mod report;
pub mod store;
pub mod trust;
pub mod window;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Milliseconds in one day.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Epoch-based day index for a millisecond timestamp.
///
/// Fixed 24-hour buckets counted from the epoch, not calendar-aware. Day
/// boundaries therefore drift across DST transitions; that is the accepted
/// behavior for daily-granularity reporting.
pub fn day_index(ts_ms: i64) -> i64 {
    ts_ms.div_euclid(DAY_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_index_is_stable_within_a_day() {
        let base = 1_700_000_000_000_i64;
        let day = day_index(base);
        assert_eq!(day_index(base + DAY_MS - 1 - base % DAY_MS), day);
        assert_eq!(day_index(base - base % DAY_MS), day);
    }

    #[test]
    fn day_index_advances_at_the_boundary() {
        let start_of_day = 1_700_000_000_000_i64 / DAY_MS * DAY_MS;
        assert_eq!(day_index(start_of_day + DAY_MS), day_index(start_of_day) + 1);
        assert_eq!(day_index(start_of_day + DAY_MS - 1), day_index(start_of_day));
    }
}
