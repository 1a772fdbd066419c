//! Inactivity expiry selection.
//!
//! The hourly sweep asks which tracked channels have been idle past the
//! threshold; everything platform-facing (notices, deletion, purging)
//! happens at the call site so one channel's failure cannot stop the rest.

use chrono::Duration;

/// Channels whose last activity is older than `max_idle` at `now_ms`.
#[must_use]
pub fn expired(
    entries: impl Iterator<Item = (u64, i64)>,
    now_ms: i64,
    max_idle: Duration,
) -> Vec<u64> {
    let cutoff = max_idle.num_milliseconds();
    entries
        .filter(|(_, last)| now_ms.saturating_sub(*last) > cutoff)
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    #[test]
    fn splits_on_the_threshold() {
        let now = 1_000 * HOUR_MS;
        let entries = vec![
            (1_u64, now - 73 * HOUR_MS), // stale
            (2_u64, now - 10 * HOUR_MS), // fresh
            (3_u64, now - 72 * HOUR_MS), // exactly at threshold: kept
        ];
        let mut stale = expired(entries.into_iter(), now, Duration::hours(72));
        stale.sort_unstable();
        assert_eq!(stale, vec![1]);
    }

    #[test]
    fn empty_store_selects_nothing() {
        assert!(expired(std::iter::empty(), 0, Duration::hours(72)).is_empty());
    }

    #[test]
    fn future_timestamps_are_not_stale() {
        // Clock drift should never reap a ticket.
        let stale = expired(vec![(1_u64, 10 * HOUR_MS)].into_iter(), 0, Duration::hours(72));
        assert!(stale.is_empty());
    }
}
