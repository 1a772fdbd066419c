//! Ticket-creation cooldown gate.
//!
//! A pure function of (now, recorded timestamp, window): either the user
//! may create a ticket, or they are told how long remains. Expired records
//! are ignored rather than deleted; the caller simply overwrites them on
//! the next successful creation.

use chrono::Duration;

/// Outcome of a cooldown check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// No active cooldown; creation may proceed.
    Allowed,
    /// Creation denied; this much of the window remains.
    Denied(Duration),
}

/// Checks whether a user may create a ticket at `now_ms`, given the
/// epoch-ms timestamp of their last creation (if any) and the window.
#[must_use]
pub fn check(now_ms: i64, last_created_ms: Option<i64>, window: Duration) -> Gate {
    match last_created_ms {
        None => Gate::Allowed,
        Some(last) => {
            let elapsed = Duration::milliseconds(now_ms.saturating_sub(last));
            if elapsed >= window {
                Gate::Allowed
            } else {
                Gate::Denied(window - elapsed)
            }
        }
    }
}

/// Formats a remaining duration as days/hours/minutes, e.g. `1d 23h 5m`.
/// Sub-minute remainders round up so the message never claims `0m` while
/// the gate still denies.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let total_minutes = (remaining.num_milliseconds() + 59_999) / 60_000;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes % (24 * 60)) / 60;
    let minutes = total_minutes % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 || days > 0 {
        parts.push(format!("{hours}h"));
    }
    parts.push(format!("{minutes}m"));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn window() -> Duration {
        Duration::hours(48)
    }

    #[test]
    fn no_record_is_allowed() {
        assert_eq!(check(1_000, None, window()), Gate::Allowed);
    }

    #[test]
    fn denies_within_window_with_remaining() {
        // Created at t=0, retried at t=1h: ~47h remain.
        let gate = check(HOUR_MS, Some(0), window());
        assert_eq!(gate, Gate::Denied(Duration::hours(47)));
    }

    #[test]
    fn remaining_decreases_as_time_advances() {
        let mut last_remaining = window();
        for hour in 1..48 {
            match check(hour * HOUR_MS, Some(0), window()) {
                Gate::Denied(remaining) => {
                    assert!(remaining < last_remaining);
                    last_remaining = remaining;
                }
                Gate::Allowed => panic!("allowed {hour}h into a 48h window"),
            }
        }
    }

    #[test]
    fn allowed_exactly_at_and_after_boundary() {
        assert!(matches!(
            check(48 * HOUR_MS - 1, Some(0), window()),
            Gate::Denied(_)
        ));
        assert_eq!(check(48 * HOUR_MS, Some(0), window()), Gate::Allowed);
        assert_eq!(check(48 * HOUR_MS + 1_000, Some(0), window()), Gate::Allowed);
    }

    #[test]
    fn formats_days_hours_minutes() {
        assert_eq!(
            format_remaining(Duration::hours(47) + Duration::minutes(12)),
            "1d 23h 12m"
        );
        assert_eq!(format_remaining(Duration::minutes(90)), "1h 30m");
        assert_eq!(format_remaining(Duration::minutes(3)), "3m");
    }

    #[test]
    fn formats_sub_minute_remainder_rounding_up() {
        assert_eq!(format_remaining(Duration::seconds(30)), "1m");
        assert_eq!(
            format_remaining(Duration::hours(2) + Duration::seconds(1)),
            "2h 1m"
        );
    }
}
