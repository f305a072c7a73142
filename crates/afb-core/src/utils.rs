use chrono::{DateTime, Utc};

/// Longest argument value mirrored to the audit channel verbatim.
pub const ARGUMENT_SUMMARY_MAX: usize = 100;

/// Longest error text shown to users in an error reply.
pub const ERROR_TEXT_MAX: usize = 200;

/// Take at most `max_chars` characters (never splits a UTF-8 sequence).
pub fn clip_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Clip to `max_chars` and append `...` when anything was cut.
pub fn truncate_text(s: &str, max_chars: usize) -> String {
    let clipped = clip_chars(s, max_chars);
    if clipped.len() == s.len() {
        return s.to_string();
    }
    format!("{clipped}...")
}

/// Argument value as it should appear in an audit record.
pub fn summarize_argument(value: &str) -> String {
    truncate_text(value, ARGUMENT_SUMMARY_MAX)
}

/// Seconds-resolution breakdown of an elapsed duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Elapsed {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Elapsed {
    pub fn between(start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = now.signed_duration_since(start).num_seconds().max(0);
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Drops leading zero units: `2d 1h 0m 5s`, `3m 7s`, `9s`.
    pub fn long(&self) -> String {
        let Self {
            days,
            hours,
            minutes,
            seconds,
        } = *self;
        if days > 0 {
            return format!("{days}d {hours}h {minutes}m {seconds}s");
        }
        if hours > 0 {
            return format!("{hours}h {minutes}m {seconds}s");
        }
        if minutes > 0 {
            return format!("{minutes}m {seconds}s");
        }
        format!("{seconds}s")
    }

    /// Seconds are dropped once the bot has been up for a day.
    pub fn short(&self) -> String {
        let Self {
            days,
            hours,
            minutes,
            seconds,
        } = *self;
        if days > 0 {
            return format!("{days}d {hours}h {minutes}m");
        }
        format!("{hours}h {minutes}m {seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn summaries_up_to_limit_pass_through() {
        let exact = "q".repeat(ARGUMENT_SUMMARY_MAX);
        assert_eq!(summarize_argument(&exact), exact);
        assert_eq!(summarize_argument("Will it rain?"), "Will it rain?");
    }

    #[test]
    fn long_summaries_get_ellipsis() {
        let long = "m".repeat(ARGUMENT_SUMMARY_MAX + 1);
        let out = summarize_argument(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), ARGUMENT_SUMMARY_MAX + 3);
    }

    #[test]
    fn clip_respects_char_boundaries() {
        let s = "ééé";
        assert_eq!(clip_chars(s, 2), "éé");
        assert_eq!(clip_chars(s, 10), s);
        assert_eq!(truncate_text("🎱🎱🎱", 1), "🎱...");
    }

    #[test]
    fn elapsed_formats_drop_leading_units() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let e = Elapsed::between(start, start + chrono::Duration::seconds(9));
        assert_eq!(e.long(), "9s");
        assert_eq!(e.short(), "0h 0m 9s");

        let e = Elapsed::between(start, start + chrono::Duration::seconds(3 * 60 + 7));
        assert_eq!(e.long(), "3m 7s");

        let e = Elapsed::between(
            start,
            start + chrono::Duration::seconds(2 * 86_400 + 3600 + 5),
        );
        assert_eq!(e.long(), "2d 1h 0m 5s");
        assert_eq!(e.short(), "2d 1h 0m");
    }

    #[test]
    fn elapsed_clamps_clock_skew() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 10).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Elapsed::between(start, now).long(), "0s");
    }
}
