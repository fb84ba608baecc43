use chrono::{DateTime, Utc};

/// Seconds the window stops short of now, giving in-flight log entries time
/// to reach the store and become searchable before anyone asks about them.
pub const SHORT_DELAY: i64 = 5;

/// The `[since, to]` span every query is bounded to, in unix seconds.
///
/// Resolved once when the client is built; queries made through the same
/// client all see the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    since: i64,
    to: i64,
}

impl TimeWindow {
    /// Resolve the window against `now`.
    ///
    /// An explicit `since` is exclusive of the given second, so the window
    /// starts one second later. Without one the window reaches `period`
    /// seconds back. Either way `to` trails `now` by [`SHORT_DELAY`].
    pub fn resolve(since: Option<i64>, period: u64, now: i64) -> Self {
        let since = match since {
            Some(since) => since + 1,
            None => now - period as i64,
        };

        TimeWindow {
            since,
            to: now - SHORT_DELAY,
        }
    }

    /// Lower bound, inclusive.
    pub fn since(&self) -> i64 {
        self.since
    }

    /// Upper bound, inclusive.
    pub fn to(&self) -> i64 {
        self.to
    }

    /// Render a unix timestamp the way the log indices store `@timestamp`,
    /// eg. `2014-08-19T12:19:55.000Z`. Always UTC, milliseconds always zero.
    pub fn format_timestamp(timestamp: i64) -> String {
        DateTime::<Utc>::from_timestamp(timestamp, 0)
            .expect("timestamp out of range")
            .format("%Y-%m-%dT%H:%M:%S.000Z")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_reaches_period_seconds_back() {
        let window = TimeWindow::resolve(None, 60, 1000);

        assert_eq!(window.since(), 940);
        assert_eq!(window.to(), 995);
    }

    #[test]
    fn test_explicit_since_is_exclusive() {
        let window = TimeWindow::resolve(Some(12345), 900, 1_000_000);

        // period plays no part once since is given
        assert_eq!(window.since(), 12346);
        assert_eq!(window.to(), 999_995);
    }

    #[test]
    fn test_to_always_trails_now_by_the_short_delay() {
        let window = TimeWindow::resolve(None, 900, 500_000);
        assert_eq!(window.to(), 500_000 - SHORT_DELAY);

        let window = TimeWindow::resolve(Some(499_000), 900, 500_000);
        assert_eq!(window.to(), 500_000 - SHORT_DELAY);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            TimeWindow::format_timestamp(0),
            "1970-01-01T00:00:00.000Z"
        );
        assert_eq!(
            TimeWindow::format_timestamp(123457),
            "1970-01-02T10:17:37.000Z"
        );
        assert_eq!(
            TimeWindow::format_timestamp(1408450795),
            "2014-08-19T12:19:55.000Z"
        );
    }

    #[test]
    fn test_format_timestamp_milliseconds_are_always_zero() {
        for timestamp in [1, 59, 3599, 1408450795] {
            assert!(TimeWindow::format_timestamp(timestamp).ends_with(".000Z"));
        }
    }
}
