use chrono::{DateTime, Utc};
use std::fmt;

/// One day of seconds, the rollover cadence of the dated indices.
pub const DAY: i64 = 86400;

/// The pair of dated indices a query runs against, comma-joined the way the
/// store's multi-index syntax wants them.
///
/// Logstash cuts one index per UTC day, so a window that is at most a day
/// long can only ever touch yesterday's index and today's. Both are named
/// here even when the window sits entirely inside one of them; the store
/// skips the other cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSet(String);

impl IndexSet {
    /// Resolve yesterday's and today's index names against `now`.
    pub fn resolve(prefix: &str, sep: &str, now: i64) -> Self {
        IndexSet(format!(
            "{},{}",
            IndexSet::format_index(prefix, now - DAY, sep),
            IndexSet::format_index(prefix, now, sep),
        ))
    }

    /// Name of the dated index holding documents written at `timestamp`,
    /// eg. `logstash-other-2017.05.09`. The date is the UTC calendar date.
    pub fn format_index(prefix: &str, timestamp: i64, sep: &str) -> String {
        let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .expect("timestamp out of range")
            .format("%Y.%m.%d");

        format!("{}{}{}", prefix, sep, date)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_index() {
        assert_eq!(
            IndexSet::format_index("logstash", 1, "-"),
            "logstash-1970.01.01"
        );
        assert_eq!(
            IndexSet::format_index("logstash", 1408450795, "-"),
            "logstash-2014.08.19"
        );
        assert_eq!(
            IndexSet::format_index("logstash-foo", 1408450795, "-"),
            "logstash-foo-2014.08.19"
        );
    }

    #[test]
    fn test_format_index_with_other_separator() {
        assert_eq!(
            IndexSet::format_index("syslog-ng", 1408450795, "_"),
            "syslog-ng_2014.08.19"
        );
    }

    #[test]
    fn test_resolve_joins_yesterday_and_today() {
        // 2014-08-19T12:19:55Z
        let set = IndexSet::resolve("logstash", "-", 1408450795);
        assert_eq!(set.as_str(), "logstash-2014.08.18,logstash-2014.08.19");
    }

    #[test]
    fn test_resolve_crosses_the_new_year() {
        // 2014-12-31T23:30:00Z
        let set = IndexSet::resolve("logstash", "-", 1420068600);
        assert_eq!(set.as_str(), "logstash-2014.12.30,logstash-2014.12.31");

        // half an hour into 2015 yesterday's index is still 2014's last
        let set = IndexSet::resolve("logstash", "-", 1420068600 + 3600);
        assert_eq!(set.as_str(), "logstash-2014.12.31,logstash-2015.01.01");
    }

    #[test]
    fn test_resolve_handles_leap_days() {
        // 2016-02-29T22:00:00Z
        let set = IndexSet::resolve("logstash", "-", 1456783200);
        assert_eq!(set.as_str(), "logstash-2016.02.28,logstash-2016.02.29");
    }

    #[test]
    fn test_display_matches_the_joined_form() {
        let set = IndexSet::resolve("logstash", "-", 1408450795);
        assert_eq!(set.to_string(), set.as_str());
    }
}
