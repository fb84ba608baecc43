use serde::*;

pub const DEFAULT_PERIOD: u64 = 900;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_INDEX_PREFIX: &str = "logstash-other";
pub const DEFAULT_INDEX_SEP: &str = "-";
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Construction parameters for [`LogQuery`](crate::LogQuery).
///
/// Only `host` has to be filled in; everything else defaults to the values
/// above, both here and when deserialized from a config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogQueryConfig {
    /// Where the cluster answers, eg. `http://logs.example.net:9200`.
    /// A bare `host:port` is assumed to be plain http.
    pub host: String,

    /// Fetch entries newer than this unix timestamp, the named second
    /// itself excluded. Unset means "the last `period` seconds".
    #[serde(default)]
    pub since: Option<i64>,

    /// Window length in seconds, used only while `since` is unset.
    #[serde(default = "default_period")]
    pub period: u64,

    /// How long to wait on the store before giving up on a request.
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,

    /// First part of the dated index names, without the separator.
    #[serde(default = "default_index_prefix")]
    pub index_prefix: String,

    /// Goes between the prefix and the date, `-` for stock Logstash.
    #[serde(default = "default_index_sep")]
    pub index_sep: String,

    /// Documents fetched per scroll round trip. A cap on memory per batch,
    /// not on the result set.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for LogQueryConfig {
    fn default() -> Self {
        LogQueryConfig {
            host: String::new(),
            since: None,
            period: default_period(),
            read_timeout_secs: default_read_timeout_secs(),
            index_prefix: default_index_prefix(),
            index_sep: default_index_sep(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_period() -> u64 {
    DEFAULT_PERIOD
}

fn default_read_timeout_secs() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

fn default_index_prefix() -> String {
    DEFAULT_INDEX_PREFIX.to_string()
}

fn default_index_sep() -> String {
    DEFAULT_INDEX_SEP.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LogQueryConfig::default();

        assert_eq!(config.host, "");
        assert_eq!(config.since, None);
        assert_eq!(config.period, 900);
        assert_eq!(config.read_timeout_secs, 10);
        assert_eq!(config.index_prefix, "logstash-other");
        assert_eq!(config.index_sep, "-");
        assert_eq!(config.batch_size, 1000);
    }

    #[test]
    fn test_deserializing_fills_in_the_same_defaults() {
        let config: LogQueryConfig =
            serde_json::from_str(r#"{"host": "logs.example.net:9200"}"#).unwrap();

        assert_eq!(
            config,
            LogQueryConfig {
                host: "logs.example.net:9200".to_string(),
                ..LogQueryConfig::default()
            }
        );
    }

    #[test]
    fn test_deserializing_overrides() {
        let config: LogQueryConfig = serde_json::from_str(
            r#"{
                "host": "logs.example.net:9200",
                "since": 1408450795,
                "index_prefix": "syslog-ng",
                "index_sep": "_",
                "batch_size": 250
            }"#,
        )
        .unwrap();

        assert_eq!(config.since, Some(1408450795));
        assert_eq!(config.index_prefix, "syslog-ng");
        assert_eq!(config.index_sep, "_");
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.period, 900);
    }
}
