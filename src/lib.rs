//! Query the Logstash logs an ELK stack keeps in Elasticsearch.
//!
//! [`LogQuery`] resolves two things once, at construction: the time window
//! queries are bounded to (`since`/`period`, closing [`SHORT_DELAY`] seconds
//! before now so in-flight log entries can settle) and the two dated
//! indices, yesterday's and today's, that window can touch. Every query it
//! runs carries both.
//!
//! ```no_run
//! use logsift::{LogQuery, LogQueryConfig};
//! use serde_json::json;
//!
//! fn main() -> Result<(), logsift::ElasticsearchError> {
//!     let logs = LogQuery::new(LogQueryConfig {
//!         host: "http://logs.example.net:9200".to_string(),
//!         period: 3600,
//!         ..LogQueryConfig::default()
//!     })?;
//!
//!     // ten raw rows matching a field exactly
//!     let rows = logs.get_rows(json!({"@message": "Connection reset"}), None, None, None)?;
//!
//!     // free-text mini-language, trimmed to two fields, a deterministic 1% sample
//!     let sampled = logs.query_by_string(
//!         "@message:\"PHP Fatal\"",
//!         Some(&["@timestamp", "@fields.http_url"]),
//!         Some(1000),
//!         Some(1),
//!     )?;
//!
//!     // how many entries the window holds in total
//!     let total = logs.count("*")?;
//!
//!     // p50/p95/p99/p99.9 of a numeric field, per caller
//!     let stats = logs.get_aggregations("*", "@context.caller", "@context.took")?;
//!
//!     println!(
//!         "{} + {} of {} rows, {} callers",
//!         rows.len(),
//!         sampled.len(),
//!         total,
//!         stats.len()
//!     );
//!     Ok(())
//! }
//! ```

mod client;
pub mod config;
pub mod elasticsearch;
pub mod index_set;
pub mod query_dsl;
pub mod time_window;

pub use client::{
    BucketStats, LogQuery, DEFAULT_BUCKETS, DEFAULT_LIMIT, DEFAULT_PERCENTS, DEFAULT_SEARCH_LIMIT,
};
pub use config::LogQueryConfig;
pub use elasticsearch::{Elasticsearch, ElasticsearchError};
pub use index_set::IndexSet;
pub use time_window::{TimeWindow, SHORT_DELAY};

/// One returned log entry: the document body alone, envelope stripped.
pub type LogRow = serde_json::Map<String, serde_json::Value>;
