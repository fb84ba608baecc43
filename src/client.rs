use crate::config::LogQueryConfig;
use crate::elasticsearch::{Elasticsearch, ElasticsearchError};
use crate::index_set::IndexSet;
use crate::query_dsl::{self, QueryBody};
use crate::time_window::TimeWindow;
use crate::LogRow;
use chrono::Utc;
use indexmap::IndexMap;
use serde::*;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Row cap used when [`LogQuery::search`] is called without one.
pub const DEFAULT_SEARCH_LIMIT: usize = 50_000;

/// Row cap the convenience wrappers use instead.
pub const DEFAULT_LIMIT: usize = 10;

/// Percentile cut points used when the caller does not pick their own.
pub const DEFAULT_PERCENTS: [f64; 4] = [50.0, 95.0, 99.0, 99.9];

/// How many `group_by` buckets come back unless overridden.
pub const DEFAULT_BUCKETS: usize = 100;

/// Queries the log documents Logstash feeds into Elasticsearch.
///
/// The time window and the dated indices it can touch are both resolved
/// once, against the clock at construction time, so every query made
/// through one client sees the same slice of the logs.
#[derive(Debug, Clone)]
pub struct LogQuery {
    elasticsearch: Elasticsearch,
    window: TimeWindow,
    index: IndexSet,
    batch_size: usize,
}

/// What [`LogQuery::get_aggregations`] reports per bucket: the document
/// count plus one entry per percentile cut point, keyed the way the store
/// labels them (`"50.0"`, `"99.9"`, ...). A percentile over no data is
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    pub count: u64,

    #[serde(flatten)]
    pub percentiles: IndexMap<String, Option<f64>>,
}

#[derive(Deserialize)]
struct GroupByBuckets {
    buckets: Vec<GroupByBucket>,
}

#[derive(Deserialize)]
struct GroupByBucket {
    key: Value,
    doc_count: u64,
    field_stats: FieldStats,
}

#[derive(Deserialize)]
struct FieldStats {
    values: IndexMap<String, Option<f64>>,
}

impl LogQuery {
    /// Resolve the window and index set and build the transport handle.
    ///
    /// Nothing goes over the wire here; an unreachable host only shows up
    /// as a transport error on the first query.
    pub fn new(config: LogQueryConfig) -> std::result::Result<Self, ElasticsearchError> {
        let now = Utc::now().timestamp();

        if let Some(since) = config.since {
            info!(
                "using provided {} timestamp as since ({} seconds ago)",
                since + 1,
                now - (since + 1)
            );
        }

        let window = TimeWindow::resolve(config.since, config.period, now);
        let index = IndexSet::resolve(&config.index_prefix, &config.index_sep, now);

        let elasticsearch = Elasticsearch::new(
            &config.host,
            index.as_str(),
            Duration::from_secs(config.read_timeout_secs),
        )?;

        info!("using {} indices", index);
        info!(
            "querying for messages from between {} and {}",
            TimeWindow::format_timestamp(window.since()),
            TimeWindow::format_timestamp(window.to())
        );

        Ok(LogQuery {
            elasticsearch,
            window,
            index,
            batch_size: config.batch_size,
        })
    }

    /// Run an arbitrary content clause against the window and materialize
    /// at most `limit` rows (50 000 when unset).
    ///
    /// Rows stream in through a scroll cursor in the store's internal
    /// `_doc` order, so result sets larger than the store's result-window
    /// cap stay reachable. The cursor is released as soon as enough rows
    /// are in hand. `sampling` keeps roughly that percentage of matches,
    /// chosen store-side by document id, see [`query_dsl::sampling`].
    pub fn search(
        &self,
        query: Value,
        fields: Option<&[&str]>,
        limit: Option<usize>,
        sampling: Option<u8>,
    ) -> std::result::Result<Vec<LogRow>, ElasticsearchError> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let body = self.search_body(query, fields, sampling);

        debug!("running {} query (limit set to {})", body, limit);

        let response = self
            .elasticsearch
            .open_search(body, self.batch_size)
            .execute()?;

        // pull until the limit is met, never fetching a batch beyond it;
        // dropping the scroller releases the cursor on the store
        let mut rows = Vec::new();
        let mut scroller = response.into_iter();
        while rows.len() < limit {
            match scroller.next() {
                Some(row) => rows.push(row?),
                None => break,
            }
        }

        info!("{} rows returned", rows.len());

        Ok(rows)
    }

    /// Rows whose fields match `matches` exactly,
    /// eg. `json!({"@message": "Foo Bar DB queries"})`.
    pub fn get_rows(
        &self,
        matches: Value,
        fields: Option<&[&str]>,
        limit: Option<usize>,
        sampling: Option<u8>,
    ) -> std::result::Result<Vec<LogRow>, ElasticsearchError> {
        self.search(
            query_dsl::matches(matches),
            fields,
            Some(limit.unwrap_or(DEFAULT_LIMIT)),
            sampling,
        )
    }

    /// Rows matching a query in the store's mini-language,
    /// eg. `@message:"^PHP Fatal"`. A blank query matches everything.
    pub fn query_by_string(
        &self,
        query: &str,
        fields: Option<&[&str]>,
        limit: Option<usize>,
        sampling: Option<u8>,
    ) -> std::result::Result<Vec<LogRow>, ElasticsearchError> {
        self.search(
            query_dsl::query_string(query),
            fields,
            Some(limit.unwrap_or(DEFAULT_LIMIT)),
            sampling,
        )
    }

    /// How many in-window entries match the query string, without moving
    /// any of them.
    pub fn count(&self, query: &str) -> std::result::Result<u64, ElasticsearchError> {
        let body = QueryBody::new(query_dsl::query_string(query))
            .and(query_dsl::timestamp_range(&self.window))
            .into_value();

        self.elasticsearch.count(body).execute()
    }

    /// Entries matching an SQL statement, passed to the store's SQL
    /// endpoint untouched. The statement names its own indices and time
    /// bounds; the window and index set do not apply.
    pub fn query_by_sql(&self, sql: &str) -> std::result::Result<Vec<LogRow>, ElasticsearchError> {
        debug!("running sql {:?}", sql);

        self.elasticsearch.sql(sql).execute()
    }

    /// Per-bucket row counts and percentile statistics over `stats_field`,
    /// grouped by `group_by`, with the default cut points and bucket cap.
    pub fn get_aggregations(
        &self,
        query: &str,
        group_by: &str,
        stats_field: &str,
    ) -> std::result::Result<IndexMap<String, BucketStats>, ElasticsearchError> {
        self.get_aggregations_with(query, group_by, stats_field, &DEFAULT_PERCENTS, DEFAULT_BUCKETS)
    }

    /// The rough equivalent of
    /// `SELECT PERCENTILE(stats_field, ...) .. GROUP BY group_by LIMIT buckets`,
    /// bounded to the window like every other query.
    ///
    /// `group_by` has to be a `keyword`-typed field; grouping over analyzed
    /// text is refused by the store, not here. Buckets come back in the
    /// store's order, largest first.
    pub fn get_aggregations_with(
        &self,
        query: &str,
        group_by: &str,
        stats_field: &str,
        percents: &[f64],
        buckets: usize,
    ) -> std::result::Result<IndexMap<String, BucketStats>, ElasticsearchError> {
        let body = QueryBody::new(query_dsl::query_string(query))
            .and(query_dsl::timestamp_range(&self.window));

        info!("aggregating {} stats grouped by {}", stats_field, group_by);

        let result = self
            .elasticsearch
            .aggregate::<GroupByBuckets>(
                body,
                serde_json::json! {
                    {
                        "terms": {
                            "field": group_by,
                            "size": buckets
                        },
                        "aggregations": {
                            "field_stats": {
                                "percentiles": {
                                    "field": stats_field,
                                    "percents": percents
                                }
                            }
                        }
                    }
                },
            )
            .execute()?;

        Ok(flatten_buckets(result))
    }

    /// Lower bound of the window, inclusive.
    pub fn since_timestamp(&self) -> i64 {
        self.window.since()
    }

    /// Upper bound of the window, for chaining follow-up queries that must
    /// pick up exactly where this client's data ends.
    pub fn to_timestamp(&self) -> i64 {
        self.window.to()
    }

    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// The comma-joined dated indices queries run against.
    pub fn index(&self) -> &str {
        self.index.as_str()
    }

    fn search_body(&self, query: Value, fields: Option<&[&str]>, sampling: Option<u8>) -> Value {
        let mut body = QueryBody::new(query).and(query_dsl::timestamp_range(&self.window));

        if let Some(percent) = sampling {
            body = body.and(query_dsl::sampling(percent));
        }

        match fields {
            Some(fields) if !fields.is_empty() => body = body.source(fields),
            _ => {}
        }

        body.into_value()
    }
}

fn flatten_buckets(group_by: GroupByBuckets) -> IndexMap<String, BucketStats> {
    group_by
        .buckets
        .into_iter()
        .map(|bucket| {
            (
                bucket_key_to_string(bucket.key),
                BucketStats {
                    count: bucket.doc_count,
                    percentiles: bucket.field_stats.values,
                },
            )
        })
        .collect()
}

fn bucket_key_to_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
