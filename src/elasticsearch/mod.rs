use serde_json::Value;
use std::io::Read;
use std::time::Duration;

mod aggregate_search;
mod count;
mod search;
mod sql;

pub use aggregate_search::ElasticsearchAggregateSearchRequest;
pub use count::ElasticsearchCountRequest;
pub use search::{ElasticsearchSearchRequest, ElasticsearchSearchResponse, Scroller};
pub use sql::ElasticsearchSqlRequest;

/// Everything a request against the store can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ElasticsearchError {
    /// The client was built from parameters the store was never asked about,
    /// such as an unparseable host. Retrying cannot help.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The store itself rejected the request: bad query syntax, a missing
    /// index, refused SQL. Carries the response status and the error body
    /// verbatim.
    #[error("elasticsearch returned {status}: {reason}")]
    Query { status: u16, reason: String },

    /// The store could not be reached, the connection broke off mid-reply,
    /// or a 2xx response failed to decode.
    #[error("elasticsearch transport failure: {0}")]
    Transport(String),
}

impl ElasticsearchError {
    /// HTTP status the store answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ElasticsearchError::Query { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            ElasticsearchError::Configuration(reason) => reason,
            ElasticsearchError::Query { reason, .. } => reason,
            ElasticsearchError::Transport(reason) => reason,
        }
    }

    pub(crate) fn undecodable(status: u16, body: String) -> Self {
        ElasticsearchError::Transport(format!("undecodable {} response: {}", status, body))
    }
}

/// A handle onto one cluster, scoped to the indices every query runs
/// against. Cloning shares the underlying connection pool.
#[derive(Clone)]
pub struct Elasticsearch {
    agent: ureq::Agent,
    url: String,
    index: String,
}

impl std::fmt::Debug for Elasticsearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Elasticsearch")
            .field("url", &self.url)
            .field("index", &self.index)
            .finish()
    }
}

impl Elasticsearch {
    /// `host` may be a full url or a bare `host:port`, which is assumed to
    /// be plain http. `index` is passed through to the store untouched, so
    /// a comma-joined list selects several indices at once.
    pub fn new(
        host: &str,
        index: &str,
        read_timeout: Duration,
    ) -> std::result::Result<Self, ElasticsearchError> {
        if host.trim().is_empty() {
            return Err(ElasticsearchError::Configuration(
                "empty elasticsearch host".into(),
            ));
        }

        let host = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        let url = url::Url::parse(&host).map_err(|e| {
            ElasticsearchError::Configuration(format!("malformed host {:?}: {}", host, e))
        })?;

        let mut url = url.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }

        let agent = ureq::AgentBuilder::new()
            .timeout_connect(read_timeout)
            .timeout_read(read_timeout)
            .build();

        Ok(Elasticsearch {
            agent,
            url,
            index: index.to_string(),
        })
    }

    /// Root url of the cluster, trailing slash included.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The index expression queries are scoped to.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Root url plus the index expression, the prefix of every per-index
    /// endpoint.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.url, self.index)
    }

    pub fn open_search(&self, body: Value, batch_size: usize) -> ElasticsearchSearchRequest {
        ElasticsearchSearchRequest::new(self, body, batch_size)
    }

    pub fn count(&self, body: Value) -> ElasticsearchCountRequest {
        ElasticsearchCountRequest::new(self, body)
    }

    pub fn sql(&self, statement: &str) -> ElasticsearchSqlRequest {
        ElasticsearchSqlRequest::new(self, statement)
    }

    pub fn aggregate<ReturnType>(
        &self,
        query: crate::query_dsl::QueryBody,
        aggregation: Value,
    ) -> ElasticsearchAggregateSearchRequest<ReturnType>
    where
        ReturnType: serde::de::DeserializeOwned,
    {
        ElasticsearchAggregateSearchRequest::new(self, query, aggregation)
    }

    pub(crate) fn client(&self) -> &ureq::Agent {
        &self.agent
    }

    /// Funnel for every exchange with the store: send the request, pull the
    /// whole body, and map the ways it can fail onto [`ElasticsearchError`]
    /// before the parser sees anything.
    pub(crate) fn execute_request<F, R>(
        request: ureq::Request,
        body: Option<Value>,
        response_parser: F,
    ) -> std::result::Result<R, ElasticsearchError>
    where
        F: FnOnce(u16, String) -> std::result::Result<R, ElasticsearchError>,
    {
        let response = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        match response {
            Ok(response) => {
                let code = response.status();

                // into_reader() instead of into_string() as the latter is
                // capped at 10MB, which large scroll batches can exceed
                let mut body = String::new();
                response
                    .into_reader()
                    .read_to_string(&mut body)
                    .map_err(|e| ElasticsearchError::Transport(e.to_string()))?;

                response_parser(code, body)
            }
            Err(ureq::Error::Status(code, response)) => Err(ElasticsearchError::Query {
                status: code,
                reason: response.into_string().unwrap_or_default(),
            }),
            Err(e) => Err(ElasticsearchError::Transport(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout() -> Duration {
        Duration::from_secs(10)
    }

    #[test]
    fn test_bare_host_is_assumed_http() {
        let es = Elasticsearch::new("localhost:9200", "logstash-2020.01.01", timeout()).unwrap();
        assert_eq!(es.url(), "http://localhost:9200/");
        assert_eq!(es.base_url(), "http://localhost:9200/logstash-2020.01.01");
    }

    #[test]
    fn test_full_url_kept_as_given() {
        let es = Elasticsearch::new("https://logs.example.net:9243", "a,b", timeout()).unwrap();
        assert_eq!(es.url(), "https://logs.example.net:9243/");
        assert_eq!(es.base_url(), "https://logs.example.net:9243/a,b");
    }

    #[test]
    fn test_trailing_slash_not_doubled() {
        let es = Elasticsearch::new("http://localhost:9200/", "idx", timeout()).unwrap();
        assert_eq!(es.url(), "http://localhost:9200/");
    }

    #[test]
    fn test_empty_host_is_a_configuration_error() {
        let err = Elasticsearch::new("", "idx", timeout()).unwrap_err();
        assert!(matches!(err, ElasticsearchError::Configuration(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_malformed_host_is_a_configuration_error() {
        let err = Elasticsearch::new("http://", "idx", timeout()).unwrap_err();
        assert!(matches!(err, ElasticsearchError::Configuration(_)));
    }

    #[test]
    fn test_query_error_exposes_status_and_reason() {
        let err = ElasticsearchError::Query {
            status: 404,
            reason: "index_not_found_exception".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.reason(), "index_not_found_exception");
        assert_eq!(
            err.to_string(),
            "elasticsearch returned 404: index_not_found_exception"
        );
    }
}
