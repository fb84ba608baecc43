use serde::*;
use serde_json::Value;

pub mod matches;
pub mod query_string;
pub mod range;
pub mod sampling;

pub use matches::matches;
pub use query_string::query_string;
pub use range::timestamp_range;
pub use sampling::sampling;

/// A search body under assembly.
///
/// Every query this crate sends is a `bool.must` conjunction of clauses,
/// optionally trimmed to selected source fields and optionally carrying an
/// aggregation subtree.
#[derive(Debug, Clone, Serialize)]
pub struct QueryBody {
    query: BoolQuery,

    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    source: Option<SourceFilter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    aggregations: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
struct BoolQuery {
    bool: Must,
}

#[derive(Debug, Clone, Serialize)]
struct Must {
    must: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
struct SourceFilter {
    includes: Vec<String>,
}

impl QueryBody {
    /// Start a body from its content clause.
    pub fn new(clause: Value) -> Self {
        QueryBody {
            query: BoolQuery {
                bool: Must {
                    must: vec![clause],
                },
            },
            source: None,
            aggregations: None,
        }
    }

    /// Require a further clause to match as well.
    pub fn and(mut self, clause: Value) -> Self {
        self.query.bool.must.push(clause);
        self
    }

    /// Strip returned documents down to the named fields.
    pub fn source(mut self, fields: &[&str]) -> Self {
        self.source = Some(SourceFilter {
            includes: fields.iter().map(|field| field.to_string()).collect(),
        });
        self
    }

    pub fn aggregations(mut self, aggregations: Value) -> Self {
        self.aggregations = Some(aggregations);
        self
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(&self).expect("failed to serialize query body")
    }
}
