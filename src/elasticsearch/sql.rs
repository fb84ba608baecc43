use crate::elasticsearch::{Elasticsearch, ElasticsearchError};
use crate::LogRow;
use serde::*;
use serde_json::*;

pub struct ElasticsearchSqlRequest {
    elasticsearch: Elasticsearch,
    statement: String,
}

#[derive(Deserialize)]
struct SqlColumn {
    name: String,
}

#[derive(Deserialize)]
struct SqlResponse {
    columns: Vec<SqlColumn>,
    rows: Vec<Vec<Value>>,
}

impl ElasticsearchSqlRequest {
    pub fn new(elasticsearch: &Elasticsearch, statement: &str) -> Self {
        ElasticsearchSqlRequest {
            elasticsearch: elasticsearch.clone(),
            statement: statement.to_string(),
        }
    }

    /// POST the statement to the SQL endpoint untouched. The statement names
    /// its own indices and time bounds; nothing is injected here.
    ///
    /// See https://www.elastic.co/guide/en/elasticsearch/reference/6.8/sql-rest.html
    pub fn execute(self) -> std::result::Result<Vec<LogRow>, ElasticsearchError> {
        let mut url = String::new();
        url.push_str(self.elasticsearch.url());
        url.push_str("_xpack/sql");
        url.push_str("?format=json");

        Elasticsearch::execute_request(
            self.elasticsearch
                .client()
                .post(&url)
                .set("content-type", "application/json"),
            Some(json! {
                {
                    "query": self.statement
                }
            }),
            |code, body| {
                let response = match serde_json::from_str::<SqlResponse>(&body) {
                    Ok(response) => response,
                    Err(_) => {
                        return Err(ElasticsearchError::undecodable(code, body));
                    }
                };

                Ok(zip_rows(response))
            },
        )
    }
}

/// The endpoint answers columnar: column metadata once, then bare value
/// arrays. Pair them back up positionally so SQL results read like the
/// documents every other query returns.
fn zip_rows(response: SqlResponse) -> Vec<LogRow> {
    let SqlResponse { columns, rows } = response;

    rows.into_iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| column.name.clone())
                .zip(row)
                .collect()
        })
        .collect()
}
