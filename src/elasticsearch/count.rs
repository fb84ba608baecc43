use crate::elasticsearch::{Elasticsearch, ElasticsearchError};
use serde::*;
use serde_json::*;

pub struct ElasticsearchCountRequest {
    elasticsearch: Elasticsearch,
    body: Value,
}

impl ElasticsearchCountRequest {
    pub fn new(elasticsearch: &Elasticsearch, body: Value) -> Self {
        ElasticsearchCountRequest {
            elasticsearch: elasticsearch.clone(),
            body,
        }
    }

    /// Ask the store for the matching-document count without moving any
    /// documents.
    pub fn execute(self) -> std::result::Result<u64, ElasticsearchError> {
        let mut url = self.elasticsearch.base_url();
        url.push_str("/_count");

        Elasticsearch::execute_request(
            self.elasticsearch
                .client()
                .post(&url)
                .set("content-type", "application/json"),
            Some(self.body),
            |code, body| {
                #[derive(Deserialize)]
                struct Count {
                    count: u64,
                }

                let count = match serde_json::from_str::<Count>(&body) {
                    Ok(count) => count,
                    Err(_) => {
                        return Err(ElasticsearchError::undecodable(code, body));
                    }
                };

                Ok(count.count)
            },
        )
    }
}
