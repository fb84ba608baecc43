use crate::elasticsearch::{Elasticsearch, ElasticsearchError};
use crate::query_dsl::QueryBody;
use serde::de::DeserializeOwned;
use serde::*;
use serde_json::*;
use std::collections::HashMap;
use std::marker::PhantomData;

pub struct ElasticsearchAggregateSearchRequest<ReturnType>
where
    ReturnType: DeserializeOwned,
{
    elasticsearch: Elasticsearch,
    json_query: Value,
    _marker: PhantomData<ReturnType>,
}

impl<ReturnType> ElasticsearchAggregateSearchRequest<ReturnType>
where
    ReturnType: DeserializeOwned,
{
    /// Nest `aggregation` under a fixed name so `execute` knows which
    /// subtree of the response to hand back.
    pub fn new(
        elasticsearch: &Elasticsearch,
        query: QueryBody,
        aggregation: Value,
    ) -> ElasticsearchAggregateSearchRequest<ReturnType> {
        ElasticsearchAggregateSearchRequest::<ReturnType> {
            elasticsearch: elasticsearch.clone(),
            json_query: query
                .aggregations(json! {
                    {
                        "group_by_agg": aggregation
                    }
                })
                .into_value(),
            _marker: PhantomData::<ReturnType>,
        }
    }

    /// Run the aggregation with `size=0`: buckets are the whole point, no
    /// documents need to leave the store.
    pub fn execute(self) -> std::result::Result<ReturnType, ElasticsearchError> {
        let mut url = self.elasticsearch.base_url();
        url.push_str("/_search");
        url.push_str("?size=0");

        Elasticsearch::execute_request(
            self.elasticsearch
                .client()
                .post(&url)
                .set("content-type", "application/json"),
            Some(self.json_query),
            |code, body| {
                #[derive(Deserialize)]
                struct AggregateResponse {
                    aggregations: HashMap<String, Value>,
                }

                let mut response = match serde_json::from_str::<AggregateResponse>(&body) {
                    Ok(response) => response,
                    Err(_) => {
                        return Err(ElasticsearchError::undecodable(code, body));
                    }
                };

                let the_agg = match response.aggregations.remove("group_by_agg") {
                    Some(the_agg) => the_agg,
                    None => {
                        return Err(ElasticsearchError::Transport(
                            "no 'group_by_agg' in aggregate response".to_string(),
                        ));
                    }
                };

                serde_json::from_value::<ReturnType>(the_agg).map_err(|e| {
                    ElasticsearchError::Transport(format!("undecodable aggregation: {}", e))
                })
            },
        )
    }
}
