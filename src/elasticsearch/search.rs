use crate::elasticsearch::{Elasticsearch, ElasticsearchError};
use crate::LogRow;
use serde::*;
use serde_json::*;
use tracing::debug;

/// How long the store keeps the cursor alive between batches.
const SCROLL_KEEPALIVE: &str = "10m";

pub struct ElasticsearchSearchRequest {
    elasticsearch: Elasticsearch,
    body: Value,
    batch_size: usize,
}

#[derive(Deserialize)]
pub struct InnerHit {
    #[serde(rename = "_source", default)]
    source: LogRow,
}

#[derive(Deserialize)]
pub struct Hits {
    hits: Option<Vec<InnerHit>>,
}

#[derive(Deserialize)]
pub struct ElasticsearchSearchResponse {
    #[serde(skip)]
    elasticsearch: Option<Elasticsearch>,

    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,

    hits: Hits,
}

impl ElasticsearchSearchRequest {
    pub fn new(elasticsearch: &Elasticsearch, body: Value, batch_size: usize) -> Self {
        ElasticsearchSearchRequest {
            elasticsearch: elasticsearch.clone(),
            body,
            batch_size,
        }
    }

    /// Run the initial search, opening a scroll cursor over the full result
    /// set. Batches arrive in internal `_doc` order, the cheapest order the
    /// store can produce, so callers must not read any ranking into it.
    pub fn execute(self) -> std::result::Result<ElasticsearchSearchResponse, ElasticsearchError> {
        let mut url = String::new();
        url.push_str(&self.elasticsearch.base_url());
        url.push_str("/_search");
        url.push_str("?scroll=");
        url.push_str(SCROLL_KEEPALIVE);
        url.push_str("&sort=_doc");
        url.push_str(&format!("&size={}", self.batch_size));

        debug!("searching {}", url);

        ElasticsearchSearchRequest::get_hits(url, self.body, self.elasticsearch)
    }

    fn scroll(
        elasticsearch: &Elasticsearch,
        scroll_id: &str,
    ) -> std::result::Result<ElasticsearchSearchResponse, ElasticsearchError> {
        let mut url = String::new();
        url.push_str(elasticsearch.url());
        url.push_str("_search/scroll");

        ElasticsearchSearchRequest::get_hits(
            url,
            json! {
                {
                    "scroll": SCROLL_KEEPALIVE,
                    "scroll_id": scroll_id
                }
            },
            elasticsearch.clone(),
        )
    }

    fn get_hits(
        url: String,
        body: Value,
        elasticsearch: Elasticsearch,
    ) -> std::result::Result<ElasticsearchSearchResponse, ElasticsearchError> {
        let request = elasticsearch
            .client()
            .post(&url)
            .set("content-type", "application/json");

        Elasticsearch::execute_request(request, Some(body), |code, body| {
            let mut response = match serde_json::from_str::<ElasticsearchSearchResponse>(&body) {
                Ok(json) => json,
                Err(_) => {
                    return Err(ElasticsearchError::undecodable(code, body));
                }
            };

            // hand our handle to the response too, for use during iteration
            response.elasticsearch = Some(elasticsearch);

            Ok(response)
        })
    }
}

/// Lazily walks the cursor batch by batch, yielding one document body at a
/// time. Dropping it, finished or not, releases the cursor on the store.
pub struct Scroller {
    elasticsearch: Elasticsearch,
    scroll_id: Option<String>,
    current: std::vec::IntoIter<InnerHit>,
    exhausted: bool,
}

impl Iterator for Scroller {
    type Item = std::result::Result<LogRow, ElasticsearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.current.next() {
                return Some(Ok(hit.source));
            }

            if self.exhausted {
                return None;
            }

            let scroll_id = match &self.scroll_id {
                Some(scroll_id) => scroll_id.clone(),
                None => return None,
            };

            match ElasticsearchSearchRequest::scroll(&self.elasticsearch, &scroll_id) {
                Ok(response) => {
                    // the store may rotate the cursor id between batches
                    if let Some(scroll_id) = response.scroll_id {
                        self.scroll_id = Some(scroll_id);
                    }

                    let hits = response.hits.hits.unwrap_or_default();
                    if hits.is_empty() {
                        self.exhausted = true;
                    } else {
                        self.current = hits.into_iter();
                    }
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl Drop for Scroller {
    fn drop(&mut self) {
        if let Some(scroll_id) = self.scroll_id.take() {
            debug!("releasing scroll cursor");

            let mut url = String::new();
            url.push_str(self.elasticsearch.url());
            url.push_str("_search/scroll");

            // a failure here only means the cursor lives on until its
            // keepalive expires, so there is nothing to report
            Elasticsearch::execute_request(
                self.elasticsearch
                    .client()
                    .delete(&url)
                    .set("content-type", "application/json"),
                Some(json! {
                    {
                        "scroll_id": [scroll_id]
                    }
                }),
                |_, _| Ok(()),
            )
            .ok();
        }
    }
}

impl IntoIterator for ElasticsearchSearchResponse {
    type Item = std::result::Result<LogRow, ElasticsearchError>;
    type IntoIter = Scroller;

    fn into_iter(self) -> Self::IntoIter {
        let hits = self.hits.hits.unwrap_or_default();

        Scroller {
            elasticsearch: self.elasticsearch.expect("no elasticsearch"),
            scroll_id: self.scroll_id,
            exhausted: hits.is_empty(),
            current: hits.into_iter(),
        }
    }
}
