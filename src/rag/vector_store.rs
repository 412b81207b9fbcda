use async_trait::async_trait;
use reqwest::Client;

use crate::config::SearchConfig;
use crate::error::RelayError;
use crate::models::{RetrievedFragment, ScoredPoint, SearchRequest, SearchResponse};
use crate::upstream::{client_with_timeout, post_json};

/// Similarity search over the document index.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Returns at most `limit` fragments, best match first.
    async fn search(
        &self,
        vector: &[f32],
        limit: u64,
    ) -> Result<Vec<RetrievedFragment>, RelayError>;
}

/// Search through the Qdrant REST API (`POST /collections/{name}/points/search`).
pub struct QdrantSearch {
    client: Client,
    url: String,
}

impl QdrantSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client_with_timeout(config.timeout)?,
            url: config.url.clone(),
        })
    }
}

impl From<ScoredPoint> for RetrievedFragment {
    fn from(point: ScoredPoint) -> Self {
        let source_payload = point.payload.unwrap_or_default();
        let text = source_payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        RetrievedFragment {
            text,
            score: point.score,
            source_payload,
        }
    }
}

#[async_trait]
impl VectorSearch for QdrantSearch {
    async fn search(
        &self,
        vector: &[f32],
        limit: u64,
    ) -> Result<Vec<RetrievedFragment>, RelayError> {
        tracing::debug!("Searching Qdrant at {}", self.url);

        let body = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };
        let response: SearchResponse = post_json(&self.client, &self.url, &body)
            .await
            .map_err(RelayError::RetrievalUnavailable)?;

        let mut fragments: Vec<RetrievedFragment> =
            response.result.into_iter().map(Into::into).collect();
        fragments.sort_by(|a, b| b.score.total_cmp(&a.score));
        fragments.truncate(limit as usize);

        Ok(fragments)
    }
}
