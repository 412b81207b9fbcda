pub mod embeddings;
pub mod vector_store;

use std::sync::Arc;

use crate::error::RelayError;
use crate::models::RetrievedFragment;
use self::embeddings::Embedder;
use self::vector_store::VectorSearch;

const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Joins fragment texts with a blank line, skipping fragments that carry no
/// text payload.
pub fn assemble_context(fragments: &[RetrievedFragment]) -> String {
    fragments
        .iter()
        .filter_map(|f| f.text.as_deref())
        .collect::<Vec<_>>()
        .join(FRAGMENT_SEPARATOR)
}

/// Embeds a query and looks up its nearest document fragments.
pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    search: Arc<dyn VectorSearch>,
    top_k: u64,
}

impl ContextRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, search: Arc<dyn VectorSearch>, top_k: u64) -> Self {
        Self {
            embedder,
            search,
            top_k,
        }
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedFragment>, RelayError> {
        let query_embedding = self.embedder.embed(query).await?;
        self.search.search(&query_embedding, self.top_k).await
    }

    pub async fn retrieve_context(&self, query: &str) -> Result<String, RelayError> {
        let fragments = self.retrieve(query).await?;
        tracing::debug!("Retrieved {} fragments", fragments.len());
        Ok(assemble_context(&fragments))
    }
}
