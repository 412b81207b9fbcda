use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::error::RelayError;
use crate::models::{ChatReply, ChatRequest, ChatTurn};
use crate::prompt::build_prompt;
use crate::proxy::{Generator, OllamaGenerator, FALLBACK_RESPONSE};
use crate::rag::embeddings::OllamaEmbedder;
use crate::rag::vector_store::QdrantSearch;
use crate::rag::ContextRetriever;
use crate::recorder::{ChatRecorder, PgChatRecorder};

const DEFAULT_RECORD_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub reply: ChatReply,
    pub recorded: RecordOutcome,
}

/// Runs one chat request through retrieval, generation and recording.
///
/// Only validation and generation can fail a request. Embedding or search
/// outages degrade to an empty context, and a failed write to the chat log
/// is logged without touching the reply.
pub struct RagPipeline {
    retriever: ContextRetriever,
    generator: Arc<dyn Generator>,
    recorder: Arc<dyn ChatRecorder>,
    record_timeout: Duration,
}

impl RagPipeline {
    pub fn new(
        retriever: ContextRetriever,
        generator: Arc<dyn Generator>,
        recorder: Arc<dyn ChatRecorder>,
    ) -> Self {
        Self {
            retriever,
            generator,
            recorder,
            record_timeout: DEFAULT_RECORD_TIMEOUT,
        }
    }

    /// Upper bound on the whole record step, schema creation included.
    pub fn with_record_timeout(mut self, timeout: Duration) -> Self {
        self.record_timeout = timeout;
        self
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let retriever = ContextRetriever::new(
            Arc::new(OllamaEmbedder::new(&settings.embedding)?),
            Arc::new(QdrantSearch::new(&settings.search)?),
            settings.search.limit,
        );
        let generator = Arc::new(OllamaGenerator::new(&settings.generation)?);
        let recorder = Arc::new(PgChatRecorder::new(&settings.store)?);

        Ok(Self::new(retriever, generator, recorder)
            .with_record_timeout(settings.store.acquire_timeout))
    }

    #[tracing::instrument(skip_all, fields(session_id = %request.session_id))]
    pub async fn run(&self, request: ChatRequest) -> Result<ChatOutcome, RelayError> {
        if request.message.is_empty() {
            return Err(RelayError::no_message());
        }

        // 1. コンテキスト取得
        let context = match request.document_context.filter(|c| !c.is_empty()) {
            Some(supplied) => {
                tracing::debug!("Using caller-supplied document context");
                supplied
            }
            None => self.acquire_context(&request.message).await?,
        };

        // 2. 生成
        let prompt = build_prompt(&context, &request.message);
        let answer = self.generator.generate(&prompt).await?;
        if answer.is_none() {
            tracing::warn!("Generation returned no answer text");
        }

        // 3. 記録
        let turn = ChatTurn::new(&request.session_id, &request.message, answer.clone());
        let recorded = self.record(&turn).await;

        Ok(ChatOutcome {
            reply: ChatReply {
                response: answer.unwrap_or_else(|| FALLBACK_RESPONSE.to_string()),
                session_id: request.session_id,
            },
            recorded,
        })
    }

    async fn acquire_context(&self, query: &str) -> Result<String, RelayError> {
        match self.retriever.retrieve_context(query).await {
            Ok(context) => Ok(context),
            Err(e) if e.is_context_unavailable() => {
                tracing::warn!(error = %e, "Continuing with empty context");
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn record(&self, turn: &ChatTurn) -> RecordOutcome {
        match tokio::time::timeout(self.record_timeout, self.recorder.record(turn)).await {
            Ok(Ok(())) => {
                tracing::debug!(recorded = true, "Chat turn recorded");
                RecordOutcome::Recorded
            }
            Ok(Err(e)) => {
                tracing::warn!(recorded = false, error = %e, "Failed to record chat turn");
                RecordOutcome::Failed
            }
            Err(_) => {
                tracing::warn!(
                    recorded = false,
                    timeout = ?self.record_timeout,
                    "Recording chat turn timed out"
                );
                RecordOutcome::Failed
            }
        }
    }
}
