#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Map;

use rag_relay::config::{EmbeddingConfig, GenerationConfig, SearchConfig};
use rag_relay::error::{RelayError, UpstreamError};
use rag_relay::models::{ChatTurn, EmbeddingVector, RetrievedFragment};
use rag_relay::pipeline::RagPipeline;
use rag_relay::prompt::GenerationPrompt;
use rag_relay::proxy::Generator;
use rag_relay::rag::embeddings::Embedder;
use rag_relay::rag::vector_store::VectorSearch;
use rag_relay::rag::ContextRetriever;
use rag_relay::recorder::ChatRecorder;

/// Nothing listens here; connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub fn embedding_config(url: impl Into<String>) -> EmbeddingConfig {
    EmbeddingConfig {
        url: url.into(),
        model: "llama2".to_string(),
        timeout: Duration::from_secs(2),
    }
}

pub fn search_config(url: impl Into<String>) -> SearchConfig {
    SearchConfig {
        url: url.into(),
        limit: 3,
        timeout: Duration::from_secs(2),
    }
}

pub fn generation_config(url: impl Into<String>, timeout: Duration) -> GenerationConfig {
    GenerationConfig {
        url: url.into(),
        model: "llama2".to_string(),
        timeout,
    }
}

pub fn fragment(text: &str, score: f32) -> RetrievedFragment {
    RetrievedFragment {
        text: Some(text.to_string()),
        score,
        source_payload: Map::new(),
    }
}

#[derive(Default)]
pub struct StubEmbedder {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl StubEmbedder {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _query: &str) -> Result<EmbeddingVector, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RelayError::EmbeddingUnavailable(UpstreamError::Timeout));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }
}

#[derive(Default)]
pub struct StubSearch {
    pub calls: AtomicUsize,
    pub fragments: Vec<RetrievedFragment>,
    pub fail: bool,
}

impl StubSearch {
    pub fn returning(fragments: Vec<RetrievedFragment>) -> Self {
        Self {
            fragments,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorSearch for StubSearch {
    async fn search(
        &self,
        _vector: &[f32],
        limit: u64,
    ) -> Result<Vec<RetrievedFragment>, RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RelayError::RetrievalUnavailable(UpstreamError::Malformed(
                "missing result".to_string(),
            )));
        }
        Ok(self.fragments.iter().take(limit as usize).cloned().collect())
    }
}

/// Answers with a fixed text and remembers every prompt it saw.
pub struct StubGenerator {
    pub prompts: Mutex<Vec<String>>,
    pub answer: Option<String>,
    pub fail: bool,
}

impl StubGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            answer: Some(answer.to_string()),
            fail: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            answer: None,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            answer: None,
            fail: true,
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<Option<String>, RelayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(RelayError::GenerationFailed(UpstreamError::Timeout));
        }
        Ok(self.answer.clone())
    }
}

#[derive(Default)]
pub struct MemoryRecorder {
    pub turns: Mutex<Vec<ChatTurn>>,
    pub attempts: AtomicUsize,
    pub fail: bool,
}

impl MemoryRecorder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.turns.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatRecorder for MemoryRecorder {
    async fn record(&self, turn: &ChatTurn) -> Result<(), RelayError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RelayError::RecordingFailed(sqlx::Error::PoolTimedOut));
        }
        self.turns.lock().unwrap().push(turn.clone());
        Ok(())
    }
}

pub struct Harness {
    pub embedder: Arc<StubEmbedder>,
    pub search: Arc<StubSearch>,
    pub generator: Arc<StubGenerator>,
    pub recorder: Arc<MemoryRecorder>,
}

impl Harness {
    pub fn new(
        embedder: StubEmbedder,
        search: StubSearch,
        generator: StubGenerator,
        recorder: MemoryRecorder,
    ) -> Self {
        Self {
            embedder: Arc::new(embedder),
            search: Arc::new(search),
            generator: Arc::new(generator),
            recorder: Arc::new(recorder),
        }
    }

    pub fn pipeline(&self) -> RagPipeline {
        let retriever = ContextRetriever::new(self.embedder.clone(), self.search.clone(), 3);
        RagPipeline::new(retriever, self.generator.clone(), self.recorder.clone())
    }
}

/// A recorder whose write never completes, like a stuck lock wait.
#[derive(Default)]
pub struct StalledRecorder {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl ChatRecorder for StalledRecorder {
    async fn record(&self, _turn: &ChatTurn) -> Result<(), RelayError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<()>().await;
        Ok(())
    }
}
