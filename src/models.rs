use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_SESSION_ID: &str = "default";

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

/// Inbound chat request, shared by the webhook server and the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    /// Caller-supplied context. When present and non-empty, retrieval is
    /// skipped and this text is used verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_context: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
            document_context: None,
        }
    }

    pub fn with_document_context(mut self, context: impl Into<String>) -> Self {
        self.document_context = Some(context.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// One completed exchange. `ai_response` is `None` when the generation
/// service succeeded but returned no answer text.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub session_id: String,
    pub user_message: String,
    pub ai_response: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(session_id: &str, user_message: &str, ai_response: Option<String>) -> Self {
        Self {
            session_id: session_id.to_string(),
            user_message: user_message.to_string(),
            ai_response,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedFragment {
    pub text: Option<String>,
    pub score: f32,
    pub source_payload: Map<String, Value>,
}

pub type EmbeddingVector = Vec<f32>;

// Ollama / Qdrant wire types

#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct SearchRequest<'a> {
    pub vector: &'a [f32],
    pub limit: u64,
    pub with_payload: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
pub struct ScoredPoint {
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
}
