use reqwest::StatusCode;
use thiserror::Error;

/// Why a call to one of the upstream HTTP services did not produce a usable
/// payload.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("request timed out")]
    Timeout,

    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request could not be built, e.g. a bad configured URL. Never
    /// absorbed as an outage.
    #[error("invalid request: {0}")]
    InvalidRequest(#[source] reqwest::Error),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            UpstreamError::InvalidRequest(err)
        } else if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Malformed(err.to_string())
        } else {
            UpstreamError::Transport(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing or empty input. Nothing downstream was called.
    #[error("{0}")]
    Validation(String),

    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(#[source] UpstreamError),

    #[error("vector search unavailable: {0}")]
    RetrievalUnavailable(#[source] UpstreamError),

    #[error("Error generating response: {0}")]
    GenerationFailed(#[source] UpstreamError),

    #[error("failed to record chat turn: {0}")]
    RecordingFailed(#[from] sqlx::Error),
}

impl RelayError {
    pub fn no_message() -> Self {
        RelayError::Validation("No message provided".to_string())
    }

    /// Soft failures degrade the pipeline to an empty context instead of
    /// aborting it. A request that could not even be built is a setup error
    /// and stays hard.
    pub fn is_context_unavailable(&self) -> bool {
        match self {
            RelayError::EmbeddingUnavailable(cause) | RelayError::RetrievalUnavailable(cause) => {
                !matches!(cause, UpstreamError::InvalidRequest(_))
            }
            _ => false,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
