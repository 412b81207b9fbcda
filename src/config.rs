use std::time::Duration;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Flat view of the environment, one field per variable.
#[derive(Debug, Deserialize)]
struct RawSettings {
    ollama_host: String,
    ollama_port: u16,
    ollama_model: String,
    ollama_embedding_model: Option<String>,
    qdrant_host: String,
    qdrant_port: u16,
    collection_name: String,
    db_host: String,
    db_port: u16,
    db_user: String,
    db_password: String,
    db_name: String,
    database_url: Option<String>,
    port: u16,
    top_k: u64,
    embedding_timeout_secs: u64,
    search_timeout_secs: u64,
    generation_timeout_secs: u64,
    record_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub url: String,
    pub limit: u64,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub url: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    /// host:port only, safe to log.
    pub display_addr: String,
    pub acquire_timeout: Duration,
}

/// Everything the webhook server needs, split per client so each one is
/// constructed from its own section.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub generation: GenerationConfig,
    pub store: StoreConfig,
}

impl Settings {
    /// Reads `.env` (if present) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_source(Environment::default())
    }

    fn from_source(env: Environment) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .set_default("ollama_host", "ollama")?
            .set_default("ollama_port", 11434)?
            .set_default("ollama_model", "llama2")?
            .set_default("qdrant_host", "qdrant")?
            .set_default("qdrant_port", 6333)?
            .set_default("collection_name", "documents")?
            .set_default("db_host", "postgres")?
            .set_default("db_port", 5432)?
            .set_default("db_user", "username")?
            .set_default("db_password", "password")?
            .set_default("db_name", "chat_memory")?
            .set_default("port", 5678)?
            .set_default("top_k", 3)?
            .set_default("embedding_timeout_secs", 30)?
            .set_default("search_timeout_secs", 30)?
            .set_default("generation_timeout_secs", 60)?
            .set_default("record_timeout_secs", 5)?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Ok(raw.into())
    }
}

impl From<RawSettings> for Settings {
    fn from(raw: RawSettings) -> Self {
        let ollama = format!("http://{}:{}", raw.ollama_host, raw.ollama_port);
        let qdrant = format!("http://{}:{}", raw.qdrant_host, raw.qdrant_port);
        let database_url = raw.database_url.unwrap_or_else(|| {
            format!(
                "postgresql://{}:{}@{}:{}/{}",
                raw.db_user, raw.db_password, raw.db_host, raw.db_port, raw.db_name
            )
        });

        Settings {
            port: raw.port,
            embedding: EmbeddingConfig {
                url: format!("{}/api/embeddings", ollama),
                model: raw
                    .ollama_embedding_model
                    .unwrap_or_else(|| raw.ollama_model.clone()),
                timeout: Duration::from_secs(raw.embedding_timeout_secs),
            },
            search: SearchConfig {
                url: format!(
                    "{}/collections/{}/points/search",
                    qdrant, raw.collection_name
                ),
                limit: raw.top_k,
                timeout: Duration::from_secs(raw.search_timeout_secs),
            },
            generation: GenerationConfig {
                url: format!("{}/api/generate", ollama),
                model: raw.ollama_model,
                timeout: Duration::from_secs(raw.generation_timeout_secs),
            },
            store: StoreConfig {
                database_url,
                display_addr: format!("{}:{}", raw.db_host, raw.db_port),
                acquire_timeout: Duration::from_secs(raw.record_timeout_secs),
            },
        }
    }
}
