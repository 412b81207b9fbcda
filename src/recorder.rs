use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;

use crate::config::StoreConfig;
use crate::error::RelayError;
use crate::models::ChatTurn;

/// Append-only sink for completed chat turns.
#[async_trait]
pub trait ChatRecorder: Send + Sync {
    async fn record(&self, turn: &ChatTurn) -> Result<(), RelayError>;
}

/// Writes chat turns to the `chat_history` table.
///
/// The pool connects lazily, so the server comes up even while Postgres is
/// still starting. The schema is created on the first write that reaches the
/// database; a failed attempt is retried on the next one.
pub struct PgChatRecorder {
    pool: PgPool,
    schema_ready: OnceCell<()>,
}

impl PgChatRecorder {
    pub fn new(config: &StoreConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(&config.database_url)?;

        Ok(Self {
            pool,
            schema_ready: OnceCell::new(),
        })
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_history (
                id SERIAL PRIMARY KEY,
                session_id VARCHAR(100) NOT NULL,
                user_message TEXT NOT NULL,
                ai_response TEXT,
                timestamp TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_chat_history_session
            ON chat_history(session_id, timestamp DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ChatRecorder for PgChatRecorder {
    async fn record(&self, turn: &ChatTurn) -> Result<(), RelayError> {
        self.schema_ready
            .get_or_try_init(|| self.init_schema())
            .await?;

        sqlx::query(
            r#"
            INSERT INTO chat_history (session_id, user_message, ai_response, timestamp)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&turn.session_id)
        .bind(&turn.user_message)
        .bind(turn.ai_response.as_deref())
        .bind(turn.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
