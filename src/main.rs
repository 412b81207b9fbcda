use std::sync::Arc;

use anyhow::Result;

use rag_relay::config::Settings;
use rag_relay::pipeline::RagPipeline;
use rag_relay::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // ロギング初期化
    rag_relay::init_tracing();

    // 設定読み込み
    let settings = Settings::load()?;

    tracing::info!("Ollama embeddings: {}", settings.embedding.url);
    tracing::info!("Ollama generation: {}", settings.generation.url);
    tracing::info!("Qdrant search: {}", settings.search.url);
    tracing::info!("PostgreSQL: {}", settings.store.display_addr);

    // コンポーネント初期化
    let pipeline = RagPipeline::from_settings(&settings)?;
    let state = Arc::new(AppState { pipeline });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port)).await?;
    tracing::info!("Webhook server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(rag_relay::shutdown_signal())
        .await?;

    Ok(())
}
