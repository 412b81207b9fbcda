use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use reqwest::Client;

use rag_relay::gateway::{router, GatewayState};

#[derive(Parser, Debug)]
#[command(name = "chat-gateway")]
#[command(about = "Relay chat requests from the web UI to the RAG webhook server")]
struct Args {
    /// Webhook endpoint that runs the RAG pipeline
    #[arg(long, env = "WEBHOOK_URL")]
    webhook_url: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Upper bound on a forwarded request, in seconds
    #[arg(long, env = "GATEWAY_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    rag_relay::init_tracing();

    let args = Args::parse();

    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;
    let state = Arc::new(GatewayState::new(client, args.webhook_url.clone()));

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port)).await?;
    tracing::info!(
        "Chat gateway listening on {}, forwarding to {}",
        listener.local_addr()?,
        args.webhook_url
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(rag_relay::shutdown_signal())
        .await?;

    Ok(())
}
