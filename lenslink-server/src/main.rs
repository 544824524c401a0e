use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use clap::Parser;
use lenslink_server::{SignalingService, allocate_code, ws_handler};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lenslink-server")]
#[command(about = "Pairing and signaling relay for lenslink camera sessions")]
struct Args {
    /// Address for the HTTP/WebSocket listener.
    #[arg(long, default_value = "0.0.0.0:8787")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let service = SignalingService::new();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/rooms", post(create_room))
        .with_state(service);

    info!("Listening on {}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bootstrap endpoint: hands out a room code before any joins occur.
async fn create_room() -> axum::Json<serde_json::Value> {
    let code = allocate_code();
    axum::Json(serde_json::json!({ "code": code.as_str() }))
}
