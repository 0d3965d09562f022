//! Voice turn server: WebSocket device sessions plus artifact serving.

mod config;
mod ws;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use palaver_speech::{ArtifactStore, HttpSynthesizer, HttpWorkflow};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::ws::SessionContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env()?;
    tokio::fs::create_dir_all(&settings.artifact_dir).await?;

    let client = reqwest::Client::new();
    let workflow = HttpWorkflow::new(client.clone(), settings.workflow_url.clone());
    let synthesizer = HttpSynthesizer::new(
        client,
        settings.tts_url.clone(),
        ArtifactStore::new(&settings.artifact_dir, settings.media_base_url.clone()),
    );
    let ctx = Arc::new(SessionContext {
        workflow: Arc::new(workflow),
        synthesizer: Arc::new(synthesizer),
        media_player_id: settings.media_player_id,
    });

    let app = Router::new()
        .route("/device", get(ws::ws_handler))
        .nest_service("/audio", ServeDir::new(&settings.artifact_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    tracing::info!(
        addr = %settings.bind_addr,
        workflow = %settings.workflow_url,
        tts = %settings.tts_url,
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
