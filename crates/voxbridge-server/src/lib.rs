pub mod handlers;
pub mod pipeline;
pub mod state;

pub use pipeline::{RecordingPipeline, SpeechPipeline, TranscriptionPipeline};
pub use state::{AppState, ServerOptions};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use voxbridge_core::config::ServerConfig;

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/api/translate-speech", get(handlers::translate_speech))
        .route("/api/translate-text", post(handlers::translate_text))
        .route("/api/translate-audio", post(handlers::translate_audio))
        .route("/api/languages", get(handlers::languages))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
            tracing::info!("shutdown signal received");
        })
        .await
}
