//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `solace-run` binary is the production entry point.

use api_rest::{build_router, resolve_core_config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Solace REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
/// Provides HTTP endpoints for conversations with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `SOLACE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `SOLACE_DATA_DIR`: Directory for chat data storage (default: "chat_data")
/// - `SOLACE_RETENTION_DAYS`: Conversation retention window in days
/// - `SOLACE_NUDGE_QUIET_HOURS`: Quiet period before a nudge candidate
/// - `SOLACE_FALLBACK_POLICY`: "fail_open" (default) or "fail_closed"
/// - `SOLACE_PATTERN_FILE`: Extra forbidden-pattern expressions, one per line
/// - `SOLACE_CLASSIFIER_URL`: Safety-classifier endpoint (disabled when unset)
/// - `API_KEY`: Admin API key
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("SOLACE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting Solace REST API on {}", addr);

    let cfg = resolve_core_config()?;
    let state = AppState::new(cfg)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
