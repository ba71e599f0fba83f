//! Solace boot binary.
//!
//! Resolves configuration, initialises tracing, and serves the REST API.
//! The router itself is built by `api-rest`, so this binary and the
//! standalone `solace-api-rest` binary cannot drift apart.

use api_rest::{AppState, build_router, resolve_core_config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Solace application
///
/// Starts the REST server on the configured address (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `SOLACE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `SOLACE_DATA_DIR`: Directory for chat data storage (default: "chat_data")
/// - `SOLACE_RETENTION_DAYS`: Conversation retention window in days
/// - `SOLACE_NUDGE_QUIET_HOURS`: Quiet period before a nudge candidate
/// - `SOLACE_FALLBACK_POLICY`: "fail_open" (default) or "fail_closed"
/// - `SOLACE_PATTERN_FILE`: Extra forbidden-pattern expressions, one per line
/// - `SOLACE_CLASSIFIER_URL`: Safety-classifier endpoint (disabled when unset)
/// - `API_KEY`: Admin API key
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("solace=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("SOLACE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting Solace REST on {}", rest_addr);

    let cfg = resolve_core_config()?;
    let state = AppState::new(cfg)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
