//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the screening REST API (with OpenAPI/Swagger UI) on its own.
//!
//! ## Intended use
//! Useful for development when only the HTTP surface is needed. The workspace's main `sti-run`
//! binary serves the same router.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{core_config_from_env, router, AppState};
use sti_core::ScreeningService;

/// Main entry point for the STI screening REST API server
///
/// # Environment Variables
/// - `STI_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - plus the screening variables read by [`core_config_from_env`]
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the screening configuration is invalid or a required model cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("sti_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("STI_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(core_config_from_env()?);
    let service = ScreeningService::from_config(cfg)?;

    tracing::info!(
        image_analysis = service.image_analysis_available(),
        "-- Starting STI screening REST API on {}",
        addr
    );

    let app = router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
