use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{core_config_from_env, router, AppState};
use sti_core::ScreeningService;

/// Main entry point for the STI screening service
///
/// Loads `.env`, resolves the screening configuration, loads the classifier model once for the
/// whole process and serves the REST API.
///
/// # Environment Variables
/// - `STI_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `STI_STRATEGY`: symptom scoring strategy, `exact` or `additive` (default: "exact")
/// - `STI_MIN_CONFIDENCE`: optional minimum image confidence
/// - `STI_MODEL_PATH`: classifier weights (default: "models/sti_classifier.json")
/// - `STI_REQUIRE_MODEL`: refuse to start without a model (default: false)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, model loading or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sti=info".parse()?)
                .add_directive("sti_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("STI_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;

    let cfg = Arc::new(core_config_from_env()?);
    tracing::info!(
        strategy = %cfg.strategy(),
        min_confidence = ?cfg.min_confidence(),
        "++ Screening configuration loaded"
    );

    let service = ScreeningService::from_config(cfg)?;
    if !service.image_analysis_available() {
        tracing::warn!("image analysis unavailable; screening will use symptoms only");
    }

    tracing::info!("++ Starting STI screening REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    axum::serve(listener, router(AppState::new(service))).await?;

    Ok(())
}
