//! # API REST
//!
//! REST API for STI screening.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for wire types and `sti-core` for every screening decision.

#![warn(rust_2018_idioms)]

use api_shared::{
    ChecklistRes, DiagnoseReq, DiagnoseRes, DiagnosisRes, HealthRes, HealthService,
    ImageFindingRes, ImagePayload, ReportRes, RequestError, SymptomQuestion,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use sti_core::{
    config::{
        flag_from_env_value, min_confidence_from_env_value, model_path_from_env_value,
        strategy_from_env_value,
    },
    CoreConfig, ScreeningError, ScreeningService, DEFAULT_MODEL_PATH,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<ScreeningService>,
}

impl AppState {
    pub fn new(service: ScreeningService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, symptoms, diagnose),
    components(schemas(
        HealthRes,
        ChecklistRes,
        SymptomQuestion,
        DiagnoseReq,
        ImagePayload,
        DiagnoseRes,
        ReportRes,
        ImageFindingRes,
        DiagnosisRes,
    ))
)]
pub struct ApiDoc;

/// Reads the screening configuration from the process environment.
///
/// # Environment Variables
/// - `STI_STRATEGY`: `exact` (default) or `additive`
/// - `STI_MIN_CONFIDENCE`: optional image confidence threshold in `[0, 1]`
/// - `STI_MODEL_PATH`: classifier weights (default: `models/sti_classifier.json`)
/// - `STI_REQUIRE_MODEL`: fail startup when the model cannot be loaded (default: false)
///
/// # Errors
///
/// Returns an error if any value cannot be parsed or the combination is invalid.
pub fn core_config_from_env() -> Result<CoreConfig, ScreeningError> {
    let strategy = strategy_from_env_value(std::env::var("STI_STRATEGY").ok())?;
    let min_confidence = min_confidence_from_env_value(std::env::var("STI_MIN_CONFIDENCE").ok())?;
    let model_path =
        model_path_from_env_value(std::env::var("STI_MODEL_PATH").ok(), DEFAULT_MODEL_PATH);
    let require_model = flag_from_env_value(std::env::var("STI_REQUIRE_MODEL").ok(), false)?;

    CoreConfig::new(strategy, min_confidence, Some(model_path), require_model)
}

/// Builds the REST router, including Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/symptoms", get(symptoms))
        .route("/diagnose", post(diagnose))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint, also reporting whether image analysis is enabled.
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health(
        state.service.image_analysis_available(),
    ))
}

#[utoipa::path(
    get,
    path = "/symptoms",
    responses(
        (status = 200, description = "Symptom checklist and disclaimer", body = ChecklistRes)
    )
)]
async fn symptoms() -> Json<ChecklistRes> {
    Json(ChecklistRes::current())
}

#[utoipa::path(
    post,
    path = "/diagnose",
    request_body = DiagnoseReq,
    responses(
        (status = 200, description = "Screening result, or a consent reminder", body = DiagnoseRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Screens the submitted symptoms and optional image.
///
/// A request without consent is answered with `status: "consent_required"` and no report.
/// Image decoding and inference run on the blocking pool.
async fn diagnose(
    State(state): State<AppState>,
    Json(req): Json<DiagnoseReq>,
) -> Result<Json<DiagnoseRes>, (StatusCode, &'static str)> {
    let request = match req.into_request() {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Invalid diagnose request: {}", e);
            return Err((StatusCode::BAD_REQUEST, bad_request_message(&e)));
        }
    };

    let service = Arc::clone(&state.service);
    match tokio::task::spawn_blocking(move || service.screen(request)).await {
        Ok(outcome) => Ok(Json(DiagnoseRes::from(outcome))),
        Err(e) => {
            tracing::error!("Screening task error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

fn bad_request_message(err: &RequestError) -> &'static str {
    match err {
        RequestError::InvalidBase64(_) => "Invalid image encoding",
        RequestError::Screening(ScreeningError::UnknownSymptom(_)) => "Unknown symptom",
        RequestError::Screening(ScreeningError::UnknownStrategy(_)) => "Unknown strategy",
        RequestError::Screening(ScreeningError::UnsupportedImageFormat(_)) => {
            "Unsupported image format"
        }
        RequestError::Screening(ScreeningError::Value(_)) => "Invalid image filename",
        RequestError::Screening(_) => "Bad request",
    }
}
