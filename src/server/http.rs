use super::http_auth::extract_bearer_token;
use super::http_errors::{map_auth_error, map_generation_error};
use super::http_types::{
    AdCopyResponse, CopySummaryResponse, GenerateAdRequest, HealthResponse, PaginationParams,
    TargetingResponse, UsageResponse,
};
use super::state::AppState;
use crate::application::GenerationError;
use crate::domain::RawCopyBrief;
use crate::infrastructure::{AuthError, SessionVerifier, VerifiedSession};
use axum::{
    extract::{Query, State},
    http::{header::HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/generate", post(generate_copy))
        .route("/usage", get(get_usage))
        .route("/copies", get(list_copies))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(health_check, generate_copy, get_usage, list_copies),
    components(
        schemas(
            GenerateAdRequest,
            AdCopyResponse,
            TargetingResponse,
            UsageResponse,
            CopySummaryResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Generation", description = "Ad copy generation endpoints"),
        (name = "Usage", description = "Quota and history endpoints"),
    ),
    info(
        title = "Copyforge API",
        version = "0.1.0",
        description = "AI ad copy generation with per-plan usage quotas",
        license(name = "MIT")
    )
)]
struct ApiDoc;

/// Resolve the caller's identity from the Authorization header. A missing
/// token short-circuits locally; everything else is the provider's verdict.
async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<VerifiedSession, (StatusCode, Json<serde_json::Value>)> {
    let token = extract_bearer_token(headers).ok_or_else(|| {
        let (status, body) = map_auth_error(&AuthError::MissingToken);
        (status, Json(body))
    })?;

    state.verifier.verify(token).await.map_err(|e| {
        let (status, body) = map_auth_error(&e);
        (status, Json(body))
    })
}

/// Health check endpoint
///
/// Verifies database connectivity and returns service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                error: None,
            }),
        ),
        Err(e) => {
            error!(error = %e, "Health check failed: DB connectivity issue");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    error: Some("Database connectivity failed".to_string()),
                }),
            )
        }
    }
}

/// Generate ad copy
///
/// Validates the brief, checks the caller's monthly quota, invokes the
/// generation model and stores the result. Identity comes exclusively from
/// the verified bearer session.
#[utoipa::path(
    post,
    path = "/generate",
    tag = "Generation",
    request_body = GenerateAdRequest,
    responses(
        (status = 200, description = "Copy generated and stored", body = AdCopyResponse),
        (status = 400, description = "Missing required fields", body = Object),
        (status = 401, description = "Unauthorized", body = Object),
        (status = 403, description = "Monthly ad limit reached", body = Object),
        (status = 429, description = "Generation service throttled", body = Object),
        (status = 502, description = "Generation service failed", body = Object),
        (status = 504, description = "Generation service timed out", body = Object)
    )
)]
async fn generate_copy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<GenerateAdRequest>,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let raw = RawCopyBrief::from(req);
    match state
        .studio
        .generate(&session.subject, &session.email, &raw)
        .await
    {
        Ok(receipt) => (
            StatusCode::OK,
            Json(serde_json::json!(AdCopyResponse::from(receipt))),
        ),
        Err(e) => {
            match &e {
                GenerationError::Invalid(_) | GenerationError::QuotaExceeded { .. } => {}
                other => error!(error = %other, subject = %session.subject, "Generation failed"),
            }
            let (status, body) = map_generation_error(e);
            (status, Json(body))
        }
    }
}

/// Current usage
///
/// Plan, counter and remaining quota for the verified account. Applies the
/// monthly rollover on read, mirroring the generation path.
#[utoipa::path(
    get,
    path = "/usage",
    tag = "Usage",
    responses(
        (status = 200, description = "Usage summary", body = UsageResponse),
        (status = 401, description = "Unauthorized", body = Object)
    )
)]
async fn get_usage(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match state.studio.usage(&session.subject, &session.email).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!(UsageResponse::from(summary))),
        ),
        Err(e) => {
            error!(error = %e, subject = %session.subject, "Failed to load usage");
            let (status, body) = map_generation_error(e);
            (status, Json(body))
        }
    }
}

const MAX_PAGINATION_LIMIT: i64 = 100;

/// Generation history
///
/// Most recent copies first.
#[utoipa::path(
    get,
    path = "/copies",
    tag = "Usage",
    params(PaginationParams),
    responses(
        (status = 200, description = "Stored copies for the account", body = [CopySummaryResponse]),
        (status = 401, description = "Unauthorized", body = Object)
    )
)]
async fn list_copies(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PaginationParams>,
) -> impl IntoResponse {
    let session = match authenticate(&state, &headers).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let limit = params.limit.clamp(1, MAX_PAGINATION_LIMIT);
    let offset = params.offset.max(0);

    match state
        .studio
        .history(&session.subject, &session.email, limit, offset)
        .await
    {
        Ok(copies) => {
            let items: Vec<CopySummaryResponse> = copies.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(serde_json::json!(items)))
        }
        Err(e) => {
            error!(error = %e, subject = %session.subject, "Failed to list copies");
            let (status, body) = map_generation_error(e);
            (status, Json(body))
        }
    }
}
