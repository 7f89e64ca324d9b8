//! Route assembly: the public surface, the session-guarded API, and the
//! generated OpenAPI document.

use crate::{handlers, middleware, state::AppState, types};
use axum::{
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body, in bytes.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// `OpenAPI` documentation for the FarmSense API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FarmSense API",
        version = "1.0.0",
        description = "Farm health monitoring: records, alerts, dashboard, and the assistant"
    ),
    paths(
        health,
        // Auth endpoints
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        // Record endpoints
        handlers::records::create_record,
        handlers::records::list_records,
        // Alert endpoints
        handlers::alerts::list_alerts,
        handlers::alerts::create_alert,
        handlers::alerts::mark_alert_read,
        handlers::alerts::delete_alert,
        // Assistant and dashboard
        handlers::chat::chat,
        handlers::dashboard::dashboard,
    ),
    components(schemas(
        types::SuccessResponse<types::UserProfile>,
        types::SuccessResponse<types::MessageResponse>,
        types::SuccessResponse<farmsense_core::records::HealthRecord>,
        types::SuccessResponse<Vec<farmsense_core::records::HealthRecord>>,
        types::SuccessResponse<farmsense_core::alerts::Alert>,
        types::SuccessResponse<Vec<farmsense_core::alerts::Alert>>,
        types::SuccessResponse<handlers::dashboard::DashboardSummary>,
        types::UserProfile,
        types::MessageResponse,
        handlers::auth::SignupRequest,
        handlers::auth::LoginRequest,
        handlers::auth::LoginResponse,
        handlers::records::CreateRecordRequest,
        handlers::records::ListRecordsQuery,
        handlers::alerts::CreateAlertRequest,
        handlers::alerts::ListAlertsQuery,
        handlers::chat::ChatRequest,
        handlers::dashboard::DashboardSummary,
        handlers::dashboard::RecordTypeCounts,
        handlers::dashboard::AlertCountSummary,
        farmsense_core::auth::UserRole,
        farmsense_core::records::HealthRecord,
        farmsense_core::records::RecordMetrics,
        farmsense_core::records::HumanMetrics,
        farmsense_core::records::AnimalMetrics,
        farmsense_core::records::EnvironmentMetrics,
        farmsense_core::records::RecordStatus,
        farmsense_core::records::RecordType,
        farmsense_core::records::AnimalSpecies,
        farmsense_core::records::Appetite,
        farmsense_core::records::Behavior,
        farmsense_core::records::AirQuality,
        farmsense_core::records::WaterQuality,
        farmsense_core::alerts::Alert,
        farmsense_core::alerts::AlertDraft,
        farmsense_core::alerts::AlertSeverity,
        farmsense_core::alerts::AlertCategory,
        farmsense_core::assistant::ChatReply,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Liveness and store reachability"),
        (name = "Auth", description = "Signup, login, and session management"),
        (name = "Records", description = "Health record submission and listing"),
        (name = "Alerts", description = "Alert listing and management"),
        (name = "Assistant", description = "Keyword-matched farm health advice"),
        (name = "Dashboard", description = "Landing page summary")
    )
)]
pub struct ApiDoc;

/// Registers the `x-session-token` header scheme the guarded paths reference.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-session-token"))),
            );
        }
    }
}

/// GET /health - Liveness plus a store reachability probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "Server and store are up"),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    let body = serde_json::json!({
        "status": if database_ok { "healthy" } else { "unhealthy" },
        "database": if database_ok { "reachable" } else { "unreachable" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (
        if database_ok {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        },
        Json(body),
    )
}

/// Builds the full application router.
pub fn create_app(state: AppState) -> Router {
    let (set_request_id, propagate_request_id) = middleware::create_request_id_layers();
    let (set_request_id_public, propagate_request_id_public) =
        middleware::create_request_id_layers();

    let public = Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(propagate_request_id_public)
        .layer(set_request_id_public);

    let open_routes = Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login));

    let session_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/records",
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route("/api/alerts", get(handlers::alerts::list_alerts))
        .route("/api/alerts/create", post(handlers::alerts::create_alert))
        .route("/api/alerts/{id}", delete(handlers::alerts::delete_alert))
        .route("/api/alerts/{id}/read", post(handlers::alerts::mark_alert_read))
        .route("/api/ai-chat", post(handlers::chat::chat))
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        // route_layer keeps the guard off the fallback so unknown paths 404
        .route_layer(axum_middleware::from_fn_with_state(
            state.session_auth.clone(),
            middleware::require_session,
        ));

    let mut api = open_routes.merge(session_routes).with_state(state.clone());

    api = api.layer(axum_middleware::from_fn(middleware::require_json_body));
    api = api.layer(ConcurrencyLimitLayer::new(state.settings.max_concurrent_requests));
    // Bodies above the cap are rejected before buffering
    api = api.layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));
    api = api.layer(CompressionLayer::new());
    // Layers run in reverse order of addition, so propagate runs after set
    api = api.layer(propagate_request_id).layer(set_request_id);

    public.merge(api)
}
