// Credit Limits - REST API
//
// JSON surface over the same AppState the TUI uses. One state behind a
// mutex, so every request is a single writer.

use crate::db::{ApiError, ApplicationsApi};
use crate::filter::{filter_applications, StatusFilter};
use crate::store::{AppState, SubmitOutcome};
use crate::types::{Application, ApplicationStatus, ApplicationUpdate, ChangeLogEntry, ChangeReason};
use crate::validation::{validate, ValidationResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

/// Shared application state
pub struct ServerState<A: ApplicationsApi> {
    app: Arc<Mutex<AppState<A>>>,
}

impl<A: ApplicationsApi> Clone for ServerState<A> {
    fn clone(&self) -> Self {
        ServerState {
            app: Arc::clone(&self.app),
        }
    }
}

impl<A: ApplicationsApi> ServerState<A> {
    pub fn new(app: AppState<A>) -> Self {
        ServerState {
            app: Arc::new(Mutex::new(app)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState<A>> {
        // A panic mid-request cannot leave AppState half-written, so keep serving
        self.app.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Validation verdict as sent to clients
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    pub limit_error: Option<String>,
    pub reason_error: Option<String>,
    pub is_reason_required: bool,
    pub available_reasons: Vec<ChangeReason>,
}

impl From<ValidationResult> for ValidationResponse {
    fn from(result: ValidationResult) -> Self {
        Self {
            is_valid: result.is_valid,
            limit_error: result.limit_error.map(|e| e.to_string()),
            reason_error: result.reason_error.map(|e| e.to_string()),
            is_reason_required: result.is_reason_required,
            available_reasons: result.available_reasons.to_vec(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResponse {
    application: Application,
    log_entry: Option<ChangeLogEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    total: usize,
    new: usize,
}

// ============================================================================
// REQUEST TYPES
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    status: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    /// `null`/missing means the field was left empty
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    reason: Option<ChangeReason>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    #[serde(default)]
    new_limit: Option<i64>,
    #[serde(default)]
    reason: Option<ChangeReason>,
    new_status: ApplicationStatus,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/applications?status=&search= - Filtered list
async fn list_applications<A: ApplicationsApi>(
    State(state): State<ServerState<A>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let filter = match query.status.as_deref() {
        None => StatusFilter::All,
        Some(raw) => match raw.parse::<StatusFilter>() {
            Ok(filter) => filter,
            Err(e) => {
                return (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::err(e))).into_response()
            }
        },
    };

    let mut app = state.lock();
    app.load_applications();
    if let Some(message) = app.error() {
        let message = message.to_string();
        app.clear_error();
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::err(message)),
        )
            .into_response();
    }

    let term = query.search.unwrap_or_default();
    let filtered = filter_applications(app.applications(), filter, &term);
    (StatusCode::OK, Json(ApiResponse::ok(filtered))).into_response()
}

/// GET /api/applications/:id - One application
async fn get_application<A: ApplicationsApi>(
    State(state): State<ServerState<A>>,
    Path(id): Path<String>,
) -> Response {
    let app = state.lock();
    match app.find(&id) {
        Some(found) => (StatusCode::OK, Json(ApiResponse::ok(found.clone()))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::err(format!("Application {} not found", id))),
        )
            .into_response(),
    }
}

/// PATCH /api/applications/:id - Validate, apply and log an edit
async fn edit_application<A: ApplicationsApi>(
    State(state): State<ServerState<A>>,
    Path(id): Path<String>,
    Json(request): Json<EditRequest>,
) -> Response {
    let validation = validate(request.new_limit, request.reason);
    let new_limit = request.new_limit.and_then(|limit| u64::try_from(limit).ok());

    let new_limit = match new_limit {
        Some(limit) if validation.is_valid => limit,
        _ => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<ValidationResponse> {
                    success: false,
                    error: Some(validation.messages().join("; ")),
                    data: Some(validation.into()),
                }),
            )
                .into_response()
        }
    };

    let update = ApplicationUpdate {
        new_limit,
        reason: request.reason,
        new_status: request.new_status,
    };

    let mut app = state.lock();
    match app.commit_update(&id, update) {
        SubmitOutcome::Saved { application, entry } => (
            StatusCode::OK,
            Json(ApiResponse::ok(SavedResponse {
                application,
                log_entry: entry,
            })),
        )
            .into_response(),
        SubmitOutcome::Failed(err) => {
            app.clear_error();
            let status = match err {
                ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, Json(ApiResponse::<()>::err(err.to_string()))).into_response()
        }
        SubmitOutcome::Invalid(validation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<ValidationResponse> {
                success: false,
                error: Some(validation.messages().join("; ")),
                data: Some(validation.into()),
            }),
        )
            .into_response(),
    }
}

/// GET /api/changelog - Session log, newest first
async fn get_change_log<A: ApplicationsApi>(State(state): State<ServerState<A>>) -> impl IntoResponse {
    let app = state.lock();
    Json(ApiResponse::ok(app.change_log().to_vec()))
}

/// GET /api/stats - Totals for the header
async fn get_stats<A: ApplicationsApi>(State(state): State<ServerState<A>>) -> impl IntoResponse {
    let app = state.lock();
    Json(ApiResponse::ok(StatsResponse {
        total: app.total_count(),
        new: app.new_count(),
    }))
}

/// POST /api/validate - Validate form input without saving
async fn validate_input(Json(request): Json<ValidateRequest>) -> impl IntoResponse {
    Json(ApiResponse::ok(ValidationResponse::from(validate(
        request.limit,
        request.reason,
    ))))
}

// ============================================================================
// Router
// ============================================================================

pub fn router<A>(state: ServerState<A>) -> Router
where
    A: ApplicationsApi + Send + 'static,
{
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/applications", get(list_applications::<A>))
        .route(
            "/applications/:id",
            get(get_application::<A>).patch(edit_application::<A>),
        )
        .route("/changelog", get(get_change_log::<A>))
        .route("/stats", get(get_stats::<A>))
        .route("/validate", post(validate_input))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
