//! JSON endpoints served under `/functions/v1`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::Role;
use crate::services::evaluation_service::{self, EvaluationRequest};
use crate::web::session::{AuthEvent, AuthenticatedUser, SessionResolver, SessionState};
use crate::web::state::AppState;

pub const ALREADY_EVALUATED_MESSAGE: &str = "You have already evaluated this activity";

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Caller from a bearer token, falling back to the cookie session. The role
/// comes from `profiles` either way.
async fn resolve_caller(
    state: &AppState,
    headers: &HeaderMap,
    session: &SessionState,
) -> Option<AuthenticatedUser> {
    match bearer_token(headers) {
        Some(token) => match state.tokens.verify(token, Utc::now().timestamp()) {
            Ok(claims) => {
                let resolved = SessionResolver::new(&state.pool)
                    .apply(AuthEvent::InitialSession(Some(claims.into())))
                    .await;
                resolved.user().cloned()
            }
            Err(e) => {
                warn!("Rejected bearer token: {}", e);
                None
            }
        },
        None => session.user().cloned(),
    }
}

pub async fn evaluate_activity_handler(
    State(state): State<AppState>,
    Extension(session): Extension<SessionState>,
    headers: HeaderMap,
    payload: Result<Json<EvaluationRequest>, JsonRejection>,
) -> Response {
    let Some(caller) = resolve_caller(&state, &headers, &session).await else {
        return json_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if !caller.has_role(Role::Student) {
        warn!(caller = %caller.id, role = ?caller.role, "evaluation by a non-student refused");
        return json_error(StatusCode::FORBIDDEN, "Only students can evaluate activities");
    }
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => return json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    if request.student_id != caller.id {
        warn!(caller = %caller.id, student_id = %request.student_id, "evaluation for another student refused");
        return json_error(StatusCode::FORBIDDEN, "You can only evaluate as yourself");
    }

    match evaluation_service::submit(&state.pool, &request).await {
        Ok(id) => {
            info!(evaluation_id = %id, "evaluate-activity succeeded");
            Json(json!({ "success": true })).into_response()
        }
        Err(e @ AppError::Duplicate(_)) => {
            info!(activity_id = %request.activity_id, "duplicate evaluation: {}", e);
            json_error(StatusCode::BAD_REQUEST, ALREADY_EVALUATED_MESSAGE)
        }
        Err(AppError::Validation(message)) => json_error(StatusCode::BAD_REQUEST, message),
        Err(AppError::NotFound) => json_error(StatusCode::NOT_FOUND, "Activity not found"),
        Err(e) => {
            warn!("evaluate-activity failed: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
