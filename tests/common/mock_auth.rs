//! In-process stand-in for the GoTrue endpoints the app calls.
//!
//! Accounts are `<user-id>@school.test` with [`PASSWORD`]. Refresh tokens are
//! `refresh-<user-id>`; a refresh grant answers with `rotated-<user-id>`.
//! Sign-ups for `pending-*` addresses wait for email confirmation and
//! `taken@school.test` is already registered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::token_for;

pub const PASSWORD: &str = "correct-horse";
const EMAIL_DOMAIN: &str = "@school.test";

#[derive(Clone, Default)]
pub struct MockAuth {
    revoked: Arc<Mutex<Vec<String>>>,
}

impl MockAuth {
    /// Bearer tokens sent to `/logout`, oldest first.
    pub fn revoked_tokens(&self) -> Vec<String> {
        self.revoked.lock().unwrap().clone()
    }
}

pub fn refresh_token_for(user_id: &str) -> String {
    format!("refresh-{}", user_id)
}

pub fn rotated_token_for(user_id: &str) -> String {
    format!("rotated-{}", user_id)
}

/// Serves the mock on an ephemeral port; returns its `/auth/v1` base URL.
pub async fn spawn_mock_auth() -> (String, MockAuth) {
    let mock = MockAuth::default();
    let app = Router::new()
        .route("/auth/v1/token", post(token_handler))
        .route("/auth/v1/signup", post(signup_handler))
        .route("/auth/v1/logout", post(logout_handler))
        .with_state(mock.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/auth/v1", addr), mock)
}

fn user_json(user_id: &str) -> Value {
    json!({ "id": user_id, "email": format!("{}{}", user_id, EMAIL_DOMAIN) })
}

fn session_json(user_id: &str, refresh_token: String) -> Value {
    json!({
        "access_token": token_for(user_id, 3600),
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": refresh_token,
        "user": user_json(user_id),
    })
}

fn grant_error(description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "invalid_grant", "error_description": description })),
    )
        .into_response()
}

async fn token_handler(
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    match query.get("grant_type").map(String::as_str) {
        Some("password") => {
            let email = body["email"].as_str().unwrap_or_default();
            let password = body["password"].as_str().unwrap_or_default();
            match email.strip_suffix(EMAIL_DOMAIN) {
                Some(id) if password == PASSWORD => {
                    Json(session_json(id, refresh_token_for(id))).into_response()
                }
                _ => grant_error("Invalid login credentials"),
            }
        }
        Some("refresh_token") => {
            let token = body["refresh_token"].as_str().unwrap_or_default();
            match token.strip_prefix("refresh-") {
                Some(id) => Json(session_json(id, rotated_token_for(id))).into_response(),
                None => grant_error("Invalid Refresh Token: Refresh Token Not Found"),
            }
        }
        _ => grant_error("unsupported_grant_type"),
    }
}

async fn signup_handler(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let Some(id) = email.strip_suffix(EMAIL_DOMAIN) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "Unable to validate email address: invalid format" })),
        )
            .into_response();
    };
    if id == "taken" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "msg": "User already registered" })),
        )
            .into_response();
    }
    if id.starts_with("pending") {
        let mut user = user_json(id);
        user["confirmation_sent_at"] = json!("2026-01-01T00:00:00Z");
        return Json(user).into_response();
    }
    Json(session_json(id, refresh_token_for(id))).into_response()
}

async fn logout_handler(State(mock): State<MockAuth>, headers: HeaderMap) -> StatusCode {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match bearer {
        Some(token) => {
            mock.revoked.lock().unwrap().push(token.to_string());
            StatusCode::NO_CONTENT
        }
        None => StatusCode::UNAUTHORIZED,
    }
}
