use axum::http::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::Role;

#[derive(thiserror::Error, Debug, Clone)]
#[error("{status}: {message}")]
pub struct AuthApiError {
    pub status: StatusCode,
    pub message: String,
}

impl AuthApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Sign-up returns a session when the account is confirmed right away, and just
/// the user when email confirmation is pending.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignupOutcome {
    Session(AuthSession),
    PendingConfirmation(AuthUser),
}

impl SignupOutcome {
    pub fn user(&self) -> &AuthUser {
        match self {
            Self::Session(s) => &s.user,
            Self::PendingConfirmation(u) => u,
        }
    }
}

pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub role: Role,
}

/// Client for the GoTrue-compatible auth service.
#[derive(Clone)]
pub struct AuthApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthApiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn headers(&self, bearer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(v) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", v);
        }
        if let Some(token) = bearer {
            if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, v);
            }
        }
        headers
    }

    async fn post(&self, path: &str, bearer: Option<&str>, body: Value) -> Result<Value, AuthApiError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .post(&url)
            .headers(self.headers(bearer))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "auth service unreachable");
                AuthApiError::new(StatusCode::BAD_GATEWAY, "The sign-in service is unreachable.")
            })?;

        let status =
            StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(AuthApiError::new(status, upstream_message(&body, status)));
        }
        Ok(body)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthApiError> {
        let body = self
            .post(
                "/token?grant_type=password",
                None,
                json!({ "email": email, "password": password }),
            )
            .await?;
        parse_body(body)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthApiError> {
        let body = self
            .post(
                "/token?grant_type=refresh_token",
                None,
                json!({ "refresh_token": refresh_token }),
            )
            .await?;
        parse_body(body)
    }

    pub async fn sign_up(&self, account: NewAccount<'_>) -> Result<SignupOutcome, AuthApiError> {
        let body = self
            .post(
                "/signup",
                None,
                json!({
                    "email": account.email,
                    "password": account.password,
                    "data": {
                        "full_name": account.full_name,
                        "role": account.role.as_str(),
                    }
                }),
            )
            .await?;
        parse_body(body)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthApiError> {
        self.post("/logout", Some(access_token), json!({})).await?;
        Ok(())
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, AuthApiError> {
    serde_json::from_value(body).map_err(|e| {
        tracing::error!("Cannot parse auth service response: {}", e);
        AuthApiError::new(StatusCode::BAD_GATEWAY, "Unexpected response from the sign-in service.")
    })
}

// GoTrue reports errors under different keys depending on the endpoint.
fn upstream_message(body: &Value, status: StatusCode) -> String {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("Sign-in service returned {}", status))
}
