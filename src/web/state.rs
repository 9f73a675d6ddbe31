use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::services::auth_api_service::AuthApiClient;
use crate::services::token_service::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth: AuthApiClient,
    pub tokens: TokenVerifier,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        Self {
            pool,
            auth: AuthApiClient::new(&config.auth_url, &config.auth_api_key),
            tokens: TokenVerifier::new(&config.jwt_secret),
            cookie_secure: config.cookie_secure,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
