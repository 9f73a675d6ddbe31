use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::auth_api_service::AuthApiError;
use crate::services::notice::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    Registration,
    Evaluation,
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("database error {0}")]
    Database(#[from] sqlx::Error),
    #[error("duplicate {0:?}")]
    Duplicate(DuplicateKind),
    #[error("not found")]
    NotFound,
    #[error("not allowed")]
    Forbidden,
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("auth service error {0}")]
    AuthApi(#[from] AuthApiError),
    #[error("template error {0}")]
    Template(#[from] askama::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Maps a failed insert to `Duplicate(kind)` when it hit a UNIQUE constraint.
    pub fn from_insert(err: sqlx::Error, kind: DuplicateKind) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Duplicate(kind),
            _ => Self::Database(err),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    /// The notice shown to the user, with `fallback` for failures that have no
    /// message of their own.
    pub fn notice(&self, fallback: Notice) -> Notice {
        match self {
            Self::Duplicate(DuplicateKind::Registration) => Notice::AlreadyRegistered,
            Self::Duplicate(DuplicateKind::Evaluation) => Notice::AlreadyEvaluated,
            Self::NotFound => Notice::NotFound,
            Self::Forbidden => Notice::Forbidden,
            Self::Validation(_) => Notice::InvalidInput,
            _ => fallback,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Duplicate(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AuthApi(e) => e.status,
            Self::Database(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request failed");
        (self.status(), format!("Something went wrong: {}", self)).into_response()
    }
}
