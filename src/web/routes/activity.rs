//! Student actions on a single activity: registering and evaluating.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::AppError;
use crate::services::evaluation_service::{self, EvaluationPage, EvaluationRequest, MAX_RATING, MIN_RATING};
use crate::services::notice::{with_notice, Notice};
use crate::services::registration_service;
use crate::web::layout::Layout;
use crate::web::render;
use crate::web::session::AuthenticatedUser;

const ACTIVITIES_PATH: &str = "/activities";

pub async fn register_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    let notice = match registration_service::register(&pool, &activity_id, &user.id).await {
        Ok(_) => Notice::Registered,
        Err(e) if e.is_duplicate() => {
            tracing::info!(activity_id = %activity_id, student_id = %user.id, "already registered");
            Notice::AlreadyRegistered
        }
        Err(e) => {
            warn!(activity_id = %activity_id, student_id = %user.id, "Registration failed: {}", e);
            e.notice(Notice::RegisterFailed)
        }
    };
    Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response()
}

#[derive(Template)]
#[template(path = "evaluate.html")]
pub struct EvaluateTemplate {
    pub layout: Layout,
    pub page: EvaluationPage,
    pub ratings: Vec<RatingOption>,
    pub comment: String,
    pub error: Option<String>,
}

pub struct RatingOption {
    pub value: i64,
    pub checked: bool,
}

fn rating_options(selected: i64) -> Vec<RatingOption> {
    (MIN_RATING..=MAX_RATING)
        .map(|value| RatingOption {
            value,
            checked: value == selected,
        })
        .collect()
}

impl EvaluateTemplate {
    fn new(user: &AuthenticatedUser, page: EvaluationPage) -> Self {
        Self {
            layout: Layout::new(user, "activities", None),
            page,
            ratings: rating_options(MAX_RATING),
            comment: String::new(),
            error: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EvaluateForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

pub async fn evaluate_page(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    match evaluation_service::load_evaluation_page(&pool, &activity_id, &user.id).await {
        Ok(page) => render(&EvaluateTemplate::new(&user, page)),
        Err(e) => {
            let notice = e.notice(Notice::EvaluateFailed);
            Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response()
        }
    }
}

pub async fn evaluate_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Form(form): Form<EvaluateForm>,
) -> Response {
    // Unparseable ratings fall through to the range check.
    let rating = form.rating.trim().parse::<i64>().unwrap_or(0);
    let request = EvaluationRequest {
        activity_id: activity_id.clone(),
        student_id: user.id.clone(),
        rating,
        comment: form.comment.clone(),
    };

    match evaluation_service::submit(&pool, &request).await {
        Ok(_) => Redirect::to(&with_notice(ACTIVITIES_PATH, Notice::Evaluated)).into_response(),
        Err(AppError::Validation(message)) => {
            match evaluation_service::load_evaluation_page(&pool, &activity_id, &user.id).await {
                Ok(page) => {
                    let mut template = EvaluateTemplate::new(&user, page);
                    template.ratings = rating_options(rating.clamp(MIN_RATING, MAX_RATING));
                    template.comment = form.comment;
                    template.error = Some(message);
                    (StatusCode::BAD_REQUEST, render(&template)).into_response()
                }
                Err(e) => {
                    let notice = e.notice(Notice::EvaluateFailed);
                    Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response()
                }
            }
        }
        Err(e) => {
            if !e.is_duplicate() {
                warn!(activity_id = %activity_id, student_id = %user.id, "Evaluation failed: {}", e);
            }
            let notice = e.notice(Notice::EvaluateFailed);
            Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response()
        }
    }
}
