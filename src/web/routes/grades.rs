use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::grading_service::{self, GradeForm, GradingPage, MAX_SCORE};
use crate::services::notice::{with_notice, Notice};
use crate::web::layout::Layout;
use crate::web::render;
use crate::web::session::AuthenticatedUser;

#[derive(Debug, Deserialize, Default)]
pub struct GradesQuery {
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "grades.html")]
pub struct GradesTemplate {
    pub layout: Layout,
    pub page: GradingPage,
    pub max_score: i64,
}

pub async fn grades_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    Query(query): Query<GradesQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    match grading_service::load_grading_page(&pool, &activity_id, &user.id).await {
        Ok(page) => render(&GradesTemplate {
            layout: Layout::new(&user, "activities", query.notice.as_deref()),
            page,
            max_score: MAX_SCORE,
        }),
        Err(e) => {
            warn!(activity_id = %activity_id, user_id = %user.id, "Grading page refused: {}", e);
            let notice = e.notice(Notice::GradeFailed);
            Redirect::to(&with_notice("/activities", notice)).into_response()
        }
    }
}

pub async fn save_grade_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path((activity_id, student_id)): Path<(String, String)>,
    State(pool): State<SqlitePool>,
    Form(form): Form<GradeForm>,
) -> Response {
    let notice =
        match grading_service::save_grade(&pool, &activity_id, &student_id, &user.id, &form).await {
            Ok(()) => Notice::GradeSaved,
            Err(e) => {
                warn!(activity_id = %activity_id, student_id = %student_id, "Grade save failed: {}", e);
                e.notice(Notice::GradeFailed)
            }
        };
    let target = format!("/activities/{}/grades", activity_id);
    Redirect::to(&with_notice(&target, notice)).into_response()
}
