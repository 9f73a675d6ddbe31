use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use sqlx::SqlitePool;

use crate::services::student_service::{self, StudentView, StudentsQuery};
use crate::web::layout::Layout;
use crate::web::render;
use crate::web::session::AuthenticatedUser;

#[derive(Template)]
#[template(path = "students.html")]
pub struct StudentsTemplate {
    pub layout: Layout,
    pub search: String,
    pub students: Vec<StudentView>,
}

pub async fn students_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<StudentsQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    let students = match student_service::list_students(&pool, &query).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Students load failed: {}", e);
            return e.into_response();
        }
    };
    render(&StudentsTemplate {
        layout: Layout::new(&user, "students", None),
        search: query.q.unwrap_or_default(),
        students,
    })
}
