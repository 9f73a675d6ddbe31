use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use sqlx::SqlitePool;

use crate::services::report_service::{self, ReportPage, ReportQuery};
use crate::web::layout::Layout;
use crate::web::session::AuthenticatedUser;
use crate::web::{render, today};

#[derive(Template)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub layout: Layout,
    pub report: ReportPage,
}

pub async fn reports_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ReportQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    match report_service::build_report(&pool, &query, today()).await {
        Ok(report) => render(&ReportsTemplate {
            layout: Layout::new(&user, "reports", None),
            report,
        }),
        Err(e) => {
            tracing::warn!("Report build failed: {}", e);
            e.into_response()
        }
    }
}
