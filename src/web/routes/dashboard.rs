use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::services::dashboard_service::{self, DashboardData};
use crate::web::layout::Layout;
use crate::web::session::AuthenticatedUser;
use crate::web::{render, today};

#[derive(Debug, Deserialize, Default)]
pub struct DashboardQuery {
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub data: DashboardData,
}

pub async fn dashboard_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<DashboardQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    let data = match dashboard_service::build_dashboard(&pool, &user.id, user.role, today()).await {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(user_id = %user.id, "dashboard load failed: {}", e);
            return e.into_response();
        }
    };

    render(&DashboardTemplate {
        layout: Layout::new(&user, "dashboard", query.notice.as_deref()),
        data,
    })
}
