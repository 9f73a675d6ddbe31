use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::notice::{with_notice, Notice};
use crate::services::registration_service::{
    self, ActivityRegistrationsPage, MyRegistrationView,
};
use crate::web::layout::Layout;
use crate::web::render;
use crate::web::session::AuthenticatedUser;

const MY_REGISTRATIONS_PATH: &str = "/registrations";

#[derive(Debug, Deserialize, Default)]
pub struct RegistrationsQuery {
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "my_registrations.html")]
pub struct MyRegistrationsTemplate {
    pub layout: Layout,
    pub registrations: Vec<MyRegistrationView>,
}

pub async fn my_registrations_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RegistrationsQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    let registrations = match registration_service::list_mine(&pool, &user.id).await {
        Ok(r) => r,
        Err(e) => {
            warn!(student_id = %user.id, "Registrations load failed: {}", e);
            return e.into_response();
        }
    };
    render(&MyRegistrationsTemplate {
        layout: Layout::new(&user, "registrations", query.notice.as_deref()),
        registrations,
    })
}

pub async fn cancel_registration_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(registration_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    let notice = match registration_service::cancel(&pool, &registration_id, &user.id).await {
        Ok(()) => Notice::RegistrationCancelled,
        Err(e) => {
            warn!(registration_id = %registration_id, student_id = %user.id, "Cancel failed: {}", e);
            e.notice(Notice::CancelFailed)
        }
    };
    Redirect::to(&with_notice(MY_REGISTRATIONS_PATH, notice)).into_response()
}

#[derive(Template)]
#[template(path = "activity_registrations.html")]
pub struct ActivityRegistrationsTemplate {
    pub layout: Layout,
    pub page: ActivityRegistrationsPage,
}

pub async fn activity_registrations_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    Query(query): Query<RegistrationsQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    match registration_service::list_for_owned_activity(&pool, &activity_id, &user.id).await {
        Ok(page) => render(&ActivityRegistrationsTemplate {
            layout: Layout::new(&user, "activities", query.notice.as_deref()),
            page,
        }),
        Err(e) => {
            warn!(activity_id = %activity_id, user_id = %user.id, "Registrations page refused: {}", e);
            let notice = e.notice(Notice::RegistrationStatusFailed);
            Redirect::to(&with_notice("/activities", notice)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String, // approved|rejected|pending
}

pub async fn registration_status_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path((activity_id, registration_id)): Path<(String, String)>,
    State(pool): State<SqlitePool>,
    Form(form): Form<StatusForm>,
) -> Response {
    let notice = match registration_service::set_status(
        &pool,
        &activity_id,
        &registration_id,
        &user.id,
        &form.status,
    )
    .await
    {
        Ok(()) => Notice::RegistrationStatusUpdated,
        Err(e) => {
            warn!(activity_id = %activity_id, registration_id = %registration_id, "Status change failed: {}", e);
            e.notice(Notice::RegistrationStatusFailed)
        }
    };
    let target = format!("/activities/{}/registrations", activity_id);
    Redirect::to(&with_notice(&target, notice)).into_response()
}
