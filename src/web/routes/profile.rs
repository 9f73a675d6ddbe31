use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::AppError;
use crate::services::notice::{with_notice, Notice};
use crate::services::profile_service::{self, ProfileForm, ProfileView};
use crate::web::layout::Layout;
use crate::web::render;
use crate::web::session::AuthenticatedUser;

const PROFILE_PATH: &str = "/profile";

#[derive(Debug, Deserialize, Default)]
pub struct ProfileQuery {
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub profile: ProfileView,
    pub error: Option<String>,
}

pub async fn profile_page(
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ProfileQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    match profile_service::load_profile_view(&pool, &user.id, user.email.as_deref()).await {
        Ok(profile) => render(&ProfileTemplate {
            layout: Layout::new(&user, "profile", query.notice.as_deref()),
            profile,
            error: None,
        }),
        Err(e) => {
            warn!(user_id = %user.id, "Profile load failed: {}", e);
            e.into_response()
        }
    }
}

pub async fn update_profile_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<ProfileForm>,
) -> Response {
    match profile_service::update_profile(&pool, &user.id, &form).await {
        Ok(()) => Redirect::to(&with_notice(PROFILE_PATH, Notice::ProfileSaved)).into_response(),
        Err(AppError::Validation(message)) => {
            let profile = match profile_service::load_profile_view(
                &pool,
                &user.id,
                user.email.as_deref(),
            )
            .await
            {
                Ok(p) => ProfileView {
                    full_name: form.full_name,
                    phone: form.phone,
                    school: form.school,
                    ..p
                },
                Err(e) => return e.into_response(),
            };
            let page = render(&ProfileTemplate {
                layout: Layout::new(&user, "profile", None),
                profile,
                error: Some(message),
            });
            (StatusCode::BAD_REQUEST, page).into_response()
        }
        Err(e) => {
            warn!(user_id = %user.id, "Profile update failed: {}", e);
            let notice = e.notice(Notice::ProfileFailed);
            Redirect::to(&with_notice(PROFILE_PATH, notice)).into_response()
        }
    }
}
