use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::AppError;
use crate::services::activities_service::{self, ActivitiesQuery, ActivityCardView, ActivityForm};
use crate::services::notice::{with_notice, Notice};
use crate::web::layout::Layout;
use crate::web::session::AuthenticatedUser;
use crate::web::{render, today};

const ACTIVITIES_PATH: &str = "/activities";

#[derive(Template)]
#[template(path = "activities.html")]
pub struct ActivitiesTemplate {
    pub layout: Layout,
    pub upcoming: Vec<ActivityCardView>,
    pub past: Vec<ActivityCardView>,
}

#[derive(Template)]
#[template(path = "activity_form.html")]
pub struct ActivityFormTemplate {
    pub layout: Layout,
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: ActivityForm,
    pub error: Option<String>,
}

impl ActivityFormTemplate {
    fn create(user: &AuthenticatedUser, form: ActivityForm, error: Option<String>) -> Self {
        Self {
            layout: Layout::new(user, "activities", None),
            heading: "New activity",
            action: ACTIVITIES_PATH.to_string(),
            submit_label: "Create activity",
            form,
            error,
        }
    }

    fn edit(
        user: &AuthenticatedUser,
        activity_id: &str,
        form: ActivityForm,
        error: Option<String>,
    ) -> Self {
        Self {
            layout: Layout::new(user, "activities", None),
            heading: "Edit activity",
            action: format!("/activities/{}", activity_id),
            submit_label: "Save changes",
            form,
            error,
        }
    }
}

pub async fn activities_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ActivitiesQuery>,
    State(pool): State<SqlitePool>,
) -> Response {
    let cards =
        match activities_service::build_activities_page(&pool, &user.id, user.role, today()).await
        {
            Ok(cards) => cards,
            Err(e) => {
                warn!("Activities load failed: {}", e);
                return e.into_response();
            }
        };
    let (past, upcoming): (Vec<_>, Vec<_>) = cards.into_iter().partition(|c| c.is_past);

    render(&ActivitiesTemplate {
        layout: Layout::new(&user, "activities", query.notice.as_deref()),
        upcoming,
        past,
    })
}

pub async fn new_activity_page(Extension(user): Extension<AuthenticatedUser>) -> Response {
    render(&ActivityFormTemplate::create(&user, ActivityForm::default(), None))
}

pub async fn create_activity_handler(
    Extension(user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<ActivityForm>,
) -> Response {
    match activities_service::create_activity(&pool, &user.id, &form).await {
        Ok(_) => {
            Redirect::to(&with_notice(ACTIVITIES_PATH, Notice::ActivityCreated)).into_response()
        }
        Err(AppError::Validation(message)) => {
            let page = render(&ActivityFormTemplate::create(&user, form, Some(message)));
            (StatusCode::BAD_REQUEST, page).into_response()
        }
        Err(e) => {
            warn!(owner_id = %user.id, "Activity create failed: {}", e);
            let notice = e.notice(Notice::ActivityCreateFailed);
            Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response()
        }
    }
}

pub async fn edit_activity_page(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    let row = match activities_service::load_owned_activity(&pool, &activity_id, &user.id).await {
        Ok(row) => row,
        Err(e) => {
            warn!(activity_id = %activity_id, user_id = %user.id, "Activity edit refused: {}", e);
            let notice = e.notice(Notice::ActivityUpdateFailed);
            return Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response();
        }
    };

    render(&ActivityFormTemplate::edit(
        &user,
        &row.id,
        ActivityForm::from_row(&row),
        None,
    ))
}

pub async fn update_activity_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
    Form(form): Form<ActivityForm>,
) -> Response {
    match activities_service::update_activity(&pool, &activity_id, &user.id, &form).await {
        Ok(()) => {
            Redirect::to(&with_notice(ACTIVITIES_PATH, Notice::ActivityUpdated)).into_response()
        }
        Err(AppError::Validation(message)) => {
            let page = render(&ActivityFormTemplate::edit(
                &user,
                &activity_id,
                form,
                Some(message),
            ));
            (StatusCode::BAD_REQUEST, page).into_response()
        }
        Err(e) => {
            warn!(activity_id = %activity_id, user_id = %user.id, "Activity update failed: {}", e);
            let notice = e.notice(Notice::ActivityUpdateFailed);
            Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response()
        }
    }
}

pub async fn delete_activity_handler(
    Extension(user): Extension<AuthenticatedUser>,
    Path(activity_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> Response {
    let notice = match activities_service::delete_activity(&pool, &activity_id, &user.id).await {
        Ok(()) => Notice::ActivityDeleted,
        Err(e) => {
            warn!(activity_id = %activity_id, user_id = %user.id, "Activity delete failed: {}", e);
            e.notice(Notice::ActivityDeleteFailed)
        }
    };
    Redirect::to(&with_notice(ACTIVITIES_PATH, notice)).into_response()
}
