use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::database::profile_repo::{self, NewProfile};
use crate::models::Role;
use crate::services::auth_api_service::{AuthSession, NewAccount, SignupOutcome};
use crate::services::notice::{notice_view, with_notice, Notice, NoticeView};
use crate::web::cookies::{append_cookies, cleared_cookies, session_cookies};
use crate::web::middleware::auth::CurrentAccessToken;
use crate::web::middleware::guard::{DASHBOARD_PATH, LOGIN_PATH};
use crate::web::render;
use crate::web::session::{AuthEvent, SessionResolver, SessionState};
use crate::web::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize, Default)]
pub struct AuthPageQuery {
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub notice: Option<NoticeView>,
    pub error: Option<String>,
    pub email: String,
}

#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: String,
}

/// `/`: signed-in users land on the dashboard, everybody else on the login page.
pub async fn root_handler(Extension(session): Extension<SessionState>) -> Redirect {
    match session {
        SessionState::Authenticated(_) => Redirect::to(DASHBOARD_PATH),
        _ => Redirect::to(LOGIN_PATH),
    }
}

pub async fn login_page(
    Extension(session): Extension<SessionState>,
    Query(query): Query<AuthPageQuery>,
) -> Response {
    if session.user().is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    render(&LoginTemplate {
        notice: notice_view(query.notice.as_deref()),
        error: None,
        email: String::new(),
    })
}

pub async fn login_handler(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let email = form.email.trim();
    if email.is_empty() || form.password.is_empty() {
        return login_failed(email, StatusCode::BAD_REQUEST, "Email and password are required.");
    }

    match state.auth.sign_in_with_password(email, &form.password).await {
        Ok(session) => {
            info!(user_id = %session.user.id, "signed in");
            signed_in_redirect(&state, session).await
        }
        Err(e) => {
            warn!(email, "sign-in rejected: {}", e);
            login_failed(email, e.status, &e.message)
        }
    }
}

fn login_failed(email: &str, status: StatusCode, message: &str) -> Response {
    let page = render(&LoginTemplate {
        notice: None,
        error: Some(message.to_string()),
        email: email.to_string(),
    });
    let status = if status.is_client_error() {
        status
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, page).into_response()
}

async fn signed_in_redirect(state: &AppState, session: AuthSession) -> Response {
    let resolved = SessionResolver::new(&state.pool)
        .apply(AuthEvent::SignedIn(session.user.clone().into()))
        .await;
    if resolved.user().is_some_and(|u| u.role.is_none()) {
        warn!(user_id = %session.user.id, "signed in without a role");
    }

    let mut response = Redirect::to(&with_notice(DASHBOARD_PATH, Notice::SignedIn)).into_response();
    let cookies = session_cookies(&session.access_token, &session.refresh_token, state.cookie_secure);
    append_cookies(&mut response, &cookies);
    response
}

pub async fn signup_page(Extension(session): Extension<SessionState>) -> Response {
    if session.user().is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    render(&SignupTemplate {
        error: None,
        full_name: String::new(),
        email: String::new(),
        role: Role::Student.as_str().to_string(),
    })
}

pub async fn signup_handler(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let failed = |status: StatusCode, message: &str| {
        let page = render(&SignupTemplate {
            error: Some(message.to_string()),
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            role: form.role.clone(),
        });
        (status, page).into_response()
    };

    let full_name = form.full_name.trim();
    let email = form.email.trim();
    if full_name.is_empty() || email.is_empty() {
        return failed(StatusCode::BAD_REQUEST, "Name and email are required.");
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return failed(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters.",
        );
    }
    let Some(role) = Role::parse(&form.role) else {
        return failed(StatusCode::BAD_REQUEST, "Choose teacher or student.");
    };

    let outcome = match state
        .auth
        .sign_up(NewAccount {
            email,
            password: &form.password,
            full_name,
            role,
        })
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(email, "sign-up rejected: {}", e);
            let status = if e.status.is_client_error() {
                e.status
            } else {
                StatusCode::BAD_GATEWAY
            };
            return failed(status, &e.message);
        }
    };

    let user = outcome.user();
    if let Err(e) = profile_repo::insert_profile(
        &state.pool,
        NewProfile {
            id: &user.id,
            role,
            full_name,
            email: Some(user.email.as_deref().unwrap_or(email)),
        },
    )
    .await
    {
        warn!(user_id = %user.id, "profile insert failed: {}", e);
        return failed(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Your account was created but the profile could not be saved.",
        );
    }
    info!(user_id = %user.id, role = %role, "account created");

    match outcome {
        SignupOutcome::Session(session) => signed_in_redirect(&state, session).await,
        SignupOutcome::PendingConfirmation(_) => {
            Redirect::to(&with_notice(LOGIN_PATH, Notice::SignupCheckEmail)).into_response()
        }
    }
}

/// Revokes the session at the auth service using the token the session
/// middleware accepted (refreshed if needed), then clears the cookies.
pub async fn logout_handler(
    State(state): State<AppState>,
    token: Option<Extension<CurrentAccessToken>>,
) -> Response {
    if let Some(Extension(CurrentAccessToken(token))) = token {
        if let Err(e) = state.auth.sign_out(&token).await {
            warn!("sign-out at auth service failed: {}", e);
        }
    }
    info!("signed out");

    let mut response = Redirect::to(&with_notice(LOGIN_PATH, Notice::SignedOut)).into_response();
    append_cookies(&mut response, &cleared_cookies(state.cookie_secure));
    response
}
