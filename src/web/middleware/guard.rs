use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::models::Role;
use crate::web::session::{AuthenticatedUser, SessionState};

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

const LOADING_PAGE: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"><meta http-equiv="refresh" content="1"><title>Loading</title></head>
<body><p>Loading...</p></body></html>"#;

/// Roles allowed on a group of routes. An empty set admits any signed-in user,
/// including one whose profile has no role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteAccess {
    allowed: &'static [Role],
}

#[derive(Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(AuthenticatedUser),
    Wait,
    RedirectLogin,
    RedirectDashboard,
}

impl RouteAccess {
    pub const AUTHENTICATED: Self = Self { allowed: &[] };
    pub const MEMBERS: Self = Self {
        allowed: &[Role::Teacher, Role::Student],
    };
    pub const TEACHERS: Self = Self {
        allowed: &[Role::Teacher],
    };
    pub const STUDENTS: Self = Self {
        allowed: &[Role::Student],
    };

    pub fn allows(&self, role: Option<Role>) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        role.is_some_and(|r| self.allowed.contains(&r))
    }

    pub fn decide(&self, session: &SessionState) -> GuardDecision {
        match session {
            SessionState::Loading => GuardDecision::Wait,
            SessionState::Unauthenticated => GuardDecision::RedirectLogin,
            SessionState::Authenticated(user) if self.allows(user.role) => {
                GuardDecision::Allow(user.clone())
            }
            SessionState::Authenticated(_) => GuardDecision::RedirectDashboard,
        }
    }
}

/// Route-layer middleware: lets the request through with an
/// [`AuthenticatedUser`] extension or redirects.
pub async fn require_access(
    State(access): State<RouteAccess>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = request
        .extensions()
        .get::<SessionState>()
        .cloned()
        .unwrap_or_default();

    match access.decide(&session) {
        GuardDecision::Allow(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        GuardDecision::Wait => Html(LOADING_PAGE).into_response(),
        GuardDecision::RedirectLogin => {
            tracing::debug!(path = %request.uri().path(), "unauthenticated, redirecting to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
        GuardDecision::RedirectDashboard => {
            tracing::debug!(path = %request.uri().path(), "role not allowed, redirecting to dashboard");
            Redirect::to(DASHBOARD_PATH).into_response()
        }
    }
}
