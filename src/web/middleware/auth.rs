use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use cookie::Cookie;
use tracing::{debug, warn};

use crate::services::token_service::TokenError;
use crate::web::cookies::{
    append_cookies, cleared_cookies, read_cookie, session_cookies, sets_auth_cookie,
    ACCESS_COOKIE, REFRESH_COOKIE,
};
use crate::web::session::{AuthEvent, SessionIdentity, SessionResolver, SessionState};
use crate::web::state::AppState;

/// The access token that is valid for this request, after any refresh.
#[derive(Clone, Debug)]
pub struct CurrentAccessToken(pub String);

/// Resolves the caller's session from the auth cookies and stores the
/// resulting [`SessionState`] in the request extensions.
///
/// An expired access token is exchanged through the refresh grant and both
/// cookies are re-issued; a failed refresh signs the caller out. Cookies set
/// by the handler itself (sign-in, sign-out) take precedence.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(SessionState::Loading);

    let now = Utc::now().timestamp();
    let access = read_cookie(request.headers(), ACCESS_COOKIE);
    let refresh = read_cookie(request.headers(), REFRESH_COOKIE);
    let verified = access.as_deref().map(|t| state.tokens.verify(t, now));

    let mut set_cookies: Vec<Cookie<'static>> = Vec::new();
    let mut current_token = None;
    let event = match (verified, refresh) {
        (Some(Ok(claims)), _) => {
            current_token = access;
            AuthEvent::InitialSession(Some(claims.into()))
        }
        (Some(Err(TokenError::Expired)) | None, Some(refresh_token)) => {
            match state.auth.refresh_session(&refresh_token).await {
                Ok(session) => {
                    set_cookies = session_cookies(
                        &session.access_token,
                        &session.refresh_token,
                        state.cookie_secure,
                    );
                    current_token = Some(session.access_token);
                    AuthEvent::TokenRefreshed(SessionIdentity::from(session.user))
                }
                Err(e) => {
                    warn!("Token refresh failed: {}", e);
                    set_cookies = cleared_cookies(state.cookie_secure);
                    AuthEvent::SignedOut
                }
            }
        }
        (Some(Err(e)), _) => {
            debug!("Rejected access token: {}", e);
            set_cookies = cleared_cookies(state.cookie_secure);
            AuthEvent::InitialSession(None)
        }
        (None, None) => AuthEvent::InitialSession(None),
    };

    let session = SessionResolver::new(&state.pool).apply(event).await;
    request.extensions_mut().insert(session);
    if let Some(token) = current_token {
        request.extensions_mut().insert(CurrentAccessToken(token));
    }

    let mut response = next.run(request).await;
    if sets_auth_cookie(&response) {
        debug!("handler replaced the session cookies");
    } else {
        append_cookies(&mut response, &set_cookies);
    }
    response
}
