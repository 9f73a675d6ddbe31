//! Session/role resolution.
//!
//! A request starts out `Loading`; the session middleware feeds it one
//! [`AuthEvent`] derived from the auth cookies and the resolver turns that into
//! `Authenticated` (identity plus the role and name from `profiles`) or
//! `Unauthenticated`.

use sqlx::SqlitePool;
use tracing::{debug, error, warn};

use crate::database::profile_repo;
use crate::models::Role;
use crate::services::auth_api_service::AuthUser;
use crate::services::token_service::AccessClaims;

/// Who the auth service says the caller is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: String,
    pub email: Option<String>,
}

impl From<AccessClaims> for SessionIdentity {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

impl From<AuthUser> for SessionIdentity {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub full_name: Option<String>,
}

impl AuthenticatedUser {
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
            .to_string()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Loading,
    Authenticated(AuthenticatedUser),
    Unauthenticated,
}

impl SessionState {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AuthEvent {
    InitialSession(Option<SessionIdentity>),
    SignedIn(SessionIdentity),
    TokenRefreshed(SessionIdentity),
    SignedOut,
}

impl AuthEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitialSession(_) => "INITIAL_SESSION",
            Self::SignedIn(_) => "SIGNED_IN",
            Self::TokenRefreshed(_) => "TOKEN_REFRESHED",
            Self::SignedOut => "SIGNED_OUT",
        }
    }

    fn into_identity(self) -> Option<SessionIdentity> {
        match self {
            Self::InitialSession(identity) => identity,
            Self::SignedIn(identity) | Self::TokenRefreshed(identity) => Some(identity),
            Self::SignedOut => None,
        }
    }
}

pub struct SessionResolver<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionResolver<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Next session state after `event`. A profile that cannot be read leaves
    /// the user signed in without a role.
    pub async fn apply(&self, event: AuthEvent) -> SessionState {
        let name = event.name();
        let Some(identity) = event.into_identity() else {
            debug!(event = name, "no session");
            return SessionState::Unauthenticated;
        };

        let (role, full_name) = match profile_repo::load_profile(self.pool, &identity.id).await {
            Ok(Some(profile)) => (profile.role(), profile.full_name),
            Ok(None) => {
                warn!(user_id = %identity.id, "no profile row for signed-in user");
                (None, None)
            }
            Err(e) => {
                error!(user_id = %identity.id, "Error fetching user profile: {}", e);
                (None, None)
            }
        };
        debug!(event = name, user_id = %identity.id, role = ?role, "session resolved");

        SessionState::Authenticated(AuthenticatedUser {
            id: identity.id,
            email: identity.email,
            role,
            full_name,
        })
    }
}
