#![allow(dead_code, unused_imports)]

mod mock_auth;

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use activity_board::config::AppConfig;
use activity_board::database::{self, profile_repo};
use activity_board::models::Role;
use activity_board::services::activities_service::{self, ActivityForm};
use activity_board::services::token_service::{AccessClaims, TokenVerifier};
use activity_board::web::{app::build_router, state::AppState};

pub use mock_auth::{refresh_token_for, rotated_token_for, MockAuth, PASSWORD};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const TEACHER: &str = "teacher-1";
pub const OTHER_TEACHER: &str = "teacher-2";
pub const STUDENT: &str = "student-1";
pub const OTHER_STUDENT: &str = "student-2";
pub const NO_ROLE: &str = "user-without-role";

pub struct TestApp {
    pub pool: SqlitePool,
    pub router: Router,
    pub auth: MockAuth,
}

fn test_config(auth_url: &str) -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("AUTH_URL", auth_url),
        ("AUTH_API_KEY", "test-key"),
        ("JWT_SECRET", JWT_SECRET),
    ]);
    AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap()
}

pub async fn spawn_app() -> TestApp {
    let pool = database::connect_in_memory().await.unwrap();
    seed_profile(&pool, TEACHER, Role::Teacher, "Tess Teacher").await;
    seed_profile(&pool, OTHER_TEACHER, Role::Teacher, "Otto Other").await;
    seed_profile(&pool, STUDENT, Role::Student, "Sam Student").await;
    seed_profile(&pool, OTHER_STUDENT, Role::Student, "Sue Student").await;
    sqlx::query("INSERT INTO profiles (id, full_name) VALUES (?1, 'No Role')")
        .bind(NO_ROLE)
        .execute(&pool)
        .await
        .unwrap();

    let (auth_url, auth) = mock_auth::spawn_mock_auth().await;
    let router = build_router(AppState::new(pool.clone(), &test_config(&auth_url)));
    TestApp { pool, router, auth }
}

async fn seed_profile(pool: &SqlitePool, id: &str, role: Role, name: &str) {
    profile_repo::insert_profile(
        pool,
        profile_repo::NewProfile {
            id,
            role,
            full_name: name,
            email: None,
        },
    )
    .await
    .unwrap();
}

pub async fn seed_activity(pool: &SqlitePool, owner: &str, title: &str, date: &str) -> String {
    let form = ActivityForm {
        title: title.to_string(),
        description: String::new(),
        date: date.to_string(),
        location: "Gym".to_string(),
        participants: "20".to_string(),
    };
    activities_service::create_activity(pool, owner, &form)
        .await
        .unwrap()
}

pub fn token_for(user_id: &str, exp_offset_secs: i64) -> String {
    TokenVerifier::new(JWT_SECRET)
        .sign(&AccessClaims {
            sub: user_id.to_string(),
            email: Some(format!("{}@school.test", user_id)),
            exp: Utc::now().timestamp() + exp_offset_secs,
        })
        .unwrap()
}

pub fn session_cookie(user_id: &str) -> String {
    format!("access_token={}", token_for(user_id, 3600))
}

/// Cookie header for a session whose access token has expired.
pub fn stale_session_cookie(user_id: &str, refresh_token: &str) -> String {
    format!(
        "access_token={}; refresh_token={}",
        token_for(user_id, -3600),
        refresh_token
    )
}

/// Subject of a valid access token.
pub fn token_subject(token: &str) -> Option<String> {
    TokenVerifier::new(JWT_SECRET)
        .verify(token, Utc::now().timestamp())
        .ok()
        .map(|claims| claims.sub)
}

/// Number of rows for one student and activity in `table`.
pub async fn count_for_pair(pool: &SqlitePool, table: &str, activity_id: &str, student_id: &str) -> i64 {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE activity_id = ?1 AND student_id = ?2",
        table
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(activity_id)
        .bind(student_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, user: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, session_cookie(user));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, user: Option<&str>, body: &str) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user) = user {
            builder = builder.header(header::COOKIE, session_cookie(user));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get_with_cookie(&self, uri: &str, cookie: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    pub async fn post_form_with_cookie(&self, uri: &str, cookie: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::COOKIE, cookie)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        bearer: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(user) = bearer {
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token_for(user, 3600)),
            );
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }
}

pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER, "expected a redirect");
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Every `Set-Cookie` header on the response, in order.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value the browser keeps for `name` once all `Set-Cookie` headers apply.
pub fn final_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    let cookies = set_cookies(response);
    let value = cookies
        .iter()
        .filter_map(|raw| cookie::Cookie::parse(raw.as_str()).ok())
        .filter(|c| c.name() == name)
        .last()
        .map(|c| c.value().to_string());
    value
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
