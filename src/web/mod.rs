use askama::Template;
use axum::response::{Html, IntoResponse, Response};
use chrono::NaiveDate;

use crate::error::AppError;

pub mod app;
pub mod cookies;
pub mod layout;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => AppError::Template(e).into_response(),
    }
}

/// Local calendar date used to split upcoming from past activities.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
