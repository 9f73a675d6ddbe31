pub mod activities;
pub mod activity;
pub mod auth;
pub mod dashboard;
pub mod functions;
pub mod grades;
pub mod profile;
pub mod registrations;
pub mod reports;
pub mod students;
