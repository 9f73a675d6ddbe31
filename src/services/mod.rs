pub mod activities_service;
pub mod auth_api_service;
pub mod dashboard_service;
pub mod evaluation_service;
pub mod grading_service;
pub mod notice;
pub mod profile_service;
pub mod registration_service;
pub mod report_service;
pub mod student_service;
pub mod token_service;
