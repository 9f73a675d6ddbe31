use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{activities_repo, registrations_repo};
use crate::error::{AppError, AppResult, DuplicateKind};
use crate::models::RegistrationStatus;
use crate::services::activities_service::{format_date_label, load_owned_activity};

/// Registers the student for an activity as `pending`. A second registration
/// for the same pair hits the UNIQUE constraint and comes back as
/// `Duplicate(Registration)`.
pub async fn register(pool: &SqlitePool, activity_id: &str, student_id: &str) -> AppResult<String> {
    if activities_repo::load_activity(pool, activity_id).await?.is_none() {
        return Err(AppError::NotFound);
    }
    let id = Uuid::new_v4().to_string();
    registrations_repo::insert_registration(pool, &id, activity_id, student_id)
        .await
        .map_err(|e| AppError::from_insert(e, DuplicateKind::Registration))?;
    tracing::info!(activity_id, student_id, registration_id = %id, "student registered");
    Ok(id)
}

pub async fn cancel(pool: &SqlitePool, registration_id: &str, student_id: &str) -> AppResult<()> {
    let removed = registrations_repo::cancel_registration(pool, registration_id, student_id).await?;
    if removed == 0 {
        // Tell apart "gone" from "not yours / no longer pending".
        return match registrations_repo::load_registration(pool, registration_id).await? {
            None => Err(AppError::NotFound),
            Some(_) => Err(AppError::Forbidden),
        };
    }
    Ok(())
}

pub struct MyRegistrationView {
    pub id: String,
    pub activity_id: String,
    pub title: String,
    pub date_label: String,
    pub location: String,
    pub status: String,
    pub status_label: String,
    pub registered_on: String,
    pub can_cancel: bool,
}

pub async fn list_mine(pool: &SqlitePool, student_id: &str) -> AppResult<Vec<MyRegistrationView>> {
    let rows = registrations_repo::list_my_registrations(pool, student_id).await?;
    Ok(rows
        .into_iter()
        .map(|r| {
            let status = RegistrationStatus::parse(&r.status);
            MyRegistrationView {
                title: r.title.unwrap_or_else(|| "Unknown".to_string()),
                date_label: r
                    .date
                    .as_deref()
                    .map(format_date_label)
                    .unwrap_or_else(|| "Unknown".to_string()),
                location: r.location.unwrap_or_else(|| "Unknown".to_string()),
                status_label: status.map(|s| s.label()).unwrap_or("Unknown").to_string(),
                can_cancel: status == Some(RegistrationStatus::Pending),
                registered_on: date_part(&r.registration_date),
                status: r.status,
                id: r.id,
                activity_id: r.activity_id,
            }
        })
        .collect())
}

pub struct ActivityRegistrationView {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub school: String,
    pub status: String,
    pub status_label: String,
    pub registered_on: String,
}

pub struct ActivityRegistrationsPage {
    pub activity_id: String,
    pub activity_title: String,
    pub activity_date_label: String,
    pub registrations: Vec<ActivityRegistrationView>,
}

pub async fn list_for_owned_activity(
    pool: &SqlitePool,
    activity_id: &str,
    owner_id: &str,
) -> AppResult<ActivityRegistrationsPage> {
    let activity = load_owned_activity(pool, activity_id, owner_id).await?;
    let rows = registrations_repo::list_for_activity(pool, activity_id).await?;
    let registrations = rows
        .into_iter()
        .map(|r| ActivityRegistrationView {
            student_name: r.full_name.unwrap_or_else(|| r.student_id.clone()),
            school: r.school.unwrap_or_default(),
            status_label: RegistrationStatus::parse(&r.status)
                .map(|s| s.label())
                .unwrap_or("Unknown")
                .to_string(),
            registered_on: date_part(&r.registration_date),
            status: r.status,
            id: r.id,
            student_id: r.student_id,
        })
        .collect();

    Ok(ActivityRegistrationsPage {
        activity_id: activity.id,
        activity_date_label: format_date_label(&activity.date),
        activity_title: activity.title,
        registrations,
    })
}

/// Approve or reject a registration on an activity the teacher owns.
pub async fn set_status(
    pool: &SqlitePool,
    activity_id: &str,
    registration_id: &str,
    owner_id: &str,
    status: &str,
) -> AppResult<()> {
    let status = RegistrationStatus::parse(status)
        .ok_or_else(|| AppError::Validation(format!("unknown status {}", status)))?;
    load_owned_activity(pool, activity_id, owner_id).await?;
    let updated =
        registrations_repo::update_status(pool, registration_id, activity_id, owner_id, status)
            .await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(activity_id, registration_id, status = status.as_str(), "registration status changed");
    Ok(())
}

// "2025-03-02T10:11:12.123Z" -> "2025-03-02"
fn date_part(raw: &str) -> String {
    raw.trim().chars().take(10).collect()
}
