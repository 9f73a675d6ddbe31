use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::database::{activities_repo, registrations_repo};
use crate::error::AppResult;
use crate::models::{RegistrationStatus, Role};
use crate::services::activities_service::{format_date_label, DATE_FORMAT};

const UPCOMING_LIMIT: i64 = 4;

pub struct UpcomingView {
    pub id: String,
    pub title: String,
    pub date_label: String,
    pub location: String,
    pub participants: i64,
}

pub struct DashboardRegistrationView {
    pub title: String,
    pub date_label: String,
    pub location: String,
    pub status: String,
    pub status_label: String,
}

pub struct DashboardNotification {
    pub message: String,
    pub link: Option<String>,
}

pub struct DashboardData {
    pub upcoming: Vec<UpcomingView>,
    pub registrations: Vec<DashboardRegistrationView>,
    pub notifications: Vec<DashboardNotification>,
}

pub async fn build_dashboard(
    pool: &SqlitePool,
    user_id: &str,
    role: Option<Role>,
    today: NaiveDate,
) -> AppResult<DashboardData> {
    let today = today.format(DATE_FORMAT).to_string();
    let upcoming = activities_repo::list_upcoming(pool, &today, UPCOMING_LIMIT)
        .await?
        .into_iter()
        .map(|a| UpcomingView {
            date_label: format_date_label(&a.date),
            id: a.id,
            title: a.title,
            location: a.location,
            participants: a.participants,
        })
        .collect();

    let mut registrations = Vec::new();
    let mut notifications = Vec::new();
    match role {
        Some(Role::Student) => {
            for r in registrations_repo::list_my_registrations(pool, user_id).await? {
                let status = RegistrationStatus::parse(&r.status);
                registrations.push(DashboardRegistrationView {
                    title: r.title.unwrap_or_else(|| "Unknown".to_string()),
                    date_label: r.date.as_deref().map(format_date_label).unwrap_or_default(),
                    location: r.location.unwrap_or_default(),
                    status_label: status.map(|s| s.label()).unwrap_or("Unknown").to_string(),
                    status: r.status,
                });
            }
        }
        Some(Role::Teacher) => {
            let pending = registrations_repo::count_pending_for_owner(pool, user_id).await?;
            if pending > 0 {
                notifications.push(DashboardNotification {
                    message: format!("{} registration(s) awaiting your approval.", pending),
                    link: Some("/activities".to_string()),
                });
            }
        }
        None => notifications.push(DashboardNotification {
            message: "Your account has no role yet. Ask an administrator to assign one.".to_string(),
            link: None,
        }),
    }

    Ok(DashboardData {
        upcoming,
        registrations,
        notifications,
    })
}
