use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::profile_repo;
use crate::error::{AppError, AppResult};

pub struct ProfileView {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub school: String,
    pub role_label: String,
}

pub async fn load_profile_view(
    pool: &SqlitePool,
    user_id: &str,
    session_email: Option<&str>,
) -> AppResult<ProfileView> {
    let row = profile_repo::load_profile(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ProfileView {
        role_label: row
            .role()
            .map(|r| r.label())
            .unwrap_or("No role")
            .to_string(),
        full_name: row.full_name.unwrap_or_default(),
        email: session_email
            .map(str::to_string)
            .or(row.email)
            .unwrap_or_default(),
        phone: row.phone.unwrap_or_default(),
        school: row.school.unwrap_or_default(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub school: String,
}

pub async fn update_profile(pool: &SqlitePool, user_id: &str, form: &ProfileForm) -> AppResult<()> {
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("full name is required".into()));
    }
    let optional = |s: &str| Some(s.trim()).filter(|v| !v.is_empty()).map(str::to_string);
    let phone = optional(&form.phone);
    let school = optional(&form.school);

    let updated = profile_repo::update_profile(
        pool,
        user_id,
        profile_repo::ProfileUpdate {
            full_name,
            phone: phone.as_deref(),
            school: school.as_deref(),
        },
    )
    .await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
