use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{activities_repo, evaluations_repo, registrations_repo};
use crate::error::{AppError, AppResult};
use crate::models::{ActivitiesRow, RegistrationStatus, Role};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize, Default)]
pub struct ActivitiesQuery {
    pub notice: Option<String>,
}

pub struct ActivityCardView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date_label: String,
    pub location: String,
    pub participants: i64,
    pub registered_count: i64,
    pub is_past: bool,
    pub can_manage: bool,
    pub can_register: bool,
    pub registration_status: Option<String>,
    pub registration_label: Option<String>,
    pub can_evaluate: bool,
    pub has_evaluated: bool,
}

/// Everything on the activities page, newest first. What a card offers depends
/// on the viewer: owners manage, students register and evaluate.
pub async fn build_activities_page(
    pool: &SqlitePool,
    viewer_id: &str,
    role: Option<Role>,
    today: NaiveDate,
) -> AppResult<Vec<ActivityCardView>> {
    let rows = activities_repo::list_activities(pool).await?;
    let counts: HashMap<String, i64> = activities_repo::count_registrations(pool)
        .await?
        .into_iter()
        .map(|r| (r.activity_id, r.registered))
        .collect();

    let (my_statuses, evaluated) = if role == Some(Role::Student) {
        let statuses: HashMap<String, String> =
            registrations_repo::list_for_student(pool, viewer_id)
                .await?
                .into_iter()
                .map(|r| (r.activity_id, r.status))
                .collect();
        let evaluated: HashSet<String> =
            evaluations_repo::list_evaluated_activity_ids(pool, viewer_id)
                .await?
                .into_iter()
                .collect();
        (statuses, evaluated)
    } else {
        (HashMap::new(), HashSet::new())
    };

    Ok(rows
        .into_iter()
        .map(|row| {
            let registered_count = counts.get(&row.id).copied().unwrap_or(0);
            let status = my_statuses.get(&row.id).cloned();
            let has_evaluated = evaluated.contains(&row.id);
            build_card(row, viewer_id, role, today, registered_count, status, has_evaluated)
        })
        .collect())
}

fn build_card(
    row: ActivitiesRow,
    viewer_id: &str,
    role: Option<Role>,
    today: NaiveDate,
    registered_count: i64,
    status: Option<String>,
    has_evaluated: bool,
) -> ActivityCardView {
    let is_student = role == Some(Role::Student);
    let is_past = parse_date(&row.date).map(|d| d < today).unwrap_or(false);
    let registration_label = status
        .as_deref()
        .and_then(RegistrationStatus::parse)
        .map(|s| s.label().to_string());

    ActivityCardView {
        can_manage: role == Some(Role::Teacher) && row.user_id == viewer_id,
        can_register: is_student && status.is_none(),
        can_evaluate: is_student && !has_evaluated,
        date_label: format_date_label(&row.date),
        description: row.description.unwrap_or_default(),
        id: row.id,
        title: row.title,
        location: row.location,
        participants: row.participants,
        registered_count,
        is_past,
        registration_status: status,
        registration_label,
        has_evaluated,
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// "2025-03-02" -> "02 Mar 2025"; unparseable dates are shown as stored.
pub fn format_date_label(raw: &str) -> String {
    match parse_date(raw) {
        Some(d) => d.format("%d %b %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub participants: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidActivity {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub location: String,
    pub participants: i64,
}

impl ActivityForm {
    pub fn from_row(row: &ActivitiesRow) -> Self {
        Self {
            title: row.title.clone(),
            description: row.description.clone().unwrap_or_default(),
            date: row.date.clone(),
            location: row.location.clone(),
            participants: row.participants.to_string(),
        }
    }

    pub fn validate(&self) -> AppResult<ValidActivity> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title is required".into()));
        }
        let location = self.location.trim();
        if location.is_empty() {
            return Err(AppError::Validation("location is required".into()));
        }
        let date = parse_date(&self.date)
            .ok_or_else(|| AppError::Validation("date must be YYYY-MM-DD".into()))?;
        let participants = match self.participants.trim() {
            "" => 0,
            raw => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or_else(|| AppError::Validation("participants must be 0 or more".into()))?,
        };
        let description = Some(self.description.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ValidActivity {
            title: title.to_string(),
            description,
            date: date.format(DATE_FORMAT).to_string(),
            location: location.to_string(),
            participants,
        })
    }
}

impl ValidActivity {
    fn fields(&self) -> activities_repo::ActivityFields<'_> {
        activities_repo::ActivityFields {
            title: &self.title,
            description: self.description.as_deref(),
            date: &self.date,
            location: &self.location,
            participants: self.participants,
        }
    }
}

pub async fn create_activity(
    pool: &SqlitePool,
    owner_id: &str,
    form: &ActivityForm,
) -> AppResult<String> {
    let valid = form.validate()?;
    let id = Uuid::new_v4().to_string();
    activities_repo::insert_activity(pool, &id, owner_id, valid.fields()).await?;
    tracing::info!(activity_id = %id, owner_id, "activity created");
    Ok(id)
}

/// Loads an activity the teacher may manage: `NotFound` when it does not
/// exist, `Forbidden` when somebody else owns it.
pub async fn load_owned_activity(
    pool: &SqlitePool,
    activity_id: &str,
    owner_id: &str,
) -> AppResult<ActivitiesRow> {
    let row = activities_repo::load_activity(pool, activity_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if row.user_id != owner_id {
        return Err(AppError::Forbidden);
    }
    Ok(row)
}

pub async fn update_activity(
    pool: &SqlitePool,
    activity_id: &str,
    owner_id: &str,
    form: &ActivityForm,
) -> AppResult<()> {
    let valid = form.validate()?;
    load_owned_activity(pool, activity_id, owner_id).await?;
    let updated =
        activities_repo::update_activity(pool, activity_id, owner_id, valid.fields()).await?;
    if updated == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub async fn delete_activity(pool: &SqlitePool, activity_id: &str, owner_id: &str) -> AppResult<()> {
    load_owned_activity(pool, activity_id, owner_id).await?;
    let deleted = activities_repo::delete_activity(pool, activity_id, owner_id).await?;
    if deleted == 0 {
        return Err(AppError::NotFound);
    }
    tracing::info!(activity_id, owner_id, "activity deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, date: &str, location: &str, participants: &str) -> ActivityForm {
        ActivityForm {
            title: title.into(),
            description: "  ".into(),
            date: date.into(),
            location: location.into(),
            participants: participants.into(),
        }
    }

    #[test]
    fn valid_form_is_trimmed() {
        let valid = form(" Football match ", "2025-03-02", " School field ", "20")
            .validate()
            .unwrap();
        assert_eq!(valid.title, "Football match");
        assert_eq!(valid.location, "School field");
        assert_eq!(valid.participants, 20);
        assert_eq!(valid.description, None);
    }

    #[test]
    fn empty_participants_defaults_to_zero() {
        let valid = form("Picnic", "2025-03-01", "Park", "").validate().unwrap();
        assert_eq!(valid.participants, 0);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        assert!(form("", "2025-03-01", "Park", "1").validate().is_err());
        assert!(form("Picnic", "01/03/2025", "Park", "1").validate().is_err());
        assert!(form("Picnic", "2025-03-01", "", "1").validate().is_err());
        assert!(form("Picnic", "2025-03-01", "Park", "-3").validate().is_err());
    }

    #[test]
    fn date_label_falls_back_to_raw_value() {
        assert_eq!(format_date_label("2025-03-02"), "02 Mar 2025");
        assert_eq!(format_date_label("someday"), "someday");
    }
}
