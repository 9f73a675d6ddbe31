use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::grades_repo;
use crate::error::{AppError, AppResult};
use crate::models::RegistrationStatus;
use crate::services::activities_service::{format_date_label, load_owned_activity};

pub const MAX_SCORE: i64 = 10;

pub struct GradeRowView {
    pub student_id: String,
    pub student_name: String,
    pub status_label: String,
    pub score: String,
    pub feedback: String,
    pub is_graded: bool,
}

pub struct GradingPage {
    pub activity_id: String,
    pub activity_title: String,
    pub activity_date_label: String,
    pub activity_location: String,
    pub rows: Vec<GradeRowView>,
}

pub async fn load_grading_page(
    pool: &SqlitePool,
    activity_id: &str,
    owner_id: &str,
) -> AppResult<GradingPage> {
    let activity = load_owned_activity(pool, activity_id, owner_id).await?;
    let rows = grades_repo::list_roster(pool, activity_id)
        .await?
        .into_iter()
        .map(|r| GradeRowView {
            student_name: r.full_name.unwrap_or_else(|| r.student_id.clone()),
            status_label: RegistrationStatus::parse(&r.registration_status)
                .map(|s| s.label())
                .unwrap_or("Unknown")
                .to_string(),
            score: r.score.map(|s| s.to_string()).unwrap_or_default(),
            feedback: r.feedback.unwrap_or_default(),
            is_graded: r.score.is_some(),
            student_id: r.student_id,
        })
        .collect();

    Ok(GradingPage {
        activity_id: activity.id,
        activity_date_label: format_date_label(&activity.date),
        activity_title: activity.title,
        activity_location: activity.location,
        rows,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeForm {
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub feedback: String,
}

impl GradeForm {
    pub fn score(&self) -> AppResult<i64> {
        self.score
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|s| (0..=MAX_SCORE).contains(s))
            .ok_or_else(|| AppError::Validation(format!("score must be 0 to {}", MAX_SCORE)))
    }
}

/// Grades a registered student; grading again replaces the earlier grade.
pub async fn save_grade(
    pool: &SqlitePool,
    activity_id: &str,
    student_id: &str,
    teacher_id: &str,
    form: &GradeForm,
) -> AppResult<()> {
    let score = form.score()?;
    load_owned_activity(pool, activity_id, teacher_id).await?;
    let id = Uuid::new_v4().to_string();
    let feedback = Some(form.feedback.trim()).filter(|f| !f.is_empty());
    let written = grades_repo::upsert_grade(
        pool,
        grades_repo::GradeInput {
            id: &id,
            activity_id,
            student_id,
            teacher_id,
            score,
            feedback,
        },
    )
    .await?;
    if written == 0 {
        // Not registered for this activity (or rejected).
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_must_be_within_scale() {
        let form = |s: &str| GradeForm {
            score: s.into(),
            feedback: String::new(),
        };
        assert_eq!(form(" 8 ").score().unwrap(), 8);
        assert_eq!(form("0").score().unwrap(), 0);
        assert!(form("11").score().is_err());
        assert!(form("").score().is_err());
        assert!(form("seven").score().is_err());
    }
}
