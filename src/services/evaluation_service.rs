use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{activities_repo, evaluations_repo};
use crate::error::{AppError, AppResult, DuplicateKind};
use crate::services::activities_service::format_date_label;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Payload of the evaluate-activity function.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRequest {
    pub activity_id: String,
    pub student_id: String,
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

pub struct EvaluationPage {
    pub activity_id: String,
    pub activity_title: String,
    pub activity_date_label: String,
    pub activity_location: String,
}

/// The activity a student is about to evaluate; `Duplicate(Evaluation)` when
/// they already did.
pub async fn load_evaluation_page(
    pool: &SqlitePool,
    activity_id: &str,
    student_id: &str,
) -> AppResult<EvaluationPage> {
    let activity = activities_repo::load_activity(pool, activity_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if evaluations_repo::find_evaluation(pool, activity_id, student_id)
        .await?
        .is_some()
    {
        return Err(AppError::Duplicate(DuplicateKind::Evaluation));
    }
    Ok(EvaluationPage {
        activity_date_label: format_date_label(&activity.date),
        activity_id: activity.id,
        activity_title: activity.title,
        activity_location: activity.location,
    })
}

/// Records a student's evaluation, at most one per (activity, student).
///
/// An existing evaluation is reported before inserting; two submissions racing
/// past that check still collide on the UNIQUE constraint, which maps to the
/// same `Duplicate(Evaluation)` error.
pub async fn submit(pool: &SqlitePool, req: &EvaluationRequest) -> AppResult<String> {
    if !(MIN_RATING..=MAX_RATING).contains(&req.rating) {
        return Err(AppError::Validation(format!(
            "rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    if activities_repo::load_activity(pool, &req.activity_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }
    if evaluations_repo::find_evaluation(pool, &req.activity_id, &req.student_id)
        .await?
        .is_some()
    {
        return Err(AppError::Duplicate(DuplicateKind::Evaluation));
    }

    let id = Uuid::new_v4().to_string();
    let comment = Some(req.comment.trim()).filter(|c| !c.is_empty());
    evaluations_repo::insert_evaluation(
        pool,
        evaluations_repo::NewEvaluation {
            id: &id,
            activity_id: &req.activity_id,
            student_id: &req.student_id,
            rating: req.rating,
            comment,
        },
    )
    .await
    .map_err(|e| AppError::from_insert(e, DuplicateKind::Evaluation))?;

    tracing::info!(activity_id = %req.activity_id, student_id = %req.student_id, rating = req.rating, "activity evaluated");
    Ok(id)
}
