use sqlx::SqlitePool;

use crate::models::ActivityEvaluationsRow;

const SQL_FIND_EVALUATION: &str = r#"
SELECT id, activity_id, student_id, rating, comment, created_at
FROM activity_evaluations
WHERE activity_id = ?1 AND student_id = ?2
LIMIT 1
"#;

pub async fn find_evaluation(
    pool: &SqlitePool,
    activity_id: &str,
    student_id: &str,
) -> sqlx::Result<Option<ActivityEvaluationsRow>> {
    sqlx::query_as::<_, ActivityEvaluationsRow>(SQL_FIND_EVALUATION)
        .bind(activity_id)
        .bind(student_id)
        .fetch_optional(pool)
        .await
}

pub struct NewEvaluation<'a> {
    pub id: &'a str,
    pub activity_id: &'a str,
    pub student_id: &'a str,
    pub rating: i64,
    pub comment: Option<&'a str>,
}

const SQL_INSERT_EVALUATION: &str = r#"
INSERT INTO activity_evaluations (id, activity_id, student_id, rating, comment)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub async fn insert_evaluation(pool: &SqlitePool, eval: NewEvaluation<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_EVALUATION)
        .bind(eval.id)
        .bind(eval.activity_id)
        .bind(eval.student_id)
        .bind(eval.rating)
        .bind(eval.comment)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LIST_EVALUATED_ACTIVITY_IDS: &str = r#"
SELECT activity_id FROM activity_evaluations WHERE student_id = ?1
"#;

pub async fn list_evaluated_activity_ids(
    pool: &SqlitePool,
    student_id: &str,
) -> sqlx::Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(SQL_LIST_EVALUATED_ACTIVITY_IDS)
        .bind(student_id)
        .fetch_all(pool)
        .await
}
