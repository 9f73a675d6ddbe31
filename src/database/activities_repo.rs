use sqlx::SqlitePool;

use crate::models::ActivitiesRow;

const ACTIVITY_COLUMNS: &str =
    "id, title, description, date, location, participants, user_id, created_at";

pub async fn list_activities(pool: &SqlitePool) -> sqlx::Result<Vec<ActivitiesRow>> {
    let sql = format!(
        "SELECT {} FROM activities ORDER BY created_at DESC, id DESC",
        ACTIVITY_COLUMNS
    );
    sqlx::query_as::<_, ActivitiesRow>(&sql).fetch_all(pool).await
}

/// Activities on or after `today` (`YYYY-MM-DD`), soonest first.
pub async fn list_upcoming(
    pool: &SqlitePool,
    today: &str,
    limit: i64,
) -> sqlx::Result<Vec<ActivitiesRow>> {
    let sql = format!(
        "SELECT {} FROM activities WHERE date >= ?1 ORDER BY date ASC, created_at ASC LIMIT ?2",
        ACTIVITY_COLUMNS
    );
    sqlx::query_as::<_, ActivitiesRow>(&sql)
        .bind(today)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn load_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Option<ActivitiesRow>> {
    let sql = format!("SELECT {} FROM activities WHERE id = ?1", ACTIVITY_COLUMNS);
    sqlx::query_as::<_, ActivitiesRow>(&sql)
        .bind(activity_id)
        .fetch_optional(pool)
        .await
}

pub struct ActivityFields<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub date: &'a str,
    pub location: &'a str,
    pub participants: i64,
}

const SQL_INSERT_ACTIVITY: &str = r#"
INSERT INTO activities (id, title, description, date, location, participants, user_id)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub async fn insert_activity(
    pool: &SqlitePool,
    id: &str,
    owner_id: &str,
    fields: ActivityFields<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_ACTIVITY)
        .bind(id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.date)
        .bind(fields.location)
        .bind(fields.participants)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_UPDATE_ACTIVITY: &str = r#"
UPDATE activities
SET title = ?3, description = ?4, date = ?5, location = ?6, participants = ?7
WHERE id = ?1 AND user_id = ?2
"#;

/// Only the owner's row is touched; returns 0 otherwise.
pub async fn update_activity(
    pool: &SqlitePool,
    id: &str,
    owner_id: &str,
    fields: ActivityFields<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_ACTIVITY)
        .bind(id)
        .bind(owner_id)
        .bind(fields.title)
        .bind(fields.description)
        .bind(fields.date)
        .bind(fields.location)
        .bind(fields.participants)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_DELETE_ACTIVITY: &str = r#"
DELETE FROM activities WHERE id = ?1 AND user_id = ?2
"#;

pub async fn delete_activity(pool: &SqlitePool, id: &str, owner_id: &str) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_ACTIVITY)
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationCountRow {
    pub activity_id: String,
    pub registered: i64,
}

const SQL_COUNT_REGISTRATIONS: &str = r#"
SELECT activity_id, COUNT(*) AS registered
FROM student_registrations
WHERE status != 'rejected'
GROUP BY activity_id
"#;

pub async fn count_registrations(pool: &SqlitePool) -> sqlx::Result<Vec<RegistrationCountRow>> {
    sqlx::query_as::<_, RegistrationCountRow>(SQL_COUNT_REGISTRATIONS)
        .fetch_all(pool)
        .await
}
