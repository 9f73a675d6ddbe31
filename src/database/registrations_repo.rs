use sqlx::SqlitePool;

use crate::models::{
    ActivityRegistrationRow, MyRegistrationRow, RegistrationStatus, StudentRegistrationsRow,
};

const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO student_registrations (id, activity_id, student_id, status)
VALUES (?1, ?2, ?3, 'pending')
"#;

/// Fails with a UNIQUE violation when the student already registered.
pub async fn insert_registration(
    pool: &SqlitePool,
    id: &str,
    activity_id: &str,
    student_id: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(id)
        .bind(activity_id)
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(())
}

const SQL_LOAD_REGISTRATION: &str = r#"
SELECT id, activity_id, student_id, status, registration_date
FROM student_registrations
WHERE id = ?1
"#;

pub async fn load_registration(
    pool: &SqlitePool,
    registration_id: &str,
) -> sqlx::Result<Option<StudentRegistrationsRow>> {
    sqlx::query_as::<_, StudentRegistrationsRow>(SQL_LOAD_REGISTRATION)
        .bind(registration_id)
        .fetch_optional(pool)
        .await
}

const SQL_LIST_STUDENT_REGISTRATIONS: &str = r#"
SELECT id, activity_id, student_id, status, registration_date
FROM student_registrations
WHERE student_id = ?1
"#;

pub async fn list_for_student(
    pool: &SqlitePool,
    student_id: &str,
) -> sqlx::Result<Vec<StudentRegistrationsRow>> {
    sqlx::query_as::<_, StudentRegistrationsRow>(SQL_LIST_STUDENT_REGISTRATIONS)
        .bind(student_id)
        .fetch_all(pool)
        .await
}

const SQL_LIST_MY_REGISTRATIONS: &str = r#"
SELECT
  r.id,
  r.activity_id,
  r.status,
  r.registration_date,
  a.title,
  a.date,
  a.location,
  a.participants
FROM student_registrations r
LEFT JOIN activities a ON a.id = r.activity_id
WHERE r.student_id = ?1
ORDER BY r.registration_date DESC, r.id DESC
"#;

pub async fn list_my_registrations(
    pool: &SqlitePool,
    student_id: &str,
) -> sqlx::Result<Vec<MyRegistrationRow>> {
    sqlx::query_as::<_, MyRegistrationRow>(SQL_LIST_MY_REGISTRATIONS)
        .bind(student_id)
        .fetch_all(pool)
        .await
}

const SQL_CANCEL_REGISTRATION: &str = r#"
DELETE FROM student_registrations
WHERE id = ?1 AND student_id = ?2 AND status = 'pending'
"#;

/// Only the student's own pending registration is removed.
pub async fn cancel_registration(
    pool: &SqlitePool,
    registration_id: &str,
    student_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_CANCEL_REGISTRATION)
        .bind(registration_id)
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_FOR_ACTIVITY: &str = r#"
SELECT
  r.id,
  r.student_id,
  r.status,
  r.registration_date,
  p.full_name,
  p.school
FROM student_registrations r
LEFT JOIN profiles p ON p.id = r.student_id
WHERE r.activity_id = ?1
ORDER BY r.registration_date ASC, r.id ASC
"#;

pub async fn list_for_activity(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<ActivityRegistrationRow>> {
    sqlx::query_as::<_, ActivityRegistrationRow>(SQL_LIST_FOR_ACTIVITY)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

const SQL_UPDATE_STATUS: &str = r#"
UPDATE student_registrations
SET status = ?3
WHERE id = ?1
  AND activity_id = ?2
  AND EXISTS (SELECT 1 FROM activities a WHERE a.id = ?2 AND a.user_id = ?4)
"#;

/// Only applies when `owner_id` owns the activity.
pub async fn update_status(
    pool: &SqlitePool,
    registration_id: &str,
    activity_id: &str,
    owner_id: &str,
    status: RegistrationStatus,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_STATUS)
        .bind(registration_id)
        .bind(activity_id)
        .bind(status.as_str())
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_COUNT_PENDING_FOR_OWNER: &str = r#"
SELECT COUNT(*)
FROM student_registrations r
JOIN activities a ON a.id = r.activity_id
WHERE a.user_id = ?1 AND r.status = 'pending'
"#;

pub async fn count_pending_for_owner(pool: &SqlitePool, owner_id: &str) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_PENDING_FOR_OWNER)
        .bind(owner_id)
        .fetch_one(pool)
        .await
}
