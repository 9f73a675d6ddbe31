use sqlx::SqlitePool;

use crate::models::{ProfilesRow, Role};

pub const SQL_LOAD_PROFILE: &str = r#"
SELECT id, role, full_name, email, phone, school
FROM profiles
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_profile(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<ProfilesRow>> {
    sqlx::query_as::<_, ProfilesRow>(SQL_LOAD_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

// Sign-up may be retried for an account the auth service already knows;
// the first profile row wins.
const SQL_INSERT_PROFILE: &str = r#"
INSERT INTO profiles (id, role, full_name, email)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (id) DO NOTHING
"#;

pub struct NewProfile<'a> {
    pub id: &'a str,
    pub role: Role,
    pub full_name: &'a str,
    pub email: Option<&'a str>,
}

pub async fn insert_profile(pool: &SqlitePool, profile: NewProfile<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_PROFILE)
        .bind(profile.id)
        .bind(profile.role.as_str())
        .bind(profile.full_name)
        .bind(profile.email)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_UPDATE_PROFILE: &str = r#"
UPDATE profiles
SET full_name = ?2,
    phone = ?3,
    school = ?4,
    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
WHERE id = ?1
"#;

pub struct ProfileUpdate<'a> {
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub school: Option<&'a str>,
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: ProfileUpdate<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_PROFILE)
        .bind(user_id)
        .bind(update.full_name)
        .bind(update.phone)
        .bind(update.school)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentSummaryRow {
    pub id: String,
    pub full_name: Option<String>,
    pub school: Option<String>,
    pub graded_count: i64,
    pub average_score: Option<f64>,
}

const SQL_LIST_STUDENTS: &str = r#"
SELECT
  p.id,
  p.full_name,
  p.school,
  COUNT(g.id) AS graded_count,
  AVG(g.score) AS average_score
FROM profiles p
LEFT JOIN participation_grades g ON g.student_id = p.id
WHERE p.role = 'student'
  AND (
    ?1 = ''
    OR lower(COALESCE(p.full_name, '')) LIKE '%' || ?2 || '%' ESCAPE '\'
    OR lower(p.id) LIKE '%' || ?2 || '%' ESCAPE '\'
  )
GROUP BY p.id
ORDER BY p.full_name COLLATE NOCASE ASC, p.id ASC
"#;

/// `search` must already be lowercased; empty matches everyone. `%` and `_`
/// match literally.
pub async fn list_students(
    pool: &SqlitePool,
    search: &str,
) -> sqlx::Result<Vec<StudentSummaryRow>> {
    sqlx::query_as::<_, StudentSummaryRow>(SQL_LIST_STUDENTS)
        .bind(search)
        .bind(escape_like(search))
        .fetch_all(pool)
        .await
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const SQL_COUNT_STUDENTS: &str = r#"
SELECT COUNT(*) FROM profiles WHERE role = 'student'
"#;

pub async fn count_students(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>(SQL_COUNT_STUDENTS)
        .fetch_one(pool)
        .await
}
