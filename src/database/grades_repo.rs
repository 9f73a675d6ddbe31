use sqlx::SqlitePool;

use crate::models::{GradeRosterRow, StudentGradeRow};

const SQL_LIST_ROSTER: &str = r#"
SELECT
  r.student_id,
  p.full_name,
  r.status AS registration_status,
  g.score,
  g.feedback
FROM student_registrations r
LEFT JOIN profiles p ON p.id = r.student_id
LEFT JOIN participation_grades g
  ON g.activity_id = r.activity_id AND g.student_id = r.student_id
WHERE r.activity_id = ?1
  AND r.status != 'rejected'
ORDER BY p.full_name COLLATE NOCASE ASC, r.student_id ASC
"#;

pub async fn list_roster(
    pool: &SqlitePool,
    activity_id: &str,
) -> sqlx::Result<Vec<GradeRosterRow>> {
    sqlx::query_as::<_, GradeRosterRow>(SQL_LIST_ROSTER)
        .bind(activity_id)
        .fetch_all(pool)
        .await
}

pub struct GradeInput<'a> {
    pub id: &'a str,
    pub activity_id: &'a str,
    pub student_id: &'a str,
    pub teacher_id: &'a str,
    pub score: i64,
    pub feedback: Option<&'a str>,
}

// Writes only for a registered (non-rejected) student of an activity the
// teacher owns; regrading replaces the previous grade.
const SQL_UPSERT_GRADE: &str = r#"
INSERT INTO participation_grades (id, activity_id, student_id, teacher_id, score, feedback)
SELECT ?1, ?2, ?3, ?4, ?5, ?6
WHERE EXISTS (SELECT 1 FROM activities a WHERE a.id = ?2 AND a.user_id = ?4)
  AND EXISTS (
    SELECT 1 FROM student_registrations r
    WHERE r.activity_id = ?2 AND r.student_id = ?3 AND r.status != 'rejected'
  )
ON CONFLICT (activity_id, student_id) DO UPDATE SET
  score = excluded.score,
  feedback = excluded.feedback,
  teacher_id = excluded.teacher_id,
  graded_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
"#;

pub async fn upsert_grade(pool: &SqlitePool, grade: GradeInput<'_>) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPSERT_GRADE)
        .bind(grade.id)
        .bind(grade.activity_id)
        .bind(grade.student_id)
        .bind(grade.teacher_id)
        .bind(grade.score)
        .bind(grade.feedback)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_STUDENT_GRADES: &str = r#"
SELECT g.student_id, a.title AS activity_title, g.score
FROM participation_grades g
JOIN activities a ON a.id = g.activity_id
ORDER BY a.date ASC, a.title ASC
"#;

pub async fn list_student_grades(pool: &SqlitePool) -> sqlx::Result<Vec<StudentGradeRow>> {
    sqlx::query_as::<_, StudentGradeRow>(SQL_LIST_STUDENT_GRADES)
        .fetch_all(pool)
        .await
}
