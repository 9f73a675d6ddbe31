use sqlx::SqlitePool;

// All ranges are inclusive `YYYY-MM-DD` bounds on `activities.date`.

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct RangeTotalsRow {
    pub activity_count: i64,
    pub participant_count: i64,
    pub average_rating: Option<f64>,
}

const SQL_RANGE_TOTALS: &str = r#"
SELECT
  (SELECT COUNT(*) FROM activities a WHERE a.date BETWEEN ?1 AND ?2) AS activity_count,
  (
    SELECT COUNT(DISTINCT r.student_id)
    FROM student_registrations r
    JOIN activities a ON a.id = r.activity_id
    WHERE a.date BETWEEN ?1 AND ?2 AND r.status != 'rejected'
  ) AS participant_count,
  (
    SELECT AVG(e.rating)
    FROM activity_evaluations e
    JOIN activities a ON a.id = e.activity_id
    WHERE a.date BETWEEN ?1 AND ?2
  ) AS average_rating
"#;

pub async fn load_range_totals(
    pool: &SqlitePool,
    from: &str,
    to: &str,
) -> sqlx::Result<RangeTotalsRow> {
    sqlx::query_as::<_, RangeTotalsRow>(SQL_RANGE_TOTALS)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityBreakdownRow {
    pub id: String,
    pub title: String,
    pub date: String,
    pub registrations: i64,
    pub evaluations: i64,
    pub average_rating: Option<f64>,
}

const SQL_ACTIVITY_BREAKDOWN: &str = r#"
SELECT
  a.id,
  a.title,
  a.date,
  (
    SELECT COUNT(*) FROM student_registrations r
    WHERE r.activity_id = a.id AND r.status != 'rejected'
  ) AS registrations,
  (SELECT COUNT(*) FROM activity_evaluations e WHERE e.activity_id = a.id) AS evaluations,
  (SELECT AVG(e.rating) FROM activity_evaluations e WHERE e.activity_id = a.id) AS average_rating
FROM activities a
WHERE a.date BETWEEN ?1 AND ?2
ORDER BY registrations DESC, a.date ASC, a.title ASC
"#;

pub async fn list_activity_breakdown(
    pool: &SqlitePool,
    from: &str,
    to: &str,
) -> sqlx::Result<Vec<ActivityBreakdownRow>> {
    sqlx::query_as::<_, ActivityBreakdownRow>(SQL_ACTIVITY_BREAKDOWN)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
}
