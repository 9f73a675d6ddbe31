#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityEvaluationsRow {
    pub id: String,
    pub activity_id: String,
    pub student_id: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: String,
}
