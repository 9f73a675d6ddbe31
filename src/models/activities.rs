#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivitiesRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub location: String,
    pub participants: i64,
    pub user_id: String,
    pub created_at: String,
}
