// A registrant of an activity joined with the grade they received (if any).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GradeRosterRow {
    pub student_id: String,
    pub full_name: Option<String>,
    pub registration_status: String,
    pub score: Option<i64>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentGradeRow {
    pub student_id: String,
    pub activity_title: String,
    pub score: i64,
}
