use std::collections::HashMap;

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::{grades_repo, profile_repo};
use crate::error::AppResult;

#[derive(Debug, Deserialize, Default)]
pub struct StudentsQuery {
    pub q: Option<String>,
}

pub struct StudentGradeView {
    pub activity_title: String,
    pub score: i64,
}

pub struct StudentView {
    pub id: String,
    pub name: String,
    pub school: String,
    pub graded_count: i64,
    pub average_score: String,
    pub grades: Vec<StudentGradeView>,
}

pub async fn list_students(pool: &SqlitePool, query: &StudentsQuery) -> AppResult<Vec<StudentView>> {
    let search = query.q.as_deref().unwrap_or("").trim().to_lowercase();
    let rows = profile_repo::list_students(pool, &search).await?;

    let mut grades: HashMap<String, Vec<StudentGradeView>> = HashMap::new();
    for g in grades_repo::list_student_grades(pool).await? {
        grades.entry(g.student_id).or_default().push(StudentGradeView {
            activity_title: g.activity_title,
            score: g.score,
        });
    }

    Ok(rows
        .into_iter()
        .map(|r| StudentView {
            name: r.full_name.unwrap_or_else(|| r.id.clone()),
            school: r.school.unwrap_or_default(),
            graded_count: r.graded_count,
            average_score: format!("{:.1}", r.average_score.unwrap_or(0.0)),
            grades: grades.remove(&r.id).unwrap_or_default(),
            id: r.id,
        })
        .collect())
}
