use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct Project {
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
}
