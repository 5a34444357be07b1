use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct Task {
    pub task_id: i32,
    pub story_id: i32,
    pub description: String,
}
