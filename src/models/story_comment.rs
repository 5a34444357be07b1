use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct StoryComment {
    pub comment_id: i32,
    pub story_id: i32,
    pub title: String,
    pub comment: String,
    pub created_at: NaiveDateTime,
}
