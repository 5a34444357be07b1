use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

// File bytes live in the same table but are only selected on download.
#[derive(Debug, Serialize, FromRow)]
pub struct StoryAttachment {
    pub uuid: String,
    pub story_id: i32,
    pub name: String,
    pub uploaded_at: NaiveDateTime,
}
