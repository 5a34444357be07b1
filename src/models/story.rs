use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

// Scheduling buckets. A story sits in exactly one of them; iteration_id is
// set only while the bucket is 'iteration'.
pub const BUCKET_ITERATION: &str = "iteration";
pub const BUCKET_BACKLOG: &str = "backlog";
pub const BUCKET_ICEBOX: &str = "icebox";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Story {
    pub story_id: i32,
    pub project_id: i32,
    pub iteration_id: Option<i32>,
    pub bucket: String,
    pub title: String,
    pub description: Option<String>,
    pub reason: Option<String>,
    pub test: Option<String>,
    pub hours: i32,
    pub owner_user_id: Option<i32>,
    pub story_type: String,
    pub status: String,
    pub points: i32,
    pub priority: i32,
    pub pause: bool,
    pub created_at: NaiveDateTime,
    pub last_updated: NaiveDateTime,
}
