use serde::{Deserialize, Serialize};

use crate::forms::FieldError;

// A task row submitted inline with a story, the way the HTML form used to
// post its task formset.
#[derive(Deserialize)]
pub struct TaskInput {
    pub description: String,
}

// Story create request and response
#[derive(Deserialize)]
pub struct AddStoryRequest {
    pub project_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub test: Option<String>,
    pub hours: i32,
    #[serde(default)]
    pub owner_user_name: Option<String>,
    pub story_type: String,
    pub status: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub pause: bool,
    #[serde(default)]
    pub tasks: Vec<TaskInput>,
}

#[derive(Serialize)]
pub struct AddStoryResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
    pub story_id: Option<i32>,
}


// Story update request and response. A present `tasks` list replaces the
// story's tasks wholesale.
#[derive(Deserialize)]
pub struct UpdateStoryRequest {
    pub story_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub test: Option<String>,
    pub hours: i32,
    #[serde(default)]
    pub owner_user_name: Option<String>,
    pub story_type: String,
    pub status: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub pause: bool,
    #[serde(default)]
    pub tasks: Option<Vec<TaskInput>>,
}

#[derive(Serialize)]
pub struct UpdateStoryResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}


// Story delete request and response
#[derive(Deserialize)]
pub struct DeleteStoryRequest {
    pub story_id: i32,
}

#[derive(Serialize)]
pub struct DeleteStoryResponse {
    pub success: bool,
    pub message: String,
}


// Scheduling move requests; the three move endpoints share one response shape
#[derive(Deserialize)]
pub struct MoveStoryToIterationRequest {
    pub story_id: i32,
    pub iteration_id: i32,
}

#[derive(Deserialize)]
pub struct MoveStoryRequest {
    pub story_id: i32,
}

#[derive(Serialize)]
pub struct MoveStoryResponse {
    pub success: bool,
    pub message: String,
}
