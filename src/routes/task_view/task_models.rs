use serde::{Deserialize, Serialize};

use crate::models::task::Task;

#[derive(Deserialize)]
pub struct ListTasksRequest {
    pub story_id: i32,
}

#[derive(Deserialize)]
pub struct AddTaskRequest {
    pub story_id: i32,
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub task_id: i32,
    pub description: String,
}

#[derive(Deserialize)]
pub struct DeleteTaskRequest {
    pub task_id: i32,
}

// Every task operation answers with the story's refreshed task list, the way
// the task panel re-rendered after each change.
#[derive(Serialize)]
pub struct TaskListResponse {
    pub success: bool,
    pub message: String,
    pub tasks: Vec<Task>,
}
