use serde::{Deserialize, Serialize};

use crate::models::iteration::Iteration;
use crate::models::story::Story;

// Project list request and response
#[derive(Deserialize)]
pub struct ListProjectsRequest {
}

#[derive(Serialize)]
pub struct ProjectSummary {
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub role: String,
}

#[derive(Serialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<ProjectSummary>,
}


// Project create request and response
#[derive(Deserialize)]
pub struct AddProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct AddProjectResponse {
    pub success: bool,
    pub message: String,
    pub project_id: Option<i32>,
}


// Project detail request and response
#[derive(Deserialize)]
pub struct GetProjectDetailRequest {
    pub project_id: i32,
}

#[derive(Serialize)]
pub struct MemberInfo {
    pub user_name: String,
    pub user_email: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct IterationWithStories {
    pub iteration: Iteration,
    pub stories: Vec<Story>,
}

#[derive(Serialize)]
pub struct GetProjectDetailResponse {
    pub success: bool,
    pub message: String,
    pub project_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub members: Vec<MemberInfo>,
    pub iterations: Vec<IterationWithStories>,
    pub backlog: Vec<Story>,
    pub icebox: Vec<Story>,
}


// Project update request and response
#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub project_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateProjectResponse {
    pub success: bool,
    pub message: String,
}


// Project delete request and response
#[derive(Deserialize)]
pub struct DeleteProjectRequest {
    pub project_id: i32,
}

#[derive(Serialize)]
pub struct DeleteProjectResponse {
    pub success: bool,
    pub message: String,
}


// Membership requests and responses
#[derive(Deserialize)]
pub struct AddMemberRequest {
    pub project_id: i32,
    pub user_name: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct AddMemberResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub project_id: i32,
    pub user_name: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct UpdateMemberRoleResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct RemoveMemberRequest {
    pub project_id: i32,
    pub user_name: String,
}

#[derive(Serialize)]
pub struct RemoveMemberResponse {
    pub success: bool,
    pub message: String,
}
