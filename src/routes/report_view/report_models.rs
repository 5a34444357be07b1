use serde::{Deserialize, Serialize};

use crate::models::report_settings::ReportSettings;

// Report settings upsert request; one checkbox per report field
#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub project_id: i32,
    pub iteration_description: bool,
    pub iteration_duration: bool,
    pub story_description: bool,
    pub story_reason: bool,
    pub story_test: bool,
    pub story_task: bool,
    pub story_owner: bool,
    pub story_hours: bool,
    pub story_status: bool,
    pub story_points: bool,
    pub pie_chart: bool,
}

#[derive(Serialize)]
pub struct UpdateSettingsResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct GetSettingsRequest {
    pub project_id: i32,
}

#[derive(Serialize)]
pub struct GetSettingsResponse {
    pub success: bool,
    pub message: String,
    pub settings: Option<ReportSettings>,
}
