use serde::Serialize;
use sqlx::FromRow;

// Per-project selection of which fields the generated iteration report
// includes. One row per project, all fields on by default.
#[derive(Debug, Serialize, FromRow)]
pub struct ReportSettings {
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

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            project_id: 0,
            iteration_description: true,
            iteration_duration: true,
            story_description: true,
            story_reason: true,
            story_test: true,
            story_task: true,
            story_owner: true,
            story_hours: true,
            story_status: true,
            story_points: true,
            pie_chart: false,
        }
    }
}
