use serde::{Deserialize, Serialize};

use crate::forms::FieldError;

// Iteration create request and response. Dates travel as YYYY-MM-DD strings.
#[derive(Deserialize)]
pub struct AddIterationRequest {
    pub project_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize)]
pub struct AddIterationResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
    pub iteration_id: Option<i32>,
}


// Iteration update request and response
#[derive(Deserialize)]
pub struct UpdateIterationRequest {
    pub iteration_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Serialize)]
pub struct UpdateIterationResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}


// Iteration delete request and response
#[derive(Deserialize)]
pub struct DeleteIterationRequest {
    pub iteration_id: i32,
}

#[derive(Serialize)]
pub struct DeleteIterationResponse {
    pub success: bool,
    pub message: String,
}
