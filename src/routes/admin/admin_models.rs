use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct AdminDefaultResponse {
    pub success: bool,
    pub message: String,
}

// Account activation request
#[derive(Deserialize)]
pub struct ActivateUserRequest {
    pub username: String,
}
