use serde::{Deserialize, Serialize};

use crate::forms::FieldError;

// Username check request and response
#[derive(Deserialize)]
pub struct CheckUsernameRequest {
    pub username: String,
}

#[derive(Serialize)]
pub struct CheckUsernameResponse {
    pub is_unique: bool,
}


// Email check request and response
#[derive(Deserialize)]
pub struct CheckEmailRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct CheckEmailResponse {
    pub is_unique: bool,
}


// Registration request and response. New accounts stay inactive until an
// administrator activates them.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}


// Login request and response
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}


// Auto-login request and response
#[derive(Deserialize)]
pub struct AutoLoginRequest {
}

#[derive(Serialize)]
pub struct AutoLoginResponse {
    pub success: bool,
    pub message: String,
    pub username: String,
}


// Logout request and response
#[derive(Deserialize)]
pub struct LogoutRequest {
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}


// Profile fetch request and response
#[derive(Deserialize)]
pub struct ProfileRequest {
}

#[derive(Serialize)]
pub struct UserProfile {
    pub user_name: String,
    pub user_email: String,
    pub first_name: String,
    pub last_name: String,
    pub default_role: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub profile: Option<UserProfile>,
}


// Profile update request and response
#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Serialize)]
pub struct UpdateProfileResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}


// Password change request and response
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Serialize)]
pub struct ChangePasswordResponse {
    pub success: bool,
    pub message: String,
    pub field_errors: Vec<FieldError>,
}
