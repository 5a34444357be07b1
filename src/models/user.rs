use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub default_role: String,
    pub is_active: bool,
}
