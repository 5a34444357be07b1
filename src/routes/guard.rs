//! Per-handler authentication and authorization checks. Every protected
//! handler resolves the session cookie to a user, then the user's association
//! on the target project, and early-returns `deny(..)` on failure.

use actix_web::{HttpRequest, HttpResponse};
use log::{error, info};
use serde::Serialize;
use sqlx::MySqlPool;

use crate::models::user_association::{Permission, Role};

pub struct CurrentUser {
    pub user_id: i32,
    pub user_name: String,
}

pub enum GuardError {
    MissingSession,
    InvalidSession,
    NotAMember,
    Forbidden,
    Database(sqlx::Error),
}

#[derive(Serialize)]
struct GuardResponse {
    success: bool,
    message: String,
}

// Resolve the session cookie to its user. Expired sessions are treated the
// same as unknown ones; the expiry comparison lives in SQL.
pub async fn current_user(pool: &MySqlPool, req: &HttpRequest) -> Result<CurrentUser, GuardError> {
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => return Err(GuardError::MissingSession),
    };

    let row = sqlx::query_as::<_, (i32, String)>(
        "SELECT u.user_id, u.user_name FROM Sessions_ s
         JOIN Users_ u ON s.user_id = u.user_id
         WHERE s.session_id = ? AND s.expires_at > NOW()",
    )
    .bind(&session_id)
    .fetch_optional(pool)
    .await
    .map_err(GuardError::Database)?;

    match row {
        Some((user_id, user_name)) => Ok(CurrentUser { user_id, user_name }),
        None => {
            info!("Invalid or expired session ID: {}", session_id);
            Err(GuardError::InvalidSession)
        }
    }
}

pub async fn project_role(
    pool: &MySqlPool,
    user_id: i32,
    project_id: i32,
) -> Result<Role, GuardError> {
    let role = sqlx::query_scalar::<_, String>(
        "SELECT role FROM UserAssociations_ WHERE user_id = ? AND project_id = ?",
    )
    .bind(user_id)
    .bind(project_id)
    .fetch_optional(pool)
    .await
    .map_err(GuardError::Database)?;

    match role.as_deref().and_then(Role::parse) {
        Some(role) => Ok(role),
        None => Err(GuardError::NotAMember),
    }
}

// Association check for an already-authenticated user, used by handlers that
// have to resolve a story or iteration to its project first.
pub async fn check_member(
    pool: &MySqlPool,
    user: &CurrentUser,
    project_id: i32,
) -> Result<Role, GuardError> {
    project_role(pool, user.user_id, project_id).await
}

pub async fn check_permission(
    pool: &MySqlPool,
    user: &CurrentUser,
    project_id: i32,
    permission: Permission,
) -> Result<Role, GuardError> {
    let role = project_role(pool, user.user_id, project_id).await?;
    if !role.can(permission) {
        info!(
            "User {} with role {} denied on project {}",
            user.user_name,
            role.as_str(),
            project_id
        );
        return Err(GuardError::Forbidden);
    }
    Ok(role)
}

// Session plus any association on the project.
pub async fn require_member(
    pool: &MySqlPool,
    req: &HttpRequest,
    project_id: i32,
) -> Result<(CurrentUser, Role), GuardError> {
    let user = current_user(pool, req).await?;
    let role = check_member(pool, &user, project_id).await?;
    Ok((user, role))
}

// Session plus an association whose role grants `permission`.
pub async fn require_permission(
    pool: &MySqlPool,
    req: &HttpRequest,
    project_id: i32,
    permission: Permission,
) -> Result<(CurrentUser, Role), GuardError> {
    let user = current_user(pool, req).await?;
    let role = check_permission(pool, &user, project_id, permission).await?;
    Ok((user, role))
}

pub fn deny(err: GuardError) -> HttpResponse {
    match err {
        GuardError::MissingSession => HttpResponse::BadRequest().json(GuardResponse {
            success: false,
            message: "Session ID not found".to_string(),
        }),
        GuardError::InvalidSession => HttpResponse::Unauthorized().json(GuardResponse {
            success: false,
            message: "Invalid or expired session ID".to_string(),
        }),
        GuardError::NotAMember => HttpResponse::Forbidden().json(GuardResponse {
            success: false,
            message: "No association with this project".to_string(),
        }),
        GuardError::Forbidden => HttpResponse::Forbidden().json(GuardResponse {
            success: false,
            message: "Your role does not permit this action".to_string(),
        }),
        GuardError::Database(e) => {
            error!("Failed to check authorization: {}", e);
            HttpResponse::InternalServerError().json(GuardResponse {
                success: false,
                message: "Failed to check authorization".to_string(),
            })
        }
    }
}
