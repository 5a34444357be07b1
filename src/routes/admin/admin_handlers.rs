use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;

use super::admin_models::{ActivateUserRequest, AdminDefaultResponse};

pub async fn session_reset(pool: web::Data<MySqlPool>) -> impl Responder {
    // Attempt to delete all sessions from the Sessions_ table
    let result = sqlx::query("DELETE FROM Sessions_")
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(AdminDefaultResponse {
            success: true,
            message: "All sessions have been reset successfully".into(),
        }),
        Err(e) => {
            error!("Failed to reset sessions: {}", e);
            HttpResponse::InternalServerError().json(AdminDefaultResponse {
                success: false,
                message: "Failed to reset sessions".into(),
            })
        }
    }
}

// Flip is_active on a pending account so the user can sign in
pub async fn activate_user(
    pool: web::Data<MySqlPool>,
    req: web::Json<ActivateUserRequest>,
) -> impl Responder {
    let username = &req.username;
    info!("Received request to activate user: {}", username);

    let result = sqlx::query("UPDATE Users_ SET is_active = TRUE WHERE user_name = ?")
        .bind(username)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(done) if done.rows_affected() > 0 => {
            info!("User {} activated", username);
            HttpResponse::Ok().json(AdminDefaultResponse {
                success: true,
                message: "User activated successfully".into(),
            })
        }
        Ok(_) => {
            info!("User not found: {}", username);
            HttpResponse::BadRequest().json(AdminDefaultResponse {
                success: false,
                message: "User not found".into(),
            })
        }
        Err(e) => {
            error!("Failed to activate user {}: {}", username, e);
            HttpResponse::InternalServerError().json(AdminDefaultResponse {
                success: false,
                message: "Failed to activate user".into(),
            })
        }
    }
}
