use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use log::{error, info};
use sqlx::MySqlPool;

use super::iteration_models::{
    AddIterationRequest, AddIterationResponse,
    DeleteIterationRequest, DeleteIterationResponse,
    UpdateIterationRequest, UpdateIterationResponse,
};
use crate::forms;
use crate::models::story::BUCKET_BACKLOG;
use crate::models::user_association::Permission;
use crate::routes::guard;

// Default handler for the iteration root
pub async fn iteration_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the Iteration endpoint.")
}

// Handler to create an iteration inside a project
pub async fn add_iteration(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddIterationRequest>,
) -> impl Responder {
    if let Err(e) = guard::require_permission(
        pool.get_ref(),
        &req,
        request.project_id,
        Permission::CreateIteration,
    )
    .await
    {
        return guard::deny(e);
    }

    // Parse both dates, then run the form rules against today
    let mut field_errors = Vec::new();
    let start_date = match forms::parse_date("start_date", &request.start_date) {
        Ok(date) => Some(date),
        Err(e) => {
            field_errors.push(e);
            None
        }
    };
    let end_date = match forms::parse_date("end_date", &request.end_date) {
        Ok(date) => Some(date),
        Err(e) => {
            field_errors.push(e);
            None
        }
    };

    if let (Some(start), Some(end)) = (start_date, end_date) {
        field_errors.extend(forms::validate_iteration(
            &request.title,
            start,
            end,
            Utc::now().date_naive(),
        ));
    }

    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(AddIterationResponse {
            success: false,
            message: "Validation failed".to_string(),
            field_errors,
            iteration_id: None,
        });
    }

    let result = sqlx::query(
        "INSERT INTO Iterations_ (project_id, title, description, start_date, end_date)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(request.project_id)
    .bind(&request.title)
    .bind(&request.description)
    .bind(start_date)
    .bind(end_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(done) => {
            let iteration_id = done.last_insert_id() as i32;
            info!(
                "Iteration {} created in project {} with ID: {}",
                request.title, request.project_id, iteration_id
            );
            HttpResponse::Ok().json(AddIterationResponse {
                success: true,
                message: "Iteration created successfully".to_string(),
                field_errors: Vec::new(),
                iteration_id: Some(iteration_id),
            })
        }
        Err(e) => {
            error!(
                "Failed to create iteration in project {}: {}",
                request.project_id, e
            );
            HttpResponse::InternalServerError().json(AddIterationResponse {
                success: false,
                message: "Failed to create iteration".to_string(),
                field_errors: Vec::new(),
                iteration_id: None,
            })
        }
    }
}

// Handler to edit an iteration
pub async fn update_iteration(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateIterationRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    // Resolve the iteration to its project before checking the caller's role
    let project_result =
        sqlx::query_scalar::<_, i32>("SELECT project_id FROM Iterations_ WHERE iteration_id = ?")
            .bind(request.iteration_id)
            .fetch_optional(pool.get_ref())
            .await;

    let project_id = match project_result {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Iteration not found: {}", request.iteration_id);
            return HttpResponse::BadRequest().json(UpdateIterationResponse {
                success: false,
                message: "Iteration not found".to_string(),
                field_errors: Vec::new(),
            });
        }
        Err(e) => {
            error!("Failed to fetch iteration {}: {}", request.iteration_id, e);
            return HttpResponse::InternalServerError().json(UpdateIterationResponse {
                success: false,
                message: "Failed to fetch iteration".to_string(),
                field_errors: Vec::new(),
            });
        }
    };

    if let Err(e) =
        guard::check_permission(pool.get_ref(), &user, project_id, Permission::EditIteration).await
    {
        return guard::deny(e);
    }

    let mut field_errors = Vec::new();
    let start_date = match forms::parse_date("start_date", &request.start_date) {
        Ok(date) => Some(date),
        Err(e) => {
            field_errors.push(e);
            None
        }
    };
    let end_date = match forms::parse_date("end_date", &request.end_date) {
        Ok(date) => Some(date),
        Err(e) => {
            field_errors.push(e);
            None
        }
    };

    if let (Some(start), Some(end)) = (start_date, end_date) {
        field_errors.extend(forms::validate_iteration(
            &request.title,
            start,
            end,
            Utc::now().date_naive(),
        ));
    }

    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(UpdateIterationResponse {
            success: false,
            message: "Validation failed".to_string(),
            field_errors,
        });
    }

    let result = sqlx::query(
        "UPDATE Iterations_ SET title = ?, description = ?, start_date = ?, end_date = ?
         WHERE iteration_id = ?",
    )
    .bind(&request.title)
    .bind(&request.description)
    .bind(start_date)
    .bind(end_date)
    .bind(request.iteration_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!("Iteration {} updated", request.iteration_id);
            HttpResponse::Ok().json(UpdateIterationResponse {
                success: true,
                message: "Iteration updated successfully".to_string(),
                field_errors: Vec::new(),
            })
        }
        Err(e) => {
            error!("Failed to update iteration {}: {}", request.iteration_id, e);
            HttpResponse::InternalServerError().json(UpdateIterationResponse {
                success: false,
                message: "Failed to update iteration".to_string(),
                field_errors: Vec::new(),
            })
        }
    }
}

// Handler to delete an iteration. Its stories fall back to the backlog.
pub async fn delete_iteration(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteIterationRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let project_result =
        sqlx::query_scalar::<_, i32>("SELECT project_id FROM Iterations_ WHERE iteration_id = ?")
            .bind(request.iteration_id)
            .fetch_optional(pool.get_ref())
            .await;

    let project_id = match project_result {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Iteration not found: {}", request.iteration_id);
            return HttpResponse::BadRequest().json(DeleteIterationResponse {
                success: false,
                message: "Iteration not found".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to fetch iteration {}: {}", request.iteration_id, e);
            return HttpResponse::InternalServerError().json(DeleteIterationResponse {
                success: false,
                message: "Failed to fetch iteration".to_string(),
            });
        }
    };

    if let Err(e) =
        guard::check_permission(pool.get_ref(), &user, project_id, Permission::DeleteIteration)
            .await
    {
        return guard::deny(e);
    }

    // Start a transaction
    let mut tx = match pool.begin().await {
        Ok(transaction) => transaction,
        Err(e) => {
            error!("Failed to start a transaction: {}", e);
            return HttpResponse::InternalServerError().json(DeleteIterationResponse {
                success: false,
                message: "Failed to start a transaction".to_string(),
            });
        }
    };

    // Move the iteration's stories to the backlog
    let move_result = sqlx::query(
        "UPDATE Stories_ SET iteration_id = NULL, bucket = ? WHERE iteration_id = ?",
    )
    .bind(BUCKET_BACKLOG)
    .bind(request.iteration_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = move_result {
        error!(
            "Failed to move stories out of iteration {}: {}",
            request.iteration_id, e
        );
        let _ = tx.rollback().await;
        return HttpResponse::InternalServerError().json(DeleteIterationResponse {
            success: false,
            message: "Failed to move stories to the backlog".to_string(),
        });
    }

    let delete_result = sqlx::query("DELETE FROM Iterations_ WHERE iteration_id = ?")
        .bind(request.iteration_id)
        .execute(&mut *tx)
        .await;

    if let Err(e) = delete_result {
        error!("Failed to delete iteration {}: {}", request.iteration_id, e);
        let _ = tx.rollback().await;
        return HttpResponse::InternalServerError().json(DeleteIterationResponse {
            success: false,
            message: "Failed to delete iteration".to_string(),
        });
    }

    // Commit the transaction
    if let Err(e) = tx.commit().await {
        error!(
            "Failed to commit transaction for deleting iteration {}: {}",
            request.iteration_id, e
        );
        return HttpResponse::InternalServerError().json(DeleteIterationResponse {
            success: false,
            message: "Failed to commit transaction".to_string(),
        });
    }

    info!("Iteration {} deleted successfully", request.iteration_id);
    HttpResponse::Ok().json(DeleteIterationResponse {
        success: true,
        message: "Iteration deleted successfully".to_string(),
    })
}
