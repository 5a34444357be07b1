use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;

use super::story_models::{
    AddStoryRequest, AddStoryResponse,
    DeleteStoryRequest, DeleteStoryResponse,
    MoveStoryRequest, MoveStoryResponse, MoveStoryToIterationRequest,
    UpdateStoryRequest, UpdateStoryResponse,
};
use crate::forms;
use crate::models::story::{BUCKET_BACKLOG, BUCKET_ICEBOX, BUCKET_ITERATION};
use crate::models::user_association::Permission;
use crate::routes::guard;

// Default handler for the story root
pub async fn story_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the Story endpoint.")
}

// The owner dropdown of the story form only offered project members, so a
// submitted owner has to resolve to an association on the project.
async fn resolve_owner(
    pool: &MySqlPool,
    project_id: i32,
    owner_user_name: &Option<String>,
) -> Result<Option<i32>, &'static str> {
    let name = match owner_user_name {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(None),
    };

    let result = sqlx::query_scalar::<_, i32>(
        "SELECT ua.user_id
         FROM UserAssociations_ ua
         JOIN Users_ u ON ua.user_id = u.user_id
         WHERE ua.project_id = ? AND u.user_name = ?",
    )
    .bind(project_id)
    .bind(name)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(user_id)) => Ok(Some(user_id)),
        Ok(None) => Err("Owner must be a member of the project"),
        Err(e) => {
            error!("Failed to resolve story owner {}: {}", name, e);
            Err("Failed to resolve story owner")
        }
    }
}

async fn story_project(pool: &MySqlPool, story_id: i32) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT project_id FROM Stories_ WHERE story_id = ?")
        .bind(story_id)
        .fetch_optional(pool)
        .await
}

// Handler to create a story together with its inline tasks. New stories land
// in the icebox until the owner schedules them.
pub async fn add_story(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddStoryRequest>,
) -> impl Responder {
    if let Err(e) = guard::require_permission(
        pool.get_ref(),
        &req,
        request.project_id,
        Permission::CreateStory,
    )
    .await
    {
        return guard::deny(e);
    }

    let field_errors = forms::validate_story(
        &request.title,
        request.hours,
        &request.story_type,
        &request.status,
    );
    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(AddStoryResponse {
            success: false,
            message: "Validation failed".to_string(),
            field_errors,
            story_id: None,
        });
    }

    let owner_user_id =
        match resolve_owner(pool.get_ref(), request.project_id, &request.owner_user_name).await {
            Ok(owner) => owner,
            Err(message) => {
                return HttpResponse::BadRequest().json(AddStoryResponse {
                    success: false,
                    message: message.to_string(),
                    field_errors: Vec::new(),
                    story_id: None,
                });
            }
        };

    // Insert the story and its tasks in one transaction
    let mut tx = match pool.begin().await {
        Ok(transaction) => transaction,
        Err(e) => {
            error!("Failed to start a transaction: {}", e);
            return HttpResponse::InternalServerError().json(AddStoryResponse {
                success: false,
                message: "Failed to start a transaction".to_string(),
                field_errors: Vec::new(),
                story_id: None,
            });
        }
    };

    let insert_result = sqlx::query(
        "INSERT INTO Stories_ (project_id, iteration_id, bucket, title, description, reason, test,
                               hours, owner_user_id, story_type, status, points, priority, pause,
                               created_at, last_updated)
         VALUES (?, NULL, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW(), NOW())",
    )
    .bind(request.project_id)
    .bind(BUCKET_ICEBOX)
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.reason)
    .bind(&request.test)
    .bind(request.hours)
    .bind(owner_user_id)
    .bind(&request.story_type)
    .bind(&request.status)
    .bind(request.points)
    .bind(request.priority)
    .bind(request.pause)
    .execute(&mut *tx)
    .await;

    let story_id = match insert_result {
        Ok(done) => done.last_insert_id() as i32,
        Err(e) => {
            error!(
                "Failed to create story in project {}: {}",
                request.project_id, e
            );
            let _ = tx.rollback().await;
            return HttpResponse::InternalServerError().json(AddStoryResponse {
                success: false,
                message: "Failed to create story".to_string(),
                field_errors: Vec::new(),
                story_id: None,
            });
        }
    };

    for task in &request.tasks {
        let task_result = sqlx::query("INSERT INTO Tasks_ (story_id, description) VALUES (?, ?)")
            .bind(story_id)
            .bind(&task.description)
            .execute(&mut *tx)
            .await;

        if let Err(e) = task_result {
            error!("Failed to create task for story {}: {}", story_id, e);
            let _ = tx.rollback().await;
            return HttpResponse::InternalServerError().json(AddStoryResponse {
                success: false,
                message: "Failed to create tasks".to_string(),
                field_errors: Vec::new(),
                story_id: None,
            });
        }
    }

    if let Err(e) = tx.commit().await {
        error!("Failed to commit transaction for story {}: {}", story_id, e);
        return HttpResponse::InternalServerError().json(AddStoryResponse {
            success: false,
            message: "Failed to commit transaction".to_string(),
            field_errors: Vec::new(),
            story_id: None,
        });
    }

    info!(
        "Story {} created in project {} with ID: {}",
        request.title, request.project_id, story_id
    );
    HttpResponse::Ok().json(AddStoryResponse {
        success: true,
        message: "Story created successfully".to_string(),
        field_errors: Vec::new(),
        story_id: Some(story_id),
    })
}

// Handler to edit a story. A submitted task list replaces the stored one,
// matching the formset save the form used to do.
pub async fn update_story(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateStoryRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let project_id = match story_project(pool.get_ref(), request.story_id).await {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Story not found: {}", request.story_id);
            return HttpResponse::BadRequest().json(UpdateStoryResponse {
                success: false,
                message: "Story not found".to_string(),
                field_errors: Vec::new(),
            });
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", request.story_id, e);
            return HttpResponse::InternalServerError().json(UpdateStoryResponse {
                success: false,
                message: "Failed to fetch story".to_string(),
                field_errors: Vec::new(),
            });
        }
    };

    if let Err(e) =
        guard::check_permission(pool.get_ref(), &user, project_id, Permission::EditStory).await
    {
        return guard::deny(e);
    }

    let field_errors = forms::validate_story(
        &request.title,
        request.hours,
        &request.story_type,
        &request.status,
    );
    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(UpdateStoryResponse {
            success: false,
            message: "Validation failed".to_string(),
            field_errors,
        });
    }

    let owner_user_id =
        match resolve_owner(pool.get_ref(), project_id, &request.owner_user_name).await {
            Ok(owner) => owner,
            Err(message) => {
                return HttpResponse::BadRequest().json(UpdateStoryResponse {
                    success: false,
                    message: message.to_string(),
                    field_errors: Vec::new(),
                });
            }
        };

    let mut tx = match pool.begin().await {
        Ok(transaction) => transaction,
        Err(e) => {
            error!("Failed to start a transaction: {}", e);
            return HttpResponse::InternalServerError().json(UpdateStoryResponse {
                success: false,
                message: "Failed to start a transaction".to_string(),
                field_errors: Vec::new(),
            });
        }
    };

    let update_result = sqlx::query(
        "UPDATE Stories_ SET title = ?, description = ?, reason = ?, test = ?, hours = ?,
                             owner_user_id = ?, story_type = ?, status = ?, points = ?,
                             priority = ?, pause = ?, last_updated = NOW()
         WHERE story_id = ?",
    )
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.reason)
    .bind(&request.test)
    .bind(request.hours)
    .bind(owner_user_id)
    .bind(&request.story_type)
    .bind(&request.status)
    .bind(request.points)
    .bind(request.priority)
    .bind(request.pause)
    .bind(request.story_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = update_result {
        error!("Failed to update story {}: {}", request.story_id, e);
        let _ = tx.rollback().await;
        return HttpResponse::InternalServerError().json(UpdateStoryResponse {
            success: false,
            message: "Failed to update story".to_string(),
            field_errors: Vec::new(),
        });
    }

    if let Some(tasks) = &request.tasks {
        let delete_result = sqlx::query("DELETE FROM Tasks_ WHERE story_id = ?")
            .bind(request.story_id)
            .execute(&mut *tx)
            .await;

        if let Err(e) = delete_result {
            error!("Failed to clear tasks for story {}: {}", request.story_id, e);
            let _ = tx.rollback().await;
            return HttpResponse::InternalServerError().json(UpdateStoryResponse {
                success: false,
                message: "Failed to replace tasks".to_string(),
                field_errors: Vec::new(),
            });
        }

        for task in tasks {
            let task_result =
                sqlx::query("INSERT INTO Tasks_ (story_id, description) VALUES (?, ?)")
                    .bind(request.story_id)
                    .bind(&task.description)
                    .execute(&mut *tx)
                    .await;

            if let Err(e) = task_result {
                error!("Failed to create task for story {}: {}", request.story_id, e);
                let _ = tx.rollback().await;
                return HttpResponse::InternalServerError().json(UpdateStoryResponse {
                    success: false,
                    message: "Failed to replace tasks".to_string(),
                    field_errors: Vec::new(),
                });
            }
        }
    }

    if let Err(e) = tx.commit().await {
        error!(
            "Failed to commit transaction for story {}: {}",
            request.story_id, e
        );
        return HttpResponse::InternalServerError().json(UpdateStoryResponse {
            success: false,
            message: "Failed to commit transaction".to_string(),
            field_errors: Vec::new(),
        });
    }

    info!("Story {} updated", request.story_id);
    HttpResponse::Ok().json(UpdateStoryResponse {
        success: true,
        message: "Story updated successfully".to_string(),
        field_errors: Vec::new(),
    })
}

// Handler to delete a story and everything attached to it
pub async fn delete_story(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteStoryRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let project_id = match story_project(pool.get_ref(), request.story_id).await {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Story not found: {}", request.story_id);
            return HttpResponse::BadRequest().json(DeleteStoryResponse {
                success: false,
                message: "Story not found".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", request.story_id, e);
            return HttpResponse::InternalServerError().json(DeleteStoryResponse {
                success: false,
                message: "Failed to fetch story".to_string(),
            });
        }
    };

    if let Err(e) =
        guard::check_permission(pool.get_ref(), &user, project_id, Permission::DeleteStory).await
    {
        return guard::deny(e);
    }

    let mut tx = match pool.begin().await {
        Ok(transaction) => transaction,
        Err(e) => {
            error!("Failed to start a transaction: {}", e);
            return HttpResponse::InternalServerError().json(DeleteStoryResponse {
                success: false,
                message: "Failed to start a transaction".to_string(),
            });
        }
    };

    for (what, sql) in [
        ("tasks", "DELETE FROM Tasks_ WHERE story_id = ?"),
        ("comments", "DELETE FROM StoryComments_ WHERE story_id = ?"),
        ("attachments", "DELETE FROM StoryAttachments_ WHERE story_id = ?"),
        ("story", "DELETE FROM Stories_ WHERE story_id = ?"),
    ] {
        let result = sqlx::query(sql)
            .bind(request.story_id)
            .execute(&mut *tx)
            .await;
        if let Err(e) = result {
            error!(
                "Failed to delete {} for story {}: {}",
                what, request.story_id, e
            );
            let _ = tx.rollback().await;
            return HttpResponse::InternalServerError().json(DeleteStoryResponse {
                success: false,
                message: format!("Failed to delete {}", what),
            });
        }
    }

    if let Err(e) = tx.commit().await {
        error!(
            "Failed to commit transaction for deleting story {}: {}",
            request.story_id, e
        );
        return HttpResponse::InternalServerError().json(DeleteStoryResponse {
            success: false,
            message: "Failed to commit transaction".to_string(),
        });
    }

    info!("Story {} deleted successfully", request.story_id);
    HttpResponse::Ok().json(DeleteStoryResponse {
        success: true,
        message: "Story deleted successfully".to_string(),
    })
}

// Handler to schedule a story into an iteration of the same project
pub async fn move_story_to_iteration(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<MoveStoryToIterationRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let project_id = match story_project(pool.get_ref(), request.story_id).await {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Story not found: {}", request.story_id);
            return HttpResponse::BadRequest().json(MoveStoryResponse {
                success: false,
                message: "Story not found".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", request.story_id, e);
            return HttpResponse::InternalServerError().json(MoveStoryResponse {
                success: false,
                message: "Failed to fetch story".to_string(),
            });
        }
    };

    if let Err(e) =
        guard::check_permission(pool.get_ref(), &user, project_id, Permission::ManageProject).await
    {
        return guard::deny(e);
    }

    // The iteration must belong to the story's project
    let iteration_result =
        sqlx::query_scalar::<_, i32>("SELECT project_id FROM Iterations_ WHERE iteration_id = ?")
            .bind(request.iteration_id)
            .fetch_optional(pool.get_ref())
            .await;

    match iteration_result {
        Ok(Some(iteration_project)) if iteration_project == project_id => {}
        Ok(Some(_)) => {
            info!(
                "Iteration {} belongs to a different project than story {}",
                request.iteration_id, request.story_id
            );
            return HttpResponse::BadRequest().json(MoveStoryResponse {
                success: false,
                message: "Iteration belongs to a different project".to_string(),
            });
        }
        Ok(None) => {
            info!("Iteration not found: {}", request.iteration_id);
            return HttpResponse::BadRequest().json(MoveStoryResponse {
                success: false,
                message: "Iteration not found".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to fetch iteration {}: {}", request.iteration_id, e);
            return HttpResponse::InternalServerError().json(MoveStoryResponse {
                success: false,
                message: "Failed to fetch iteration".to_string(),
            });
        }
    }

    move_story(
        pool.get_ref(),
        request.story_id,
        Some(request.iteration_id),
        BUCKET_ITERATION,
    )
    .await
}

// Handler to move a story to the backlog
pub async fn move_story_to_backlog(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<MoveStoryRequest>,
) -> impl Responder {
    move_story_to_bucket(pool, req, request.story_id, BUCKET_BACKLOG).await
}

// Handler to move a story to the icebox
pub async fn move_story_to_icebox(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<MoveStoryRequest>,
) -> impl Responder {
    move_story_to_bucket(pool, req, request.story_id, BUCKET_ICEBOX).await
}

async fn move_story_to_bucket(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    story_id: i32,
    bucket: &'static str,
) -> HttpResponse {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let project_id = match story_project(pool.get_ref(), story_id).await {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Story not found: {}", story_id);
            return HttpResponse::BadRequest().json(MoveStoryResponse {
                success: false,
                message: "Story not found".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", story_id, e);
            return HttpResponse::InternalServerError().json(MoveStoryResponse {
                success: false,
                message: "Failed to fetch story".to_string(),
            });
        }
    };

    if let Err(e) =
        guard::check_permission(pool.get_ref(), &user, project_id, Permission::ManageProject).await
    {
        return guard::deny(e);
    }

    move_story(pool.get_ref(), story_id, None, bucket).await
}

async fn move_story(
    pool: &MySqlPool,
    story_id: i32,
    iteration_id: Option<i32>,
    bucket: &str,
) -> HttpResponse {
    let result = sqlx::query("UPDATE Stories_ SET iteration_id = ?, bucket = ? WHERE story_id = ?")
        .bind(iteration_id)
        .bind(bucket)
        .bind(story_id)
        .execute(pool)
        .await;

    match result {
        Ok(_) => {
            info!("Story {} moved to {}", story_id, bucket);
            HttpResponse::Ok().json(MoveStoryResponse {
                success: true,
                message: format!("Story moved to {}", bucket),
            })
        }
        Err(e) => {
            error!("Failed to move story {}: {}", story_id, e);
            HttpResponse::InternalServerError().json(MoveStoryResponse {
                success: false,
                message: "Failed to move story".to_string(),
            })
        }
    }
}
