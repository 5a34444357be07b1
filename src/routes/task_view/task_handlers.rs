use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;

use super::task_models::{
    AddTaskRequest, DeleteTaskRequest, ListTasksRequest, TaskListResponse, UpdateTaskRequest,
};
use crate::models::task::Task;
use crate::routes::guard;

fn failure(message: &str) -> TaskListResponse {
    TaskListResponse {
        success: false,
        message: message.to_string(),
        tasks: Vec::new(),
    }
}

async fn story_project(pool: &MySqlPool, story_id: i32) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT project_id FROM Stories_ WHERE story_id = ?")
        .bind(story_id)
        .fetch_optional(pool)
        .await
}

// Resolve a task to its story and project
async fn task_story(pool: &MySqlPool, task_id: i32) -> Result<Option<(i32, i32)>, sqlx::Error> {
    sqlx::query_as::<_, (i32, i32)>(
        "SELECT t.story_id, s.project_id
         FROM Tasks_ t
         JOIN Stories_ s ON t.story_id = s.story_id
         WHERE t.task_id = ?",
    )
    .bind(task_id)
    .fetch_optional(pool)
    .await
}

async fn fetch_tasks(pool: &MySqlPool, story_id: i32) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(
        "SELECT task_id, story_id, description FROM Tasks_ WHERE story_id = ? ORDER BY task_id",
    )
    .bind(story_id)
    .fetch_all(pool)
    .await
}

async fn task_list_response(pool: &MySqlPool, story_id: i32, message: &str) -> HttpResponse {
    match fetch_tasks(pool, story_id).await {
        Ok(tasks) => HttpResponse::Ok().json(TaskListResponse {
            success: true,
            message: message.to_string(),
            tasks,
        }),
        Err(e) => {
            error!("Failed to fetch tasks for story {}: {}", story_id, e);
            HttpResponse::InternalServerError().json(failure("Failed to fetch tasks"))
        }
    }
}

// Handler to list the tasks of a story
pub async fn list_tasks(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<ListTasksRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let project_id = match story_project(pool.get_ref(), request.story_id).await {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Story not found: {}", request.story_id);
            return HttpResponse::BadRequest().json(failure("Story not found"));
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", request.story_id, e);
            return HttpResponse::InternalServerError().json(failure("Failed to fetch story"));
        }
    };

    if let Err(e) = guard::check_member(pool.get_ref(), &user, project_id).await {
        return guard::deny(e);
    }

    task_list_response(pool.get_ref(), request.story_id, "").await
}

// Handler to add a task to a story
pub async fn add_task(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddTaskRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let project_id = match story_project(pool.get_ref(), request.story_id).await {
        Ok(Some(project_id)) => project_id,
        Ok(None) => {
            info!("Story not found: {}", request.story_id);
            return HttpResponse::BadRequest().json(failure("Story not found"));
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", request.story_id, e);
            return HttpResponse::InternalServerError().json(failure("Failed to fetch story"));
        }
    };

    if let Err(e) = guard::check_member(pool.get_ref(), &user, project_id).await {
        return guard::deny(e);
    }

    if request.description.trim().is_empty() {
        return HttpResponse::BadRequest().json(failure("Description is required"));
    }

    let insert_result = sqlx::query("INSERT INTO Tasks_ (story_id, description) VALUES (?, ?)")
        .bind(request.story_id)
        .bind(&request.description)
        .execute(pool.get_ref())
        .await;

    if let Err(e) = insert_result {
        error!("Failed to add task to story {}: {}", request.story_id, e);
        return HttpResponse::InternalServerError().json(failure("Failed to add task"));
    }

    info!("Task added to story {}", request.story_id);
    task_list_response(pool.get_ref(), request.story_id, "Task added successfully").await
}

// Handler to edit a task
pub async fn update_task(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateTaskRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let (story_id, project_id) = match task_story(pool.get_ref(), request.task_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!("Task not found: {}", request.task_id);
            return HttpResponse::BadRequest().json(failure("Task not found"));
        }
        Err(e) => {
            error!("Failed to fetch task {}: {}", request.task_id, e);
            return HttpResponse::InternalServerError().json(failure("Failed to fetch task"));
        }
    };

    if let Err(e) = guard::check_member(pool.get_ref(), &user, project_id).await {
        return guard::deny(e);
    }

    if request.description.trim().is_empty() {
        return HttpResponse::BadRequest().json(failure("Description is required"));
    }

    let update_result = sqlx::query("UPDATE Tasks_ SET description = ? WHERE task_id = ?")
        .bind(&request.description)
        .bind(request.task_id)
        .execute(pool.get_ref())
        .await;

    if let Err(e) = update_result {
        error!("Failed to update task {}: {}", request.task_id, e);
        return HttpResponse::InternalServerError().json(failure("Failed to update task"));
    }

    info!("Task {} updated", request.task_id);
    task_list_response(pool.get_ref(), story_id, "Task updated successfully").await
}

// Handler to remove a task
pub async fn delete_task(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteTaskRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let (story_id, project_id) = match task_story(pool.get_ref(), request.task_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!("Task not found: {}", request.task_id);
            return HttpResponse::BadRequest().json(failure("Task not found"));
        }
        Err(e) => {
            error!("Failed to fetch task {}: {}", request.task_id, e);
            return HttpResponse::InternalServerError().json(failure("Failed to fetch task"));
        }
    };

    if let Err(e) = guard::check_member(pool.get_ref(), &user, project_id).await {
        return guard::deny(e);
    }

    let delete_result = sqlx::query("DELETE FROM Tasks_ WHERE task_id = ?")
        .bind(request.task_id)
        .execute(pool.get_ref())
        .await;

    if let Err(e) = delete_result {
        error!("Failed to delete task {}: {}", request.task_id, e);
        return HttpResponse::InternalServerError().json(failure("Failed to delete task"));
    }

    info!("Task {} deleted", request.task_id);
    task_list_response(pool.get_ref(), story_id, "Task deleted successfully").await
}
