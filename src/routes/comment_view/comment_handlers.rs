use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;

use super::comment_models::{
    AddCommentRequest, CommentListResponse, DeleteCommentRequest, ListCommentsRequest,
    UpdateCommentRequest,
};
use crate::forms;
use crate::models::story_comment::StoryComment;
use crate::routes::guard;

fn failure(message: &str) -> CommentListResponse {
    CommentListResponse {
        success: false,
        message: message.to_string(),
        field_errors: Vec::new(),
        comments: Vec::new(),
    }
}

async fn story_exists(pool: &MySqlPool, story_id: i32) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Stories_ WHERE story_id = ?")
        .bind(story_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

// Commenting touches the story's freshness stamp
async fn touch_story(pool: &MySqlPool, story_id: i32) {
    let result = sqlx::query("UPDATE Stories_ SET last_updated = NOW() WHERE story_id = ?")
        .bind(story_id)
        .execute(pool)
        .await;
    if let Err(e) = result {
        error!("Failed to touch story {}: {}", story_id, e);
    }
}

async fn comment_list_response(pool: &MySqlPool, story_id: i32, message: &str) -> HttpResponse {
    let result = sqlx::query_as::<_, StoryComment>(
        "SELECT comment_id, story_id, title, comment, created_at
         FROM StoryComments_ WHERE story_id = ?
         ORDER BY created_at",
    )
    .bind(story_id)
    .fetch_all(pool)
    .await;

    match result {
        Ok(comments) => HttpResponse::Ok().json(CommentListResponse {
            success: true,
            message: message.to_string(),
            field_errors: Vec::new(),
            comments,
        }),
        Err(e) => {
            error!("Failed to fetch comments for story {}: {}", story_id, e);
            HttpResponse::InternalServerError().json(failure("Failed to fetch comments"))
        }
    }
}

// Handler to list the comments of a story
pub async fn list_comments(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<ListCommentsRequest>,
) -> impl Responder {
    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    comment_list_response(pool.get_ref(), request.story_id, "").await
}

// Handler to add a comment to a story
pub async fn add_comment(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddCommentRequest>,
) -> impl Responder {
    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    let field_errors = forms::validate_comment(&request.title, &request.comment);
    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(CommentListResponse {
            success: false,
            message: "Validation failed".to_string(),
            field_errors,
            comments: Vec::new(),
        });
    }

    match story_exists(pool.get_ref(), request.story_id).await {
        Ok(true) => {}
        Ok(false) => {
            info!("Story not found: {}", request.story_id);
            return HttpResponse::BadRequest().json(failure("Story not found"));
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", request.story_id, e);
            return HttpResponse::InternalServerError().json(failure("Failed to fetch story"));
        }
    }

    let insert_result = sqlx::query(
        "INSERT INTO StoryComments_ (story_id, title, comment, created_at) VALUES (?, ?, ?, NOW())",
    )
    .bind(request.story_id)
    .bind(&request.title)
    .bind(&request.comment)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to add comment to story {}: {}", request.story_id, e);
        return HttpResponse::InternalServerError().json(failure("Failed to add comment"));
    }

    touch_story(pool.get_ref(), request.story_id).await;

    info!("Comment added to story {}", request.story_id);
    comment_list_response(pool.get_ref(), request.story_id, "Comment added successfully").await
}

// Handler to edit a comment
pub async fn update_comment(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateCommentRequest>,
) -> impl Responder {
    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    let field_errors = forms::validate_comment(&request.title, &request.comment);
    if !field_errors.is_empty() {
        return HttpResponse::BadRequest().json(CommentListResponse {
            success: false,
            message: "Validation failed".to_string(),
            field_errors,
            comments: Vec::new(),
        });
    }

    let story_result = sqlx::query_scalar::<_, i32>(
        "SELECT story_id FROM StoryComments_ WHERE comment_id = ?",
    )
    .bind(request.comment_id)
    .fetch_optional(pool.get_ref())
    .await;

    let story_id = match story_result {
        Ok(Some(story_id)) => story_id,
        Ok(None) => {
            info!("Comment not found: {}", request.comment_id);
            return HttpResponse::BadRequest().json(failure("Comment not found"));
        }
        Err(e) => {
            error!("Failed to fetch comment {}: {}", request.comment_id, e);
            return HttpResponse::InternalServerError().json(failure("Failed to fetch comment"));
        }
    };

    let update_result =
        sqlx::query("UPDATE StoryComments_ SET title = ?, comment = ? WHERE comment_id = ?")
            .bind(&request.title)
            .bind(&request.comment)
            .bind(request.comment_id)
            .execute(pool.get_ref())
            .await;

    if let Err(e) = update_result {
        error!("Failed to update comment {}: {}", request.comment_id, e);
        return HttpResponse::InternalServerError().json(failure("Failed to update comment"));
    }

    touch_story(pool.get_ref(), story_id).await;

    info!("Comment {} updated", request.comment_id);
    comment_list_response(pool.get_ref(), story_id, "Comment updated successfully").await
}

// Handler to remove a comment
pub async fn delete_comment(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteCommentRequest>,
) -> impl Responder {
    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    let story_result = sqlx::query_scalar::<_, i32>(
        "SELECT story_id FROM StoryComments_ WHERE comment_id = ?",
    )
    .bind(request.comment_id)
    .fetch_optional(pool.get_ref())
    .await;

    let story_id = match story_result {
        Ok(Some(story_id)) => story_id,
        Ok(None) => {
            info!("Comment not found: {}", request.comment_id);
            return HttpResponse::BadRequest().json(failure("Comment not found"));
        }
        Err(e) => {
            error!("Failed to fetch comment {}: {}", request.comment_id, e);
            return HttpResponse::InternalServerError().json(failure("Failed to fetch comment"));
        }
    };

    let delete_result = sqlx::query("DELETE FROM StoryComments_ WHERE comment_id = ?")
        .bind(request.comment_id)
        .execute(pool.get_ref())
        .await;

    if let Err(e) = delete_result {
        error!("Failed to delete comment {}: {}", request.comment_id, e);
        return HttpResponse::InternalServerError().json(failure("Failed to delete comment"));
    }

    touch_story(pool.get_ref(), story_id).await;

    info!("Comment {} deleted", request.comment_id);
    comment_list_response(pool.get_ref(), story_id, "Comment deleted successfully").await
}
