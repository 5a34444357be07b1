use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::attachment_models::{
    AttachmentListResponse, DeleteAttachmentRequest, DeleteAttachmentResponse, DownloadQuery,
    ListAttachmentsRequest, UploadAttachmentResponse, UploadQuery,
};
use crate::models::story_attachment::StoryAttachment;
use crate::routes::guard;

async fn story_exists(pool: &MySqlPool, story_id: i32) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM Stories_ WHERE story_id = ?")
        .bind(story_id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

// Uploads touch the story's freshness stamp
async fn touch_story(pool: &MySqlPool, story_id: i32) {
    let result = sqlx::query("UPDATE Stories_ SET last_updated = NOW() WHERE story_id = ?")
        .bind(story_id)
        .execute(pool)
        .await;
    if let Err(e) = result {
        error!("Failed to touch story {}: {}", story_id, e);
    }
}

// Handler to upload a file for a story. The request body is the file itself.
pub async fn upload_attachment(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i32>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> impl Responder {
    let story_id = path.into_inner();

    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    if query.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(UploadAttachmentResponse {
            success: false,
            message: "File name is required".to_string(),
            uuid: None,
        });
    }

    if body.is_empty() {
        return HttpResponse::BadRequest().json(UploadAttachmentResponse {
            success: false,
            message: "File content is empty".to_string(),
            uuid: None,
        });
    }

    match story_exists(pool.get_ref(), story_id).await {
        Ok(true) => {}
        Ok(false) => {
            info!("Story not found: {}", story_id);
            return HttpResponse::BadRequest().json(UploadAttachmentResponse {
                success: false,
                message: "Story not found".to_string(),
                uuid: None,
            });
        }
        Err(e) => {
            error!("Failed to fetch story {}: {}", story_id, e);
            return HttpResponse::InternalServerError().json(UploadAttachmentResponse {
                success: false,
                message: "Failed to fetch story".to_string(),
                uuid: None,
            });
        }
    }

    let file_uuid = Uuid::new_v4().to_string();
    let insert_result = sqlx::query(
        "INSERT INTO StoryAttachments_ (uuid, story_id, name, file, uploaded_at)
         VALUES (?, ?, ?, ?, NOW())",
    )
    .bind(&file_uuid)
    .bind(story_id)
    .bind(&query.name)
    .bind(body.to_vec())
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to store attachment for story {}: {}", story_id, e);
        return HttpResponse::InternalServerError().json(UploadAttachmentResponse {
            success: false,
            message: "Failed to store attachment".to_string(),
            uuid: None,
        });
    }

    touch_story(pool.get_ref(), story_id).await;

    info!("Attachment {} uploaded for story {}", file_uuid, story_id);
    HttpResponse::Ok().json(UploadAttachmentResponse {
        success: true,
        message: "Attachment uploaded successfully".to_string(),
        uuid: Some(file_uuid),
    })
}

// Handler to list the attachments of a story
pub async fn list_attachments(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<ListAttachmentsRequest>,
) -> impl Responder {
    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    let result = sqlx::query_as::<_, StoryAttachment>(
        "SELECT uuid, story_id, name, uploaded_at
         FROM StoryAttachments_ WHERE story_id = ?
         ORDER BY uploaded_at",
    )
    .bind(request.story_id)
    .fetch_all(pool.get_ref())
    .await;

    match result {
        Ok(attachments) => HttpResponse::Ok().json(AttachmentListResponse {
            success: true,
            message: String::new(),
            attachments,
        }),
        Err(e) => {
            error!(
                "Failed to fetch attachments for story {}: {}",
                request.story_id, e
            );
            HttpResponse::InternalServerError().json(AttachmentListResponse {
                success: false,
                message: "Failed to fetch attachments".to_string(),
                attachments: Vec::new(),
            })
        }
    }
}

// Handler to delete an attachment by its uuid
pub async fn delete_attachment(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteAttachmentRequest>,
) -> impl Responder {
    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    let delete_result =
        sqlx::query("DELETE FROM StoryAttachments_ WHERE story_id = ? AND uuid = ?")
            .bind(request.story_id)
            .bind(&request.uuid)
            .execute(pool.get_ref())
            .await;

    match delete_result {
        Ok(done) if done.rows_affected() > 0 => {
            touch_story(pool.get_ref(), request.story_id).await;
            info!(
                "Attachment {} deleted from story {}",
                request.uuid, request.story_id
            );
            HttpResponse::Ok().json(DeleteAttachmentResponse {
                success: true,
                message: "Attachment deleted successfully".to_string(),
            })
        }
        Ok(_) => {
            info!("Attachment not found: {}", request.uuid);
            HttpResponse::BadRequest().json(DeleteAttachmentResponse {
                success: false,
                message: "Attachment not found".to_string(),
            })
        }
        Err(e) => {
            error!("Failed to delete attachment {}: {}", request.uuid, e);
            HttpResponse::InternalServerError().json(DeleteAttachmentResponse {
                success: false,
                message: "Failed to delete attachment".to_string(),
            })
        }
    }
}

// Handler to download an attachment. The body is the stored file and the
// browser is told to save it under its original name.
pub async fn download_attachment(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<i32>,
    query: web::Query<DownloadQuery>,
) -> impl Responder {
    let story_id = path.into_inner();

    if let Err(e) = guard::current_user(pool.get_ref(), &req).await {
        return guard::deny(e);
    }

    let result = sqlx::query_as::<_, (String, Vec<u8>)>(
        "SELECT name, file FROM StoryAttachments_ WHERE story_id = ? AND uuid = ?",
    )
    .bind(story_id)
    .bind(&query.file)
    .fetch_optional(pool.get_ref())
    .await;

    match result {
        Ok(Some((name, file))) => {
            info!("Attachment {} downloaded from story {}", query.file, story_id);
            HttpResponse::Ok()
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}\"", name),
                ))
                .body(file)
        }
        Ok(None) => {
            info!("Attachment not found: {}", query.file);
            HttpResponse::NotFound().body("Attachment not found")
        }
        Err(e) => {
            error!("Failed to fetch attachment {}: {}", query.file, e);
            HttpResponse::InternalServerError().body("Failed to fetch attachment")
        }
    }
}
