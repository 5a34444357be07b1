use std::collections::HashMap;

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;

use super::render::render_report;
use super::report_models::{
    GetSettingsRequest, GetSettingsResponse, UpdateSettingsRequest, UpdateSettingsResponse,
};
use crate::models::iteration::Iteration;
use crate::models::report_settings::ReportSettings;
use crate::models::story::Story;
use crate::models::user_association::Permission;
use crate::routes::guard;

// Handler to store which fields the project's report should include
pub async fn update_settings(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateSettingsRequest>,
) -> impl Responder {
    if let Err(e) =
        guard::require_permission(pool.get_ref(), &req, request.project_id, Permission::ManageProject)
            .await
    {
        return guard::deny(e);
    }

    let result = sqlx::query(
        "INSERT INTO ReportSettings_ (project_id, iteration_description, iteration_duration,
                                      story_description, story_reason, story_test, story_task,
                                      story_owner, story_hours, story_status, story_points, pie_chart)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON DUPLICATE KEY UPDATE
             iteration_description = VALUES(iteration_description),
             iteration_duration = VALUES(iteration_duration),
             story_description = VALUES(story_description),
             story_reason = VALUES(story_reason),
             story_test = VALUES(story_test),
             story_task = VALUES(story_task),
             story_owner = VALUES(story_owner),
             story_hours = VALUES(story_hours),
             story_status = VALUES(story_status),
             story_points = VALUES(story_points),
             pie_chart = VALUES(pie_chart)",
    )
    .bind(request.project_id)
    .bind(request.iteration_description)
    .bind(request.iteration_duration)
    .bind(request.story_description)
    .bind(request.story_reason)
    .bind(request.story_test)
    .bind(request.story_task)
    .bind(request.story_owner)
    .bind(request.story_hours)
    .bind(request.story_status)
    .bind(request.story_points)
    .bind(request.pie_chart)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!("Report settings updated for project {}", request.project_id);
            HttpResponse::Ok().json(UpdateSettingsResponse {
                success: true,
                message: "Report settings updated successfully".to_string(),
            })
        }
        Err(e) => {
            error!(
                "Failed to update report settings for project {}: {}",
                request.project_id, e
            );
            HttpResponse::InternalServerError().json(UpdateSettingsResponse {
                success: false,
                message: "Failed to update report settings".to_string(),
            })
        }
    }
}

// Handler to fetch a project's report settings, falling back to the defaults
pub async fn get_settings(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GetSettingsRequest>,
) -> impl Responder {
    if let Err(e) = guard::require_member(pool.get_ref(), &req, request.project_id).await {
        return guard::deny(e);
    }

    let result = sqlx::query_as::<_, ReportSettings>(
        "SELECT project_id, iteration_description, iteration_duration, story_description,
                story_reason, story_test, story_task, story_owner, story_hours, story_status,
                story_points, pie_chart
         FROM ReportSettings_ WHERE project_id = ?",
    )
    .bind(request.project_id)
    .fetch_optional(pool.get_ref())
    .await;

    match result {
        Ok(Some(settings)) => HttpResponse::Ok().json(GetSettingsResponse {
            success: true,
            message: String::new(),
            settings: Some(settings),
        }),
        Ok(None) => HttpResponse::Ok().json(GetSettingsResponse {
            success: true,
            message: String::new(),
            settings: Some(ReportSettings {
                project_id: request.project_id,
                ..ReportSettings::default()
            }),
        }),
        Err(e) => {
            error!(
                "Failed to fetch report settings for project {}: {}",
                request.project_id, e
            );
            HttpResponse::InternalServerError().json(GetSettingsResponse {
                success: false,
                message: "Failed to fetch report settings".to_string(),
                settings: None,
            })
        }
    }
}

// Handler to generate the iteration report and serve it as a download
pub async fn download_report(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<(i32, i32)>,
) -> impl Responder {
    let (project_id, iteration_id) = path.into_inner();

    if let Err(e) =
        guard::require_permission(pool.get_ref(), &req, project_id, Permission::ManageProject).await
    {
        return guard::deny(e);
    }

    // Project title
    let title_result =
        sqlx::query_scalar::<_, String>("SELECT title FROM Projects_ WHERE project_id = ?")
            .bind(project_id)
            .fetch_optional(pool.get_ref())
            .await;

    let project_title = match title_result {
        Ok(Some(title)) => title,
        Ok(None) => {
            info!("Project not found: {}", project_id);
            return HttpResponse::BadRequest().body("Project not found");
        }
        Err(e) => {
            error!("Failed to fetch project {}: {}", project_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch project");
        }
    };

    // The iteration must belong to the project
    let iteration_result = sqlx::query_as::<_, Iteration>(
        "SELECT iteration_id, project_id, title, description, start_date, end_date
         FROM Iterations_ WHERE iteration_id = ? AND project_id = ?",
    )
    .bind(iteration_id)
    .bind(project_id)
    .fetch_optional(pool.get_ref())
    .await;

    let iteration = match iteration_result {
        Ok(Some(iteration)) => iteration,
        Ok(None) => {
            info!("Iteration {} not found in project {}", iteration_id, project_id);
            return HttpResponse::BadRequest().body("Iteration not found");
        }
        Err(e) => {
            error!("Failed to fetch iteration {}: {}", iteration_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch iteration");
        }
    };

    // Settings fall back to the defaults when the project never saved any
    let settings_result = sqlx::query_as::<_, ReportSettings>(
        "SELECT project_id, iteration_description, iteration_duration, story_description,
                story_reason, story_test, story_task, story_owner, story_hours, story_status,
                story_points, pie_chart
         FROM ReportSettings_ WHERE project_id = ?",
    )
    .bind(project_id)
    .fetch_optional(pool.get_ref())
    .await;

    let settings = match settings_result {
        Ok(Some(settings)) => settings,
        Ok(None) => ReportSettings {
            project_id,
            ..ReportSettings::default()
        },
        Err(e) => {
            error!("Failed to fetch report settings for project {}: {}", project_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch report settings");
        }
    };

    // Stories scheduled into the iteration
    let stories_result = sqlx::query_as::<_, Story>(
        "SELECT story_id, project_id, iteration_id, bucket, title, description, reason, test,
                hours, owner_user_id, story_type, status, points, priority, pause,
                created_at, last_updated
         FROM Stories_ WHERE iteration_id = ?
         ORDER BY priority DESC, story_id",
    )
    .bind(iteration_id)
    .fetch_all(pool.get_ref())
    .await;

    let stories = match stories_result {
        Ok(stories) => stories,
        Err(e) => {
            error!("Failed to fetch stories for iteration {}: {}", iteration_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch stories");
        }
    };

    // Task descriptions per story
    let tasks_result = sqlx::query_as::<_, (i32, String)>(
        "SELECT t.story_id, t.description
         FROM Tasks_ t
         JOIN Stories_ s ON t.story_id = s.story_id
         WHERE s.iteration_id = ?
         ORDER BY t.task_id",
    )
    .bind(iteration_id)
    .fetch_all(pool.get_ref())
    .await;

    let mut tasks_by_story: HashMap<i32, Vec<String>> = HashMap::new();
    match tasks_result {
        Ok(records) => {
            for (story_id, description) in records {
                tasks_by_story.entry(story_id).or_default().push(description);
            }
        }
        Err(e) => {
            error!("Failed to fetch tasks for iteration {}: {}", iteration_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch tasks");
        }
    }

    // Owner display names
    let owners_result = sqlx::query_as::<_, (i32, String)>(
        "SELECT u.user_id, u.user_name
         FROM Stories_ s
         JOIN Users_ u ON s.owner_user_id = u.user_id
         WHERE s.iteration_id = ?",
    )
    .bind(iteration_id)
    .fetch_all(pool.get_ref())
    .await;

    let owner_names: HashMap<i32, String> = match owners_result {
        Ok(records) => records.into_iter().collect(),
        Err(e) => {
            error!("Failed to fetch owners for iteration {}: {}", iteration_id, e);
            return HttpResponse::InternalServerError().body("Failed to fetch owners");
        }
    };

    let report = render_report(
        &project_title,
        &iteration,
        &settings,
        &stories,
        &tasks_by_story,
        &owner_names,
    );

    info!(
        "Report generated for iteration {} of project {}",
        iteration_id, project_id
    );
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"iteration-{}-report.txt\"", iteration_id),
        ))
        .body(report)
}
