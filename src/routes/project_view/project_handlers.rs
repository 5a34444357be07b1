use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;

use super::project_models::{
    AddMemberRequest, AddMemberResponse,
    AddProjectRequest, AddProjectResponse,
    DeleteProjectRequest, DeleteProjectResponse,
    GetProjectDetailRequest, GetProjectDetailResponse, IterationWithStories, MemberInfo,
    ListProjectsRequest, ListProjectsResponse, ProjectSummary,
    RemoveMemberRequest, RemoveMemberResponse,
    UpdateMemberRoleRequest, UpdateMemberRoleResponse,
    UpdateProjectRequest, UpdateProjectResponse,
};
use crate::models::iteration::Iteration;
use crate::models::project::Project;
use crate::models::story::{Story, BUCKET_BACKLOG, BUCKET_ICEBOX};
use crate::models::user_association::{Permission, Role, ROLE_OWNER};
use crate::routes::guard;

// Default handler for the project root
pub async fn project_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the Project endpoint.")
}

// Handler to list the projects of the signed-in user together with the role
// they hold on each
pub async fn list_projects(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    _: web::Json<ListProjectsRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    let result = sqlx::query_as::<_, (i32, String, Option<String>, String)>(
        "SELECT p.project_id, p.title, p.description, ua.role
         FROM UserAssociations_ ua
         JOIN Projects_ p ON ua.project_id = p.project_id
         WHERE ua.user_id = ?
         ORDER BY p.title",
    )
    .bind(user.user_id)
    .fetch_all(pool.get_ref())
    .await;

    match result {
        Ok(records) => {
            let projects = records
                .into_iter()
                .map(|(project_id, title, description, role)| ProjectSummary {
                    project_id,
                    title,
                    description,
                    role,
                })
                .collect();
            HttpResponse::Ok().json(ListProjectsResponse { projects })
        }
        Err(e) => {
            error!("Failed to fetch projects for user {}: {}", user.user_name, e);
            HttpResponse::InternalServerError().json(ListProjectsResponse {
                projects: Vec::new(),
            })
        }
    }
}

// Handler to create a project. The creator becomes its owner.
pub async fn add_project(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddProjectRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(e) => return guard::deny(e),
    };

    if request.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(AddProjectResponse {
            success: false,
            message: "Title is required".to_string(),
            project_id: None,
        });
    }

    // Create the project and the owner association in one transaction
    let mut tx = match pool.begin().await {
        Ok(transaction) => transaction,
        Err(e) => {
            error!("Failed to start a transaction: {}", e);
            return HttpResponse::InternalServerError().json(AddProjectResponse {
                success: false,
                message: "Failed to start a transaction".to_string(),
                project_id: None,
            });
        }
    };

    let insert_result = sqlx::query("INSERT INTO Projects_ (title, description) VALUES (?, ?)")
        .bind(&request.title)
        .bind(&request.description)
        .execute(&mut *tx)
        .await;

    let project_id = match insert_result {
        Ok(done) => done.last_insert_id() as i32,
        Err(e) => {
            error!("Failed to insert project {}: {}", request.title, e);
            let _ = tx.rollback().await;
            return HttpResponse::InternalServerError().json(AddProjectResponse {
                success: false,
                message: "Failed to create project".to_string(),
                project_id: None,
            });
        }
    };

    let mapping_result = sqlx::query(
        "INSERT INTO UserAssociations_ (user_id, project_id, role) VALUES (?, ?, ?)",
    )
    .bind(user.user_id)
    .bind(project_id)
    .bind(ROLE_OWNER)
    .execute(&mut *tx)
    .await;

    if let Err(e) = mapping_result {
        error!("Failed to map user to project {}: {}", project_id, e);
        let _ = tx.rollback().await;
        return HttpResponse::InternalServerError().json(AddProjectResponse {
            success: false,
            message: "Failed to map user to project".to_string(),
            project_id: None,
        });
    }

    if let Err(e) = tx.commit().await {
        error!("Failed to commit transaction for project {}: {}", project_id, e);
        return HttpResponse::InternalServerError().json(AddProjectResponse {
            success: false,
            message: "Failed to commit transaction".to_string(),
            project_id: None,
        });
    }

    info!("Project {} created successfully with ID: {}", request.title, project_id);
    HttpResponse::Ok().json(AddProjectResponse {
        success: true,
        message: "Project created successfully".to_string(),
        project_id: Some(project_id),
    })
}

// Handler to get a project with its members, iterations and story buckets
pub async fn get_project_detail(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<GetProjectDetailRequest>,
) -> impl Responder {
    let project_id = request.project_id;

    let empty = |message: &str| GetProjectDetailResponse {
        success: false,
        message: message.to_string(),
        project_id,
        title: String::new(),
        description: None,
        members: Vec::new(),
        iterations: Vec::new(),
        backlog: Vec::new(),
        icebox: Vec::new(),
    };

    if let Err(e) = guard::require_member(pool.get_ref(), &req, project_id).await {
        return guard::deny(e);
    }

    // Project row
    let project_result = sqlx::query_as::<_, Project>(
        "SELECT project_id, title, description FROM Projects_ WHERE project_id = ?",
    )
    .bind(project_id)
    .fetch_optional(pool.get_ref())
    .await;

    let project = match project_result {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!("Project not found: {}", project_id);
            return HttpResponse::BadRequest().json(empty("Project not found"));
        }
        Err(e) => {
            error!("Failed to fetch project {}: {}", project_id, e);
            return HttpResponse::InternalServerError().json(empty("Failed to fetch project"));
        }
    };

    // Members with their roles
    let members_result = sqlx::query_as::<_, (String, String, String)>(
        "SELECT u.user_name, u.user_email, ua.role
         FROM UserAssociations_ ua
         JOIN Users_ u ON ua.user_id = u.user_id
         WHERE ua.project_id = ?
         ORDER BY u.user_name",
    )
    .bind(project_id)
    .fetch_all(pool.get_ref())
    .await;

    let members: Vec<MemberInfo> = match members_result {
        Ok(records) => records
            .into_iter()
            .map(|(user_name, user_email, role)| MemberInfo {
                user_name,
                user_email,
                role,
            })
            .collect(),
        Err(e) => {
            error!("Failed to fetch members for project {}: {}", project_id, e);
            return HttpResponse::InternalServerError().json(empty("Failed to fetch members"));
        }
    };

    // Iterations
    let iterations_result = sqlx::query_as::<_, Iteration>(
        "SELECT iteration_id, project_id, title, description, start_date, end_date
         FROM Iterations_ WHERE project_id = ?
         ORDER BY start_date",
    )
    .bind(project_id)
    .fetch_all(pool.get_ref())
    .await;

    let iteration_rows = match iterations_result {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to fetch iterations for project {}: {}", project_id, e);
            return HttpResponse::InternalServerError().json(empty("Failed to fetch iterations"));
        }
    };

    // All stories of the project, partitioned into buckets afterwards
    let stories_result = sqlx::query_as::<_, Story>(
        "SELECT story_id, project_id, iteration_id, bucket, title, description, reason, test,
                hours, owner_user_id, story_type, status, points, priority, pause,
                created_at, last_updated
         FROM Stories_ WHERE project_id = ?
         ORDER BY priority DESC, story_id",
    )
    .bind(project_id)
    .fetch_all(pool.get_ref())
    .await;

    let stories = match stories_result {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to fetch stories for project {}: {}", project_id, e);
            return HttpResponse::InternalServerError().json(empty("Failed to fetch stories"));
        }
    };

    let mut backlog = Vec::new();
    let mut icebox = Vec::new();
    let mut scheduled: Vec<Story> = Vec::new();
    for story in stories {
        match story.bucket.as_str() {
            BUCKET_BACKLOG => backlog.push(story),
            BUCKET_ICEBOX => icebox.push(story),
            _ => scheduled.push(story),
        }
    }

    let iterations = iteration_rows
        .into_iter()
        .map(|iteration| {
            let stories = scheduled
                .iter()
                .filter(|s| s.iteration_id == Some(iteration.iteration_id))
                .cloned()
                .collect();
            IterationWithStories { iteration, stories }
        })
        .collect();

    HttpResponse::Ok().json(GetProjectDetailResponse {
        success: true,
        message: String::new(),
        project_id,
        title: project.title,
        description: project.description,
        members,
        iterations,
        backlog,
        icebox,
    })
}

// Handler to update a project's title and description
pub async fn update_project(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateProjectRequest>,
) -> impl Responder {
    if let Err(e) =
        guard::require_permission(pool.get_ref(), &req, request.project_id, Permission::ManageProject)
            .await
    {
        return guard::deny(e);
    }

    if request.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(UpdateProjectResponse {
            success: false,
            message: "Title is required".to_string(),
        });
    }

    let result = sqlx::query("UPDATE Projects_ SET title = ?, description = ? WHERE project_id = ?")
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.project_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(done) if done.rows_affected() > 0 => {
            info!("Project {} updated", request.project_id);
            HttpResponse::Ok().json(UpdateProjectResponse {
                success: true,
                message: "Project updated successfully".to_string(),
            })
        }
        Ok(_) => {
            info!("Project not found: {}", request.project_id);
            HttpResponse::BadRequest().json(UpdateProjectResponse {
                success: false,
                message: "Project not found".to_string(),
            })
        }
        Err(e) => {
            error!("Failed to update project {}: {}", request.project_id, e);
            HttpResponse::InternalServerError().json(UpdateProjectResponse {
                success: false,
                message: "Failed to update project".to_string(),
            })
        }
    }
}

// Handler to delete a project and everything hanging off it
pub async fn delete_project(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteProjectRequest>,
) -> impl Responder {
    let project_id = request.project_id;

    if let Err(e) =
        guard::require_permission(pool.get_ref(), &req, project_id, Permission::ManageProject).await
    {
        return guard::deny(e);
    }

    // Start a transaction
    let mut tx = match pool.begin().await {
        Ok(transaction) => transaction,
        Err(e) => {
            error!("Failed to start a transaction: {}", e);
            return HttpResponse::InternalServerError().json(DeleteProjectResponse {
                success: false,
                message: "Failed to start a transaction".to_string(),
            });
        }
    };

    // Delete tasks attached to the project's stories
    let delete_tasks_result = sqlx::query(
        "DELETE t FROM Tasks_ t
         JOIN Stories_ s ON t.story_id = s.story_id
         WHERE s.project_id = ?",
    )
    .bind(project_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = delete_tasks_result {
        error!("Failed to delete tasks for project {}: {}", project_id, e);
        let _ = tx.rollback().await;
        return HttpResponse::InternalServerError().json(DeleteProjectResponse {
            success: false,
            message: "Failed to delete tasks".to_string(),
        });
    }

    // Delete comments attached to the project's stories
    let delete_comments_result = sqlx::query(
        "DELETE c FROM StoryComments_ c
         JOIN Stories_ s ON c.story_id = s.story_id
         WHERE s.project_id = ?",
    )
    .bind(project_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = delete_comments_result {
        error!("Failed to delete comments for project {}: {}", project_id, e);
        let _ = tx.rollback().await;
        return HttpResponse::InternalServerError().json(DeleteProjectResponse {
            success: false,
            message: "Failed to delete comments".to_string(),
        });
    }

    // Delete attachments attached to the project's stories
    let delete_attachments_result = sqlx::query(
        "DELETE a FROM StoryAttachments_ a
         JOIN Stories_ s ON a.story_id = s.story_id
         WHERE s.project_id = ?",
    )
    .bind(project_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = delete_attachments_result {
        error!("Failed to delete attachments for project {}: {}", project_id, e);
        let _ = tx.rollback().await;
        return HttpResponse::InternalServerError().json(DeleteProjectResponse {
            success: false,
            message: "Failed to delete attachments".to_string(),
        });
    }

    // Delete stories, iterations, associations and report settings
    for (what, sql) in [
        ("stories", "DELETE FROM Stories_ WHERE project_id = ?"),
        ("iterations", "DELETE FROM Iterations_ WHERE project_id = ?"),
        ("associations", "DELETE FROM UserAssociations_ WHERE project_id = ?"),
        ("report settings", "DELETE FROM ReportSettings_ WHERE project_id = ?"),
        ("project", "DELETE FROM Projects_ WHERE project_id = ?"),
    ] {
        let result = sqlx::query(sql).bind(project_id).execute(&mut *tx).await;
        if let Err(e) = result {
            error!("Failed to delete {} for project {}: {}", what, project_id, e);
            let _ = tx.rollback().await;
            return HttpResponse::InternalServerError().json(DeleteProjectResponse {
                success: false,
                message: format!("Failed to delete {}", what),
            });
        }
    }

    // Commit the transaction
    if let Err(e) = tx.commit().await {
        error!("Failed to commit transaction for deleting project {}: {}", project_id, e);
        return HttpResponse::InternalServerError().json(DeleteProjectResponse {
            success: false,
            message: "Failed to commit transaction".to_string(),
        });
    }

    info!("Project {} deleted successfully", project_id);
    HttpResponse::Ok().json(DeleteProjectResponse {
        success: true,
        message: "Project deleted successfully".to_string(),
    })
}

// Handler to add a member with a role to a project
pub async fn add_member(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<AddMemberRequest>,
) -> impl Responder {
    if let Err(e) =
        guard::require_permission(pool.get_ref(), &req, request.project_id, Permission::ManageProject)
            .await
    {
        return guard::deny(e);
    }

    let role = match Role::parse(&request.role) {
        Some(role) => role,
        None => {
            info!("Unknown role code: {}", request.role);
            return HttpResponse::BadRequest().json(AddMemberResponse {
                success: false,
                message: "Role must be one of cli, own or dev".to_string(),
            });
        }
    };

    // Look up the user to add
    let user_result = sqlx::query_scalar::<_, i32>("SELECT user_id FROM Users_ WHERE user_name = ?")
        .bind(&request.user_name)
        .fetch_optional(pool.get_ref())
        .await;

    let member_user_id = match user_result {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            info!("User not found: {}", request.user_name);
            return HttpResponse::BadRequest().json(AddMemberResponse {
                success: false,
                message: "User not found".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to execute query: {}", e);
            return HttpResponse::InternalServerError().json(AddMemberResponse {
                success: false,
                message: "Failed to add member".to_string(),
            });
        }
    };

    let insert_result = sqlx::query(
        "INSERT INTO UserAssociations_ (user_id, project_id, role) VALUES (?, ?, ?)",
    )
    .bind(member_user_id)
    .bind(request.project_id)
    .bind(role.as_str())
    .execute(pool.get_ref())
    .await;

    match insert_result {
        Ok(_) => {
            info!(
                "User {} added to project {} as {}",
                request.user_name,
                request.project_id,
                role.as_str()
            );
            HttpResponse::Ok().json(AddMemberResponse {
                success: true,
                message: "Member added successfully".to_string(),
            })
        }
        Err(e) => {
            // The unique key on (user_id, project_id) makes a duplicate the
            // common failure here
            error!(
                "Failed to add {} to project {}: {}",
                request.user_name, request.project_id, e
            );
            HttpResponse::BadRequest().json(AddMemberResponse {
                success: false,
                message: "User is already a member of this project".to_string(),
            })
        }
    }
}

// Count the owner associations on a project; demoting or removing the last
// owner would orphan it.
async fn count_owners(pool: &MySqlPool, project_id: i32) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM UserAssociations_ WHERE project_id = ? AND role = ?",
    )
    .bind(project_id)
    .bind(ROLE_OWNER)
    .fetch_one(pool)
    .await
}

// Handler to change the access level of a member
pub async fn update_member_role(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateMemberRoleRequest>,
) -> impl Responder {
    if let Err(e) =
        guard::require_permission(pool.get_ref(), &req, request.project_id, Permission::ManageProject)
            .await
    {
        return guard::deny(e);
    }

    let role = match Role::parse(&request.role) {
        Some(role) => role,
        None => {
            info!("Unknown role code: {}", request.role);
            return HttpResponse::BadRequest().json(UpdateMemberRoleResponse {
                success: false,
                message: "Role must be one of cli, own or dev".to_string(),
            });
        }
    };

    // Current association of the target member
    let current_result = sqlx::query_as::<_, (i32, String)>(
        "SELECT ua.user_id, ua.role
         FROM UserAssociations_ ua
         JOIN Users_ u ON ua.user_id = u.user_id
         WHERE ua.project_id = ? AND u.user_name = ?",
    )
    .bind(request.project_id)
    .bind(&request.user_name)
    .fetch_optional(pool.get_ref())
    .await;

    let (member_user_id, current_role) = match current_result {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!(
                "No association for {} on project {}",
                request.user_name, request.project_id
            );
            return HttpResponse::BadRequest().json(UpdateMemberRoleResponse {
                success: false,
                message: "User is not a member of this project".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to execute query: {}", e);
            return HttpResponse::InternalServerError().json(UpdateMemberRoleResponse {
                success: false,
                message: "Failed to update member role".to_string(),
            });
        }
    };

    // The last owner cannot be demoted
    if current_role == ROLE_OWNER && role != Role::Owner {
        match count_owners(pool.get_ref(), request.project_id).await {
            Ok(1) => {
                info!(
                    "Refusing to demote the last owner of project {}",
                    request.project_id
                );
                return HttpResponse::BadRequest().json(UpdateMemberRoleResponse {
                    success: false,
                    message: "Cannot demote the last owner of a project".to_string(),
                });
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to count owners for project {}: {}", request.project_id, e);
                return HttpResponse::InternalServerError().json(UpdateMemberRoleResponse {
                    success: false,
                    message: "Failed to update member role".to_string(),
                });
            }
        }
    }

    let update_result = sqlx::query(
        "UPDATE UserAssociations_ SET role = ? WHERE user_id = ? AND project_id = ?",
    )
    .bind(role.as_str())
    .bind(member_user_id)
    .bind(request.project_id)
    .execute(pool.get_ref())
    .await;

    match update_result {
        Ok(_) => {
            info!(
                "Role of {} on project {} set to {}",
                request.user_name,
                request.project_id,
                role.as_str()
            );
            HttpResponse::Ok().json(UpdateMemberRoleResponse {
                success: true,
                message: "Member role updated successfully".to_string(),
            })
        }
        Err(e) => {
            error!(
                "Failed to update role of {} on project {}: {}",
                request.user_name, request.project_id, e
            );
            HttpResponse::InternalServerError().json(UpdateMemberRoleResponse {
                success: false,
                message: "Failed to update member role".to_string(),
            })
        }
    }
}

// Handler to remove a member from a project
pub async fn remove_member(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<RemoveMemberRequest>,
) -> impl Responder {
    if let Err(e) =
        guard::require_permission(pool.get_ref(), &req, request.project_id, Permission::ManageProject)
            .await
    {
        return guard::deny(e);
    }

    let current_result = sqlx::query_as::<_, (i32, String)>(
        "SELECT ua.user_id, ua.role
         FROM UserAssociations_ ua
         JOIN Users_ u ON ua.user_id = u.user_id
         WHERE ua.project_id = ? AND u.user_name = ?",
    )
    .bind(request.project_id)
    .bind(&request.user_name)
    .fetch_optional(pool.get_ref())
    .await;

    let (member_user_id, current_role) = match current_result {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!(
                "No association for {} on project {}",
                request.user_name, request.project_id
            );
            return HttpResponse::BadRequest().json(RemoveMemberResponse {
                success: false,
                message: "User is not a member of this project".to_string(),
            });
        }
        Err(e) => {
            error!("Failed to execute query: {}", e);
            return HttpResponse::InternalServerError().json(RemoveMemberResponse {
                success: false,
                message: "Failed to remove member".to_string(),
            });
        }
    };

    // The last owner cannot leave
    if current_role == ROLE_OWNER {
        match count_owners(pool.get_ref(), request.project_id).await {
            Ok(1) => {
                info!(
                    "Refusing to remove the last owner of project {}",
                    request.project_id
                );
                return HttpResponse::BadRequest().json(RemoveMemberResponse {
                    success: false,
                    message: "Cannot remove the last owner of a project".to_string(),
                });
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to count owners for project {}: {}", request.project_id, e);
                return HttpResponse::InternalServerError().json(RemoveMemberResponse {
                    success: false,
                    message: "Failed to remove member".to_string(),
                });
            }
        }
    }

    let delete_result =
        sqlx::query("DELETE FROM UserAssociations_ WHERE user_id = ? AND project_id = ?")
            .bind(member_user_id)
            .bind(request.project_id)
            .execute(pool.get_ref())
            .await;

    match delete_result {
        Ok(_) => {
            info!(
                "User {} removed from project {}",
                request.user_name, request.project_id
            );
            HttpResponse::Ok().json(RemoveMemberResponse {
                success: true,
                message: "Member removed successfully".to_string(),
            })
        }
        Err(e) => {
            error!(
                "Failed to remove {} from project {}: {}",
                request.user_name, request.project_id, e
            );
            HttpResponse::InternalServerError().json(RemoveMemberResponse {
                success: false,
                message: "Failed to remove member".to_string(),
            })
        }
    }
}
