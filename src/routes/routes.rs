use actix_web::web;

use super::admin::admin_handlers;
use super::attachment_view::attachment_handlers;
use super::auth::auth_handlers;
use super::comment_view::comment_handlers;
use super::iteration_view::iteration_handlers;
use super::project_view::project_handlers;
use super::report_view::report_handlers;
use super::story_view::story_handlers;
use super::task_view::task_handlers;

pub fn auth_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-auth")
            .route("", web::get().to(auth_handlers::auth_get))
            .route("/", web::get().to(auth_handlers::auth_get))
            .route("/check-username", web::post().to(auth_handlers::check_username))
            .route("/check-email", web::post().to(auth_handlers::check_email))
            .route("/register", web::post().to(auth_handlers::register))
            .route("/login", web::post().to(auth_handlers::login))
            .route("/auto-login", web::post().to(auth_handlers::auto_login))
            .route("/logout", web::post().to(auth_handlers::logout))
            .route("/profile", web::post().to(auth_handlers::get_profile))
            .route("/update-profile", web::post().to(auth_handlers::update_profile))
            .route("/change-password", web::post().to(auth_handlers::change_password)),
    );
}

pub fn admin_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route(
                "/delete/all/the/sessions/BECAREFUL",
                web::get().to(admin_handlers::session_reset),
            )
            .route("/activate-user", web::post().to(admin_handlers::activate_user)),
    );
}

pub fn project_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-projects")
            .route("", web::get().to(project_handlers::project_get))
            .route("/", web::get().to(project_handlers::project_get))
            .route("/list", web::post().to(project_handlers::list_projects))
            .route("/add", web::post().to(project_handlers::add_project))
            .route("/detail", web::post().to(project_handlers::get_project_detail))
            .route("/update", web::post().to(project_handlers::update_project))
            .route("/delete", web::post().to(project_handlers::delete_project))
            .route("/add-member", web::post().to(project_handlers::add_member))
            .route(
                "/update-member-role",
                web::post().to(project_handlers::update_member_role),
            )
            .route("/remove-member", web::post().to(project_handlers::remove_member)),
    );
}

pub fn iteration_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-iterations")
            .route("", web::get().to(iteration_handlers::iteration_get))
            .route("/", web::get().to(iteration_handlers::iteration_get))
            .route("/add", web::post().to(iteration_handlers::add_iteration))
            .route("/update", web::post().to(iteration_handlers::update_iteration))
            .route("/delete", web::post().to(iteration_handlers::delete_iteration)),
    );
}

pub fn story_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-stories")
            .route("", web::get().to(story_handlers::story_get))
            .route("/", web::get().to(story_handlers::story_get))
            .route("/add", web::post().to(story_handlers::add_story))
            .route("/update", web::post().to(story_handlers::update_story))
            .route("/delete", web::post().to(story_handlers::delete_story))
            .route(
                "/move-to-iteration",
                web::post().to(story_handlers::move_story_to_iteration),
            )
            .route(
                "/move-to-backlog",
                web::post().to(story_handlers::move_story_to_backlog),
            )
            .route(
                "/move-to-icebox",
                web::post().to(story_handlers::move_story_to_icebox),
            ),
    );
}

pub fn task_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-tasks")
            .route("/list", web::post().to(task_handlers::list_tasks))
            .route("/add", web::post().to(task_handlers::add_task))
            .route("/update", web::post().to(task_handlers::update_task))
            .route("/delete", web::post().to(task_handlers::delete_task)),
    );
}

pub fn comment_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-comments")
            .route("/list", web::post().to(comment_handlers::list_comments))
            .route("/add", web::post().to(comment_handlers::add_comment))
            .route("/update", web::post().to(comment_handlers::update_comment))
            .route("/delete", web::post().to(comment_handlers::delete_comment)),
    );
}

pub fn attachment_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-attachments")
            .route("/list", web::post().to(attachment_handlers::list_attachments))
            .route(
                "/upload/{story_id}",
                web::post().to(attachment_handlers::upload_attachment),
            )
            .route("/delete", web::post().to(attachment_handlers::delete_attachment))
            .route(
                "/download/{story_id}",
                web::get().to(attachment_handlers::download_attachment),
            ),
    );
}

pub fn report_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api-reports")
            .route("/settings", web::post().to(report_handlers::update_settings))
            .route("/get-settings", web::post().to(report_handlers::get_settings))
            .route(
                "/download/{project_id}/{iteration_id}",
                web::get().to(report_handlers::download_report),
            ),
    );
}
