use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Users_ (
            user_id INT AUTO_INCREMENT PRIMARY KEY,
            user_name VARCHAR(150) NOT NULL UNIQUE,
            user_email VARCHAR(254) NOT NULL,
            first_name VARCHAR(150) NOT NULL DEFAULT '',
            last_name VARCHAR(150) NOT NULL DEFAULT '',
            password_hash VARCHAR(100) NOT NULL,
            default_role VARCHAR(3) NOT NULL DEFAULT 'dev',
            is_active BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Sessions_ (
            session_id VARCHAR(36) PRIMARY KEY,
            user_id INT NOT NULL,
            expires_at TIMESTAMP NOT NULL,
            is_persistent BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Projects_ (
            project_id INT AUTO_INCREMENT PRIMARY KEY,
            title VARCHAR(200) NOT NULL,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS UserAssociations_ (
            association_id INT AUTO_INCREMENT PRIMARY KEY,
            user_id INT NOT NULL,
            project_id INT NOT NULL,
            role VARCHAR(3) NOT NULL,
            UNIQUE KEY uq_user_project (user_id, project_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Iterations_ (
            iteration_id INT AUTO_INCREMENT PRIMARY KEY,
            project_id INT NOT NULL,
            title VARCHAR(200) NOT NULL,
            description TEXT,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Stories_ (
            story_id INT AUTO_INCREMENT PRIMARY KEY,
            project_id INT NOT NULL,
            iteration_id INT NULL,
            bucket VARCHAR(10) NOT NULL DEFAULT 'icebox',
            title VARCHAR(200) NOT NULL,
            description TEXT,
            reason TEXT,
            test TEXT,
            hours INT NOT NULL,
            owner_user_id INT NULL,
            story_type VARCHAR(20) NOT NULL,
            status VARCHAR(20) NOT NULL,
            points INT NOT NULL DEFAULT 0,
            priority INT NOT NULL DEFAULT 0,
            pause BOOLEAN NOT NULL DEFAULT FALSE,
            created_at DATETIME NOT NULL,
            last_updated DATETIME NOT NULL,
            KEY idx_stories_project (project_id),
            KEY idx_stories_iteration (iteration_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS Tasks_ (
            task_id INT AUTO_INCREMENT PRIMARY KEY,
            story_id INT NOT NULL,
            description TEXT NOT NULL,
            KEY idx_tasks_story (story_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS StoryComments_ (
            comment_id INT AUTO_INCREMENT PRIMARY KEY,
            story_id INT NOT NULL,
            title VARCHAR(200) NOT NULL,
            comment TEXT NOT NULL,
            created_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS StoryAttachments_ (
            uuid VARCHAR(36) PRIMARY KEY,
            story_id INT NOT NULL,
            name VARCHAR(255) NOT NULL,
            file LONGBLOB NOT NULL,
            uploaded_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ReportSettings_ (
            project_id INT PRIMARY KEY,
            iteration_description BOOLEAN NOT NULL DEFAULT TRUE,
            iteration_duration BOOLEAN NOT NULL DEFAULT TRUE,
            story_description BOOLEAN NOT NULL DEFAULT TRUE,
            story_reason BOOLEAN NOT NULL DEFAULT TRUE,
            story_test BOOLEAN NOT NULL DEFAULT TRUE,
            story_task BOOLEAN NOT NULL DEFAULT TRUE,
            story_owner BOOLEAN NOT NULL DEFAULT TRUE,
            story_hours BOOLEAN NOT NULL DEFAULT TRUE,
            story_status BOOLEAN NOT NULL DEFAULT TRUE,
            story_points BOOLEAN NOT NULL DEFAULT TRUE,
            pie_chart BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    log::info!("Database migrations completed successfully");
    Ok(())
}
