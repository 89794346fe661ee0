//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all application data. List-valued
//! fields and subdocuments are stored as JSON text columns.

mod bids;
mod comments;
mod contractors;
mod employees;
mod leaves;
mod opportunities;
mod projects;
mod suppliers;
mod tasks;
mod teams;
mod users;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Current time as an RFC 3339 string, the canonical timestamp format on the wire.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Serialize a list-valued field for storage in a JSON text column.
pub(crate) fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

/// Parse a JSON text column back into a typed list; malformed data yields empty.
pub(crate) fn from_json<T: DeserializeOwned + Default>(value: Option<String>) -> T {
    value
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            clerk_id TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            team_id TEXT,
            employee_id TEXT,
            permissions TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            product_owner_id TEXT,
            project_manager_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            start_date TEXT,
            end_date TEXT,
            extended_date TEXT,
            location TEXT,
            status TEXT NOT NULL,
            manager_id TEXT,
            member_ids TEXT,
            attachments TEXT,
            material_requests TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL,
            priority TEXT NOT NULL,
            tags TEXT,
            start_date TEXT,
            due_date TEXT,
            points INTEGER,
            project_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            assignee_ids TEXT,
            attachments TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            task_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            text TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bids (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            contractor_id TEXT NOT NULL,
            price REAL NOT NULL,
            timeline TEXT,
            start_date TEXT,
            end_date TEXT,
            status TEXT NOT NULL,
            attachments TEXT,
            opportunity_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS opportunities (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            project_id TEXT NOT NULL,
            deadline TEXT,
            status TEXT NOT NULL,
            contractor_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contractors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            address TEXT,
            specialties TEXT,
            compliance_documents TEXT,
            project_history TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            address TEXT,
            materials TEXT,
            compliance_documents TEXT,
            order_history TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            permissions TEXT,
            email TEXT,
            phone TEXT,
            availability TEXT,
            work_history TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leaves (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            leave_type TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL,
            reason TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks(project_id);
        CREATE INDEX IF NOT EXISTS idx_comments_task_id ON comments(task_id);
        CREATE INDEX IF NOT EXISTS idx_bids_project_id ON bids(project_id);
        CREATE INDEX IF NOT EXISTS idx_bids_contractor_id ON bids(contractor_id);
        CREATE INDEX IF NOT EXISTS idx_opportunities_project_id ON opportunities(project_id);
        CREATE INDEX IF NOT EXISTS idx_leaves_employee_id ON leaves(employee_id);
        CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
