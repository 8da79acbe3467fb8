//! Database configuration for the ledger.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs.

use crate::entities::{AppState, NotificationLog};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

/// Used when `DATABASE_URL` is not set; `mode=rwc` creates the file on first run.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/site_ledger.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to `url` and makes sure every table exists.
pub async fn create_connection(url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {url}");
    let db = Database::connect(url).await?;
    create_tables(&db).await?;
    info!("Database ready");
    Ok(db)
}

/// Creates the `app_state` and `notification_log` tables if they are missing.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut app_state_table = schema.create_table_from_entity(AppState);
    app_state_table.if_not_exists();
    let mut notification_log_table = schema.create_table_from_entity(NotificationLog);
    notification_log_table.if_not_exists();

    db.execute(builder.build(&app_state_table)).await?;
    db.execute(builder.build(&notification_log_table)).await?;

    Ok(())
}
