//! Rate cache database setup.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the SQLite rate cache and apply the schema.
///
/// Connections use a WAL journal, `synchronous = NORMAL` and a 5s busy timeout.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;

    info!("Rate cache database ready at {}", db_path);
    Ok(pool)
}

/// Execute every statement of `schema.sql`. All of them are idempotent.
async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let statements = include_str!("schema.sql")
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut applied = 0;
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
        applied += 1;
    }

    debug!("Applied {} schema statements", applied);
    Ok(())
}
