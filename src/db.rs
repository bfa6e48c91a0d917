use std::path::Path;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{MedAssistError, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
pub type SqlitePool = Pool<SqliteAsyncConn>;
pub type SqlitePooledConn<'a> = PooledConnection<'a, SqliteAsyncConn>;

/// Opens a pooled connection to `sqlite_path`, creating the file and running
/// pending migrations first.
pub async fn open_pool(sqlite_path: &str) -> Result<SqlitePool> {
    ensure_parent_dir(sqlite_path)?;
    run_migrations(sqlite_path).await?;

    let manager = AsyncDieselConnectionManager::<SqliteAsyncConn>::new(sqlite_path);
    let pool: SqlitePool = Pool::builder()
        .build(manager)
        .await
        .map_err(|e| MedAssistError::Storage(e.to_string()))?;
    tracing::debug!(sqlite_path, "opened sqlite pool");
    Ok(pool)
}

pub async fn conn(pool: &SqlitePool) -> Result<SqlitePooledConn<'_>> {
    pool.get()
        .await
        .map_err(|e| MedAssistError::Storage(e.to_string()))
}

pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MedAssistError::Storage(e.to_string()))?;
    }
    Ok(())
}

async fn run_migrations(database_url: &str) -> Result<()> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = SqliteConnection::establish(&database_url)
            .map_err(|e| MedAssistError::Storage(e.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| MedAssistError::Storage(e.to_string()))?;
        Ok::<_, MedAssistError>(())
    })
    .await
    .map_err(|e| MedAssistError::Runtime(e.to_string()))??;
    Ok(())
}
