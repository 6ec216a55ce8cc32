//! Database Module
//!
//! Handles the SQLite connection pool, migrations and the default floor plan

pub mod repository;

use shared::AppError;
use shared::models::DiningTable;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Floor plan inserted into an empty database: (table_number, capacity, location)
const DEFAULT_FLOOR: &[(i32, i32, &str)] = &[
    (1, 2, "window"),
    (2, 2, "window"),
    (3, 2, "bar"),
    (4, 4, "main"),
    (5, 4, "main"),
    (6, 4, "main"),
    (7, 4, "patio"),
    (8, 6, "main"),
    (9, 6, "patio"),
    (10, 8, "private"),
];

/// Database service — owns a SQLite connection pool
#[derive(Clone, Debug)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database file with WAL mode and apply migrations
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Build connection options: WAL, foreign keys, normal sync
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!(path = %db_path, "Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database with migrations applied.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single long-lived connection.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::debug!("Database migrations applied");
        Ok(())
    }

    /// Insert the default floor plan when no table exists yet.
    ///
    /// Returns the number of tables inserted.
    pub async fn seed_default_floor(&self) -> Result<usize, AppError> {
        let existing: Vec<DiningTable> = repository::dining_table::find_all(&self.pool).await?;
        if !existing.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(repository::RepoError::from)?;
        for (number, capacity, location) in DEFAULT_FLOOR {
            repository::dining_table::insert(&mut *tx, *number, *capacity, Some(*location)).await?;
        }
        tx.commit().await.map_err(repository::RepoError::from)?;

        tracing::info!(tables = DEFAULT_FLOOR.len(), "Seeded default floor plan");
        Ok(DEFAULT_FLOOR.len())
    }

    /// Cheap liveness probe used by the health endpoint
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
