//! Dining Table Repository

use super::RepoResult;
use shared::models::DiningTable;
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, table_number, capacity, location, is_available";

/// All tables, ordered by display number
pub async fn find_all(executor: impl SqliteExecutor<'_>) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table ORDER BY table_number"
    ))
    .fetch_all(executor)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(table)
}

/// Enabled tables large enough for the party, best fit first
/// (capacity ascending, then id ascending)
pub async fn find_candidates(
    executor: impl SqliteExecutor<'_>,
    party_size: i32,
) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table \
         WHERE is_available = 1 AND capacity >= ? \
         ORDER BY capacity, id"
    ))
    .bind(party_size)
    .fetch_all(executor)
    .await?;
    Ok(tables)
}

pub async fn insert(
    executor: impl SqliteExecutor<'_>,
    table_number: i32,
    capacity: i32,
    location: Option<&str>,
) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO dining_table (table_number, capacity, location) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(table_number)
    .bind(capacity)
    .bind(location)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Returns false when no table has this id
pub async fn set_availability(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    is_available: bool,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE dining_table SET is_available = ? WHERE id = ?")
        .bind(is_available)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}
