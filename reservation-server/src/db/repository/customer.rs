//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerInfo};
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str = "id, first_name, last_name, email, phone, created_at";

pub async fn find_by_email(
    executor: impl SqliteExecutor<'_>,
    email: &str,
) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customer WHERE email = ? LIMIT 1"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(customer)
}

/// Resolve a customer id by email, creating the customer on first sight.
///
/// An existing customer keeps its stored name and phone. `info.email` must
/// already be normalised by the caller.
pub async fn upsert_by_email(
    conn: &mut SqliteConnection,
    info: &CustomerInfo,
    now: i64,
) -> RepoResult<i64> {
    sqlx::query(
        "INSERT INTO customer (first_name, last_name, email, phone, created_at) \
         VALUES (?, ?, ?, ?, ?) ON CONFLICT(email) DO NOTHING",
    )
    .bind(&info.first_name)
    .bind(&info.last_name)
    .bind(&info.email)
    .bind(&info.phone)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    find_by_email(&mut *conn, &info.email)
        .await?
        .map(|customer| customer.id)
        .ok_or_else(|| RepoError::Database(format!("Failed to resolve customer {}", info.email)))
}
