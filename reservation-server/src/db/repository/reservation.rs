//! Reservation Repository
//!
//! Occupancy queries only count reservations whose status holds a table
//! (pending, confirmed).

use super::RepoResult;
use shared::models::{Reservation, ReservationDetail, ReservationStatus};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, customer_id, table_id, reservation_date, reservation_time, party_size, status, special_requests, created_at";

const DETAIL_SELECT: &str = "SELECT r.id AS reservation_id, r.reservation_date, r.reservation_time, \
     r.party_size, r.status, r.special_requests, r.created_at, \
     c.id AS customer_id, c.first_name, c.last_name, c.email, c.phone, \
     t.id AS table_id, t.table_number, t.capacity, t.location \
     FROM reservation r \
     JOIN customer c ON r.customer_id = c.id \
     LEFT JOIN dining_table t ON r.table_id = t.id";

/// Row to insert
#[derive(Debug, Clone)]
pub struct NewReservation<'a> {
    pub customer_id: i64,
    pub table_id: Option<i64>,
    pub reservation_date: &'a str,
    pub reservation_time: &'a str,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub special_requests: Option<&'a str>,
    pub created_at: i64,
}

/// Tables held at exactly (date, time), optionally ignoring one reservation
pub async fn occupied_table_ids(
    executor: impl SqliteExecutor<'_>,
    date: &str,
    time: &str,
    exclude_reservation: Option<i64>,
) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT table_id FROM reservation \
         WHERE reservation_date = ? AND reservation_time = ? \
         AND table_id IS NOT NULL \
         AND status IN (?, ?) \
         AND (? IS NULL OR id != ?)",
    )
    .bind(date)
    .bind(time)
    .bind(ReservationStatus::ACTIVE[0])
    .bind(ReservationStatus::ACTIVE[1])
    .bind(exclude_reservation)
    .bind(exclude_reservation)
    .fetch_all(executor)
    .await?;
    Ok(ids)
}

/// All held (time, table_id) pairs of a day, in one query
pub async fn occupancy_for_date(
    executor: impl SqliteExecutor<'_>,
    date: &str,
) -> RepoResult<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT reservation_time, table_id FROM reservation \
         WHERE reservation_date = ? \
         AND table_id IS NOT NULL \
         AND status IN (?, ?) \
         ORDER BY reservation_time",
    )
    .bind(date)
    .bind(ReservationStatus::ACTIVE[0])
    .bind(ReservationStatus::ACTIVE[1])
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn insert(executor: impl SqliteExecutor<'_>, new: &NewReservation<'_>) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO reservation \
         (customer_id, table_id, reservation_date, reservation_time, party_size, status, special_requests, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(new.customer_id)
    .bind(new.table_id)
    .bind(new.reservation_date)
    .bind(new.reservation_time)
    .bind(new.party_size)
    .bind(new.status)
    .bind(new.special_requests)
    .bind(new.created_at)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

pub async fn find_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Reservation>> {
    let reservation = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {COLUMNS} FROM reservation WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(reservation)
}

/// Reservation joined with customer and table display fields
pub async fn find_detail_by_id(
    executor: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<ReservationDetail>> {
    let detail = sqlx::query_as::<_, ReservationDetail>(&format!("{DETAIL_SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(detail)
}

/// Every reservation, newest slot first
pub async fn find_all_details(
    executor: impl SqliteExecutor<'_>,
) -> RepoResult<Vec<ReservationDetail>> {
    let details = sqlx::query_as::<_, ReservationDetail>(&format!(
        "{DETAIL_SELECT} ORDER BY r.reservation_date DESC, r.reservation_time DESC, r.id DESC"
    ))
    .fetch_all(executor)
    .await?;
    Ok(details)
}

/// Write back every mutable column of a reservation, provided the stored row
/// still equals `expected` (the version the caller planned from).
///
/// Returns false when the row is gone or was changed in between.
pub async fn update(
    executor: impl SqliteExecutor<'_>,
    reservation: &Reservation,
    expected: &Reservation,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE reservation SET table_id = ?, reservation_date = ?, reservation_time = ?, \
         party_size = ?, status = ?, special_requests = ? \
         WHERE id = ? AND status = ? AND table_id IS ? AND reservation_date = ? \
         AND reservation_time = ? AND party_size = ? AND special_requests IS ?",
    )
    .bind(reservation.table_id)
    .bind(&reservation.reservation_date)
    .bind(&reservation.reservation_time)
    .bind(reservation.party_size)
    .bind(reservation.status)
    .bind(&reservation.special_requests)
    .bind(expected.id)
    .bind(expected.status)
    .bind(expected.table_id)
    .bind(&expected.reservation_date)
    .bind(&expected.reservation_time)
    .bind(expected.party_size)
    .bind(&expected.special_requests)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_table(
    executor: impl SqliteExecutor<'_>,
    id: i64,
    table_id: Option<i64>,
) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE reservation SET table_id = ? WHERE id = ?")
        .bind(table_id)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(rows.rows_affected() > 0)
}
