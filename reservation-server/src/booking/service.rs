//! Booking Service
//!
//! Write paths that assign a table (create, and updates that move a booking)
//! hold the slot lock and run assignment plus write in one transaction. The
//! availability read path takes no lock.

use chrono::{NaiveDate, NaiveTime};
use sqlx::SqliteConnection;
use std::collections::{HashMap, HashSet};

use shared::models::{
    AvailableSlots, CustomerInfo, Reservation, ReservationCreate, ReservationCreated,
    ReservationDetail, ReservationStatus, ReservationUpdate,
};
use shared::util::now_millis;

use super::{SlotLocks, assigner, slots};
use crate::db::DbService;
use crate::db::repository::reservation::NewReservation;
use crate::db::repository::{RepoError, customer, dining_table, reservation};
use crate::utils::time::{format_date, format_time, parse_date, parse_slot_time, parse_time};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_PHONE_LEN, normalize_email, normalize_optional_text,
    validate_email, validate_optional_text, validate_party_size, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// 预订服务
#[derive(Debug, Clone)]
pub struct BookingService {
    db: DbService,
    locks: SlotLocks,
}

impl BookingService {
    pub fn new(db: DbService) -> Self {
        Self {
            db,
            locks: SlotLocks::new(),
        }
    }

    pub fn locks(&self) -> &SlotLocks {
        &self.locks
    }

    // ==================== Read path ====================

    /// Bookable slots of `date` for `party_size`, ascending.
    ///
    /// Advisory only: a slot listed here can be taken before the guest books.
    pub async fn available_slots(&self, date: &str, party_size: i32) -> AppResult<AvailableSlots> {
        validate_party_size(party_size)?;
        let day = format_date(parse_date(date)?);

        let tables = dining_table::find_candidates(&self.db.pool, party_size).await?;
        let mut occupancy: HashMap<NaiveTime, HashSet<i64>> = HashMap::new();
        if !tables.is_empty() {
            for (slot, table_id) in reservation::occupancy_for_date(&self.db.pool, &day).await? {
                match parse_time(&slot) {
                    Ok(time) => {
                        occupancy.entry(time).or_default().insert(table_id);
                    }
                    Err(_) => {
                        tracing::warn!(date = %day, time = %slot, "Skipping reservation with malformed time");
                    }
                }
            }
        }

        let available = slots::available_slots(&tables, &occupancy, party_size);
        Ok(AvailableSlots {
            date: day,
            party_size,
            available_slots: available.into_iter().map(format_time).collect(),
        })
    }

    /// Table the write path would pick right now for this request
    pub async fn assign(&self, date: &str, time: &str, party_size: i32) -> AppResult<Option<i64>> {
        validate_party_size(party_size)?;
        let date = parse_date(date)?;
        let time = parse_slot_time(time)?;
        let mut conn = self.db.pool.acquire().await.map_err(RepoError::from)?;
        assign_table(&mut conn, date, time, party_size, None).await
    }

    pub async fn list_reservations(&self) -> AppResult<Vec<ReservationDetail>> {
        Ok(reservation::find_all_details(&self.db.pool).await?)
    }

    pub async fn get_reservation(&self, id: i64) -> AppResult<ReservationDetail> {
        reservation::find_detail_by_id(&self.db.pool, id)
            .await?
            .ok_or_else(|| AppError::reservation_not_found(id))
    }

    // ==================== Write path ====================

    /// Book a table: upsert the customer, assign the best-fit table and
    /// insert the reservation as confirmed.
    ///
    /// No free table is not an error; the reservation is stored unassigned.
    pub async fn create_reservation(&self, req: ReservationCreate) -> AppResult<ReservationCreated> {
        let booking = NewBooking::validate(req)?;
        let day = format_date(booking.date);
        let slot = format_time(booking.time);

        let _guard = self.locks.lock(booking.date, booking.time).await;
        let mut tx = self.db.pool.begin().await.map_err(RepoError::from)?;

        // write first so the transaction holds the SQLite write lock before reading occupancy
        let customer_id = customer::upsert_by_email(&mut tx, &booking.customer, now_millis()).await?;
        let table_id =
            assign_table(&mut tx, booking.date, booking.time, booking.party_size, None).await?;

        let reservation_id = reservation::insert(
            &mut *tx,
            &NewReservation {
                customer_id,
                table_id,
                reservation_date: &day,
                reservation_time: &slot,
                party_size: booking.party_size,
                status: ReservationStatus::Confirmed,
                special_requests: booking.special_requests.as_deref(),
                created_at: now_millis(),
            },
        )
        .await
        .map_err(slot_conflict)?;

        tx.commit().await.map_err(RepoError::from)?;

        match table_id {
            Some(table_id) => tracing::info!(
                reservation_id,
                table_id,
                date = %day,
                time = %slot,
                party_size = booking.party_size,
                "Reservation created"
            ),
            None => tracing::warn!(
                reservation_id,
                date = %day,
                time = %slot,
                party_size = booking.party_size,
                "Reservation created without a table"
            ),
        }

        Ok(ReservationCreated {
            message: "Reservation created successfully".to_string(),
            reservation_id,
            table_id,
        })
    }

    /// Partial update. Moving an active booking to another slot or party
    /// size re-assigns its table.
    ///
    /// The write only lands if the stored row still equals the version the
    /// update was planned from. A row changed in between fails with
    /// `ReservationModified` and is left untouched.
    pub async fn update_reservation(
        &self,
        id: i64,
        update: ReservationUpdate,
    ) -> AppResult<Reservation> {
        if update.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        let changes = ParsedUpdate::parse(update)?;
        let current = reservation::find_by_id(&self.db.pool, id)
            .await?
            .ok_or_else(|| AppError::reservation_not_found(id))?;

        let plan = plan_update(&current, &changes)?;
        if !plan.changed {
            tracing::debug!(reservation_id = id, "Update is a no-op");
            return Ok(current);
        }

        let written = match plan.reassign {
            Some((date, time)) => self.move_reservation(&current, plan.next, date, time).await?,
            None => reservation::update(&self.db.pool, &plan.next, &current)
                .await?
                .then_some(plan.next),
        };
        let Some(next) = written else {
            return Err(self.stale_update(id).await);
        };

        if next.status != current.status {
            tracing::info!(
                reservation_id = id,
                from = %current.status,
                to = %next.status,
                "Reservation status changed"
            );
        }
        Ok(next)
    }

    /// Administrative status change
    pub async fn set_status(&self, id: i64, status: ReservationStatus) -> AppResult<Reservation> {
        self.update_reservation(
            id,
            ReservationUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Cancel; cancelling twice is a no-op
    pub async fn cancel(&self, id: i64) -> AppResult<Reservation> {
        self.set_status(id, ReservationStatus::Cancelled).await
    }

    /// Move `current` to (date, time) under that slot's lock.
    ///
    /// Returns None when the row no longer matches `current`.
    async fn move_reservation(
        &self,
        current: &Reservation,
        mut next: Reservation,
        date: NaiveDate,
        time: NaiveTime,
    ) -> AppResult<Option<Reservation>> {
        let _guard = self.locks.lock(date, time).await;
        let mut tx = self.db.pool.begin().await.map_err(RepoError::from)?;

        // release the old table first; this is also the transaction's first write
        next.table_id = None;
        if !reservation::update(&mut *tx, &next, current).await? {
            return Ok(None);
        }

        let table_id = assign_table(&mut tx, date, time, next.party_size, Some(next.id)).await?;
        if table_id.is_some() {
            reservation::set_table(&mut *tx, next.id, table_id)
                .await
                .map_err(slot_conflict)?;
        }
        tx.commit().await.map_err(RepoError::from)?;

        next.table_id = table_id;
        match table_id {
            Some(table_id) => tracing::info!(
                reservation_id = next.id,
                table_id,
                date = %next.reservation_date,
                time = %next.reservation_time,
                "Reservation moved"
            ),
            None => tracing::warn!(
                reservation_id = next.id,
                date = %next.reservation_date,
                time = %next.reservation_time,
                "Reservation moved without a table"
            ),
        }
        Ok(Some(next))
    }

    /// Error for a conditional write that matched no row
    async fn stale_update(&self, id: i64) -> AppError {
        match reservation::find_by_id(&self.db.pool, id).await {
            Ok(None) => AppError::reservation_not_found(id),
            Ok(Some(_)) => {
                tracing::warn!(reservation_id = id, "Reservation changed before the update was written");
                AppError::with_message(
                    ErrorCode::ReservationModified,
                    format!("Reservation {id} was changed by another request, please retry"),
                )
                .with_detail("reservation_id", id)
            }
            Err(e) => e.into(),
        }
    }
}

/// Best-fit free table for (date, time), seen from inside `conn`'s transaction
async fn assign_table(
    conn: &mut SqliteConnection,
    date: NaiveDate,
    time: NaiveTime,
    party_size: i32,
    exclude_reservation: Option<i64>,
) -> AppResult<Option<i64>> {
    let tables = dining_table::find_candidates(&mut *conn, party_size).await?;
    if tables.is_empty() {
        return Ok(None);
    }
    let occupied: HashSet<i64> = reservation::occupied_table_ids(
        &mut *conn,
        &format_date(date),
        &format_time(time),
        exclude_reservation,
    )
    .await?
    .into_iter()
    .collect();
    Ok(assigner::pick_best_fit(&tables, &occupied, party_size))
}

/// The partial unique index caught a double booking
fn slot_conflict(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::new(ErrorCode::SlotConflict),
        other => other.into(),
    }
}

/// Validated booking form
#[derive(Debug)]
struct NewBooking {
    customer: CustomerInfo,
    date: NaiveDate,
    time: NaiveTime,
    party_size: i32,
    special_requests: Option<String>,
}

impl NewBooking {
    fn validate(req: ReservationCreate) -> AppResult<Self> {
        validate_required_text(&req.first_name, "firstName", MAX_NAME_LEN)?;
        validate_required_text(&req.last_name, "lastName", MAX_NAME_LEN)?;
        validate_email(&req.email)?;
        validate_optional_text(&req.phone, "phone", MAX_PHONE_LEN)?;
        validate_optional_text(&req.special_requests, "specialRequests", MAX_NOTE_LEN)?;
        validate_party_size(req.party_size)?;
        let date = parse_date(&req.reservation_date)?;
        let time = parse_slot_time(&req.reservation_time)?;

        Ok(Self {
            customer: CustomerInfo {
                first_name: req.first_name.trim().to_string(),
                last_name: req.last_name.trim().to_string(),
                email: normalize_email(&req.email),
                phone: normalize_optional_text(req.phone),
            },
            date,
            time,
            party_size: req.party_size,
            special_requests: normalize_optional_text(req.special_requests),
        })
    }
}

/// Validated partial update
#[derive(Debug)]
struct ParsedUpdate {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    party_size: Option<i32>,
    status: Option<ReservationStatus>,
    /// `Some(None)` clears the field
    special_requests: Option<Option<String>>,
}

impl ParsedUpdate {
    fn parse(update: ReservationUpdate) -> AppResult<Self> {
        if let Some(party_size) = update.party_size {
            validate_party_size(party_size)?;
        }
        validate_optional_text(&update.special_requests, "specialRequests", MAX_NOTE_LEN)?;
        Ok(Self {
            date: update.reservation_date.as_deref().map(parse_date).transpose()?,
            time: update.reservation_time.as_deref().map(parse_slot_time).transpose()?,
            party_size: update.party_size,
            status: update.status,
            special_requests: update
                .special_requests
                .map(|s| normalize_optional_text(Some(s))),
        })
    }
}

#[derive(Debug)]
struct UpdatePlan {
    next: Reservation,
    /// New slot to assign a table in, when an active booking moves
    reassign: Option<(NaiveDate, NaiveTime)>,
    changed: bool,
}

fn plan_update(current: &Reservation, changes: &ParsedUpdate) -> AppResult<UpdatePlan> {
    let current_date = parse_date(&current.reservation_date)?;
    let current_time = parse_time(&current.reservation_time)?;

    let date = changes.date.unwrap_or(current_date);
    let time = changes.time.unwrap_or(current_time);
    let party_size = changes.party_size.unwrap_or(current.party_size);
    let status = changes.status.unwrap_or(current.status);
    let moved = date != current_date || time != current_time || party_size != current.party_size;

    if current.status.is_terminal() && (moved || changes.special_requests.is_some()) {
        return Err(AppError::with_message(
            ErrorCode::ReservationClosed,
            format!("Reservation {} is {} and can no longer be changed", current.id, current.status),
        )
        .with_detail("status", current.status.as_str()));
    }
    if !current.status.can_transition_to(status) {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            format!("Cannot change status from {} to {}", current.status, status),
        )
        .with_detail("from", current.status.as_str())
        .with_detail("to", status.as_str()));
    }

    let mut next = current.clone();
    next.reservation_date = format_date(date);
    next.reservation_time = format_time(time);
    next.party_size = party_size;
    next.status = status;
    if let Some(special_requests) = &changes.special_requests {
        next.special_requests = special_requests.clone();
    }

    let changed = moved
        || status != current.status
        || next.special_requests != current.special_requests;
    Ok(UpdatePlan {
        next,
        reassign: (moved && status.is_active()).then_some((date, time)),
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service_with(capacities: &[i32]) -> (BookingService, Vec<i64>) {
        let db = DbService::in_memory().await.unwrap();
        let mut ids = Vec::new();
        for (i, capacity) in capacities.iter().enumerate() {
            ids.push(
                dining_table::insert(&db.pool, i as i32 + 1, *capacity, None)
                    .await
                    .unwrap(),
            );
        }
        (BookingService::new(db), ids)
    }

    fn create_req(email: &str, party_size: i32) -> ReservationCreate {
        ReservationCreate {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            phone: None,
            reservation_date: "2024-06-01".into(),
            reservation_time: "18:00:00".into(),
            party_size,
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn test_assign_follows_occupancy() {
        let (svc, ids) = service_with(&[2, 4, 6]).await;
        assert_eq!(svc.assign("2024-06-01", "18:00:00", 3).await.unwrap(), Some(ids[1]));

        let created = svc.create_reservation(create_req("a@example.com", 4)).await.unwrap();
        assert_eq!(created.table_id, Some(ids[1]));
        assert_eq!(svc.assign("2024-06-01", "18:00", 3).await.unwrap(), Some(ids[2]));
        assert_eq!(svc.assign("2024-06-01", "18:30", 3).await.unwrap(), Some(ids[1]));
        assert_eq!(svc.assign("2024-06-01", "18:00:00", 10).await.unwrap(), None);
        assert_eq!(
            svc.assign("2024-06-01", "18:00:00", 0).await.unwrap_err().code,
            ErrorCode::InvalidPartySize
        );

        svc.cancel(created.reservation_id).await.unwrap();
        assert_eq!(svc.assign("2024-06-01", "18:00:00", 3).await.unwrap(), Some(ids[1]));
        assert!(svc.locks().is_empty());
    }

    #[tokio::test]
    async fn test_available_slots_uses_day_occupancy() {
        let (svc, _) = service_with(&[4]).await;
        svc.create_reservation(create_req("a@example.com", 2)).await.unwrap();

        let slots = svc.available_slots("2024-06-01", 4).await.unwrap();
        assert_eq!(slots.available_slots.len(), 21);
        assert!(!slots.available_slots.contains(&"18:00:00".to_string()));

        let other_day = svc.available_slots("2024-06-02", 4).await.unwrap();
        assert_eq!(other_day.available_slots.len(), 22);

        assert!(svc.available_slots("2024-06-01", 5).await.unwrap().available_slots.is_empty());
    }

    #[tokio::test]
    async fn test_move_planned_before_note_does_not_overwrite_it() {
        let (svc, _) = service_with(&[4, 4]).await;
        let created = svc.create_reservation(create_req("a@example.com", 2)).await.unwrap();
        let id = created.reservation_id;

        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let seven = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
        let guard = svc.locks().lock(day, seven).await;

        let mover = svc.clone();
        let moving = tokio::spawn(async move {
            mover
                .update_reservation(
                    id,
                    ReservationUpdate {
                        reservation_time: Some("19:00".into()),
                        ..Default::default()
                    },
                )
                .await
        });
        // let the move read the row and block on the 19:00 lock
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let noted = svc
            .update_reservation(
                id,
                ReservationUpdate {
                    special_requests: Some("nut allergy".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(noted.special_requests.as_deref(), Some("nut allergy"));

        drop(guard);
        let err = moving.await.unwrap().unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationModified);

        let stored = reservation::find_by_id(&svc.db.pool, id).await.unwrap().unwrap();
        assert_eq!(stored.reservation_time, "18:00:00");
        assert_eq!(stored.special_requests.as_deref(), Some("nut allergy"));
        assert_eq!(stored.table_id, created.table_id);

        // re-submitting against the fresh row moves it and keeps the note
        let moved = svc
            .update_reservation(
                id,
                ReservationUpdate {
                    reservation_time: Some("19:00".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.reservation_time, "19:00:00");
        assert_eq!(moved.special_requests.as_deref(), Some("nut allergy"));
        assert!(moved.table_id.is_some());
        assert!(svc.locks().is_empty());
    }

    #[tokio::test]
    async fn test_stale_status_write_cannot_restore_old_slot() {
        let (svc, ids) = service_with(&[4, 4]).await;
        let created = svc.create_reservation(create_req("a@example.com", 2)).await.unwrap();
        let id = created.reservation_id;
        let before = reservation::find_by_id(&svc.db.pool, id).await.unwrap().unwrap();

        svc.update_reservation(
            id,
            ReservationUpdate {
                reservation_time: Some("19:00".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // a completion planned from the 18:00 row must not put it back
        let mut stale = before.clone();
        stale.status = ReservationStatus::Completed;
        assert!(!reservation::update(&svc.db.pool, &stale, &before).await.unwrap());

        let done = svc.set_status(id, ReservationStatus::Completed).await.unwrap();
        assert_eq!(done.reservation_time, "19:00:00");
        assert_eq!(done.table_id, Some(ids[0]));
    }

    fn confirmed() -> Reservation {
        Reservation {
            id: 7,
            customer_id: 1,
            table_id: Some(3),
            reservation_date: "2024-06-01".into(),
            reservation_time: "18:00:00".into(),
            party_size: 4,
            status: ReservationStatus::Confirmed,
            special_requests: None,
            created_at: 0,
        }
    }

    fn parse(json: &str) -> ParsedUpdate {
        ParsedUpdate::parse(serde_json::from_str(json).unwrap()).unwrap()
    }

    #[test]
    fn test_plan_same_values_is_noop() {
        let plan = plan_update(
            &confirmed(),
            &parse(r#"{"reservationTime": "18:00", "partySize": 4, "status": "confirmed"}"#),
        )
        .unwrap();
        assert!(!plan.changed);
        assert!(plan.reassign.is_none());
    }

    #[test]
    fn test_plan_move_reassigns() {
        let plan = plan_update(&confirmed(), &parse(r#"{"reservationTime": "19:30"}"#)).unwrap();
        assert!(plan.changed);
        let (_, time) = plan.reassign.unwrap();
        assert_eq!(format_time(time), "19:30:00");
        assert_eq!(plan.next.reservation_time, "19:30:00");

        let plan = plan_update(&confirmed(), &parse(r#"{"partySize": 6}"#)).unwrap();
        assert!(plan.reassign.is_some());
    }

    #[test]
    fn test_plan_status_only_keeps_table() {
        let plan = plan_update(&confirmed(), &parse(r#"{"status": "completed"}"#)).unwrap();
        assert!(plan.changed);
        assert!(plan.reassign.is_none());
        assert_eq!(plan.next.table_id, Some(3));
        assert_eq!(plan.next.status, ReservationStatus::Completed);
    }

    #[test]
    fn test_plan_cancel_and_move_does_not_reassign() {
        let plan = plan_update(
            &confirmed(),
            &parse(r#"{"status": "cancelled", "reservationDate": "2024-06-02"}"#),
        )
        .unwrap();
        assert!(plan.reassign.is_none());
    }

    #[test]
    fn test_plan_rejects_illegal_transition() {
        let err = plan_update(&confirmed(), &parse(r#"{"status": "pending"}"#)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);
    }

    #[test]
    fn test_plan_terminal_is_closed() {
        let mut done = confirmed();
        done.status = ReservationStatus::Completed;

        let err = plan_update(&done, &parse(r#"{"partySize": 2}"#)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationClosed);
        let err = plan_update(&done, &parse(r#"{"specialRequests": "cake"}"#)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationClosed);
        let err = plan_update(&done, &parse(r#"{"status": "cancelled"}"#)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);

        let plan = plan_update(&done, &parse(r#"{"status": "completed"}"#)).unwrap();
        assert!(!plan.changed);
    }

    #[test]
    fn test_parse_update_validates_fields() {
        let bad_party: ReservationUpdate = serde_json::from_str(r#"{"partySize": 0}"#).unwrap();
        assert_eq!(
            ParsedUpdate::parse(bad_party).unwrap_err().code,
            ErrorCode::InvalidPartySize
        );
        let off_grid: ReservationUpdate =
            serde_json::from_str(r#"{"reservationTime": "22:00"}"#).unwrap();
        assert_eq!(
            ParsedUpdate::parse(off_grid).unwrap_err().code,
            ErrorCode::OutsideServiceHours
        );
        assert_eq!(
            parse(r#"{"specialRequests": "  "}"#).special_requests,
            Some(None)
        );
    }

    #[test]
    fn test_new_booking_normalises_input() {
        let booking = NewBooking::validate(ReservationCreate {
            first_name: " Ada ".into(),
            last_name: "Lovelace".into(),
            email: "ADA@Example.com".into(),
            phone: Some("".into()),
            reservation_date: "2024-06-01".into(),
            reservation_time: "18:00".into(),
            party_size: 2,
            special_requests: None,
        })
        .unwrap();
        assert_eq!(booking.customer.first_name, "Ada");
        assert_eq!(booking.customer.email, "ada@example.com");
        assert_eq!(booking.customer.phone, None);
        assert_eq!(format_time(booking.time), "18:00:00");
    }
}
