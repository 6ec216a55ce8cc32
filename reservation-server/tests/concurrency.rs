//! 并发写路径测试 - 文件数据库 + 多线程运行时
//!
//! Simultaneous bookings for one slot must never share a table.

use std::collections::HashSet;

use reservation_server::db::repository::{dining_table, reservation};
use reservation_server::{BookingService, DbService};
use shared::models::ReservationCreate;

const DATE: &str = "2024-06-01";
const TIME: &str = "18:00:00";

fn request(i: usize, party_size: i32) -> ReservationCreate {
    ReservationCreate {
        first_name: "Guest".into(),
        last_name: format!("{i}"),
        email: format!("guest{i}@example.com"),
        phone: None,
        reservation_date: DATE.into(),
        reservation_time: TIME.into(),
        party_size,
        special_requests: None,
    }
}

async fn file_db(dir: &tempfile::TempDir) -> DbService {
    let path = dir.path().join("restaurant.db");
    DbService::new(path.to_str().unwrap()).await.unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scenario_d_single_table_goes_to_exactly_one_booking() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    let table = dining_table::insert(&db.pool, 1, 4, None).await.unwrap();
    let booking = BookingService::new(db.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let booking = booking.clone();
            tokio::spawn(async move { booking.create_reservation(request(i, 4)).await })
        })
        .collect();

    let mut assigned = Vec::new();
    for handle in handles {
        let created = handle.await.unwrap().unwrap();
        if let Some(table_id) = created.table_id {
            assigned.push(table_id);
        }
    }

    assert_eq!(assigned, vec![table]);
    assert_eq!(
        reservation::occupied_table_ids(&db.pool, DATE, TIME, None)
            .await
            .unwrap(),
        vec![table]
    );
    assert_eq!(reservation::find_all_details(&db.pool).await.unwrap().len(), 8);
    assert!(booking.locks().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_and_cancels_never_double_book() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    for (number, capacity) in [(1, 2), (2, 4), (3, 4), (4, 6)] {
        dining_table::insert(&db.pool, number, capacity, None).await.unwrap();
    }
    let booking = BookingService::new(db.clone());

    // a first wave to have something to cancel
    let mut first_wave = Vec::new();
    for i in 0..4 {
        first_wave.push(booking.create_reservation(request(i, 2)).await.unwrap());
    }

    let mut handles = Vec::new();
    for i in 4..16 {
        let booking = booking.clone();
        handles.push(tokio::spawn(async move {
            booking
                .create_reservation(request(i, (i % 4) as i32 + 1))
                .await
                .map(|_| ())
        }));
    }
    for created in &first_wave[..2] {
        let booking = booking.clone();
        let id = created.reservation_id;
        handles.push(tokio::spawn(async move { booking.cancel(id).await.map(|_| ()) }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let held = reservation::occupied_table_ids(&db.pool, DATE, TIME, None)
        .await
        .unwrap();
    let unique: HashSet<i64> = held.iter().copied().collect();
    assert_eq!(held.len(), unique.len(), "a table is held twice: {held:?}");
    assert!(held.len() <= 4);
    assert!(booking.locks().is_empty());
}
