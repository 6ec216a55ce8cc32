//! Slot Enumerator
//!
//! The service day is a fixed grid of half-hour slots from 11:00 to 21:30.
//! A slot is bookable for a party when at least one enabled table with enough
//! seats is not held at that exact date and time.

use chrono::{NaiveTime, Timelike};
use std::collections::{HashMap, HashSet};

use shared::models::DiningTable;

/// 首个时段
pub const FIRST_SLOT: NaiveTime = match NaiveTime::from_hms_opt(11, 0, 0) {
    Some(t) => t,
    None => panic!("invalid first slot"),
};

/// 最后时段
pub const LAST_SLOT: NaiveTime = match NaiveTime::from_hms_opt(21, 30, 0) {
    Some(t) => t,
    None => panic!("invalid last slot"),
};

/// Minutes between two slots
pub const SLOT_INTERVAL_MINUTES: u32 = 30;

/// The full grid, ascending
pub fn service_slots() -> Vec<NaiveTime> {
    let first = FIRST_SLOT.num_seconds_from_midnight();
    let last = LAST_SLOT.num_seconds_from_midnight();
    (first..=last)
        .step_by((SLOT_INTERVAL_MINUTES * 60) as usize)
        .filter_map(|secs| NaiveTime::from_num_seconds_from_midnight_opt(secs, 0))
        .collect()
}

/// Whether `time` lies exactly on the grid
pub fn is_service_slot(time: NaiveTime) -> bool {
    time >= FIRST_SLOT
        && time <= LAST_SLOT
        && time.nanosecond() == 0
        && (time.num_seconds_from_midnight() - FIRST_SLOT.num_seconds_from_midnight())
            % (SLOT_INTERVAL_MINUTES * 60)
            == 0
}

/// Filter the grid down to slots with a free fitting table.
///
/// `occupancy` maps a slot to the table ids held at that slot. Tables that
/// are disabled or too small are ignored regardless of occupancy.
pub fn available_slots(
    tables: &[DiningTable],
    occupancy: &HashMap<NaiveTime, HashSet<i64>>,
    party_size: i32,
) -> Vec<NaiveTime> {
    let fitting: Vec<i64> = tables
        .iter()
        .filter(|t| t.fits(party_size))
        .map(|t| t.id)
        .collect();
    if fitting.is_empty() {
        return Vec::new();
    }

    service_slots()
        .into_iter()
        .filter(|slot| match occupancy.get(slot) {
            Some(held) => fitting.iter().any(|id| !held.contains(id)),
            None => true,
        })
        .collect()
}
