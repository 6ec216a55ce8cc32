//! Table Assigner
//!
//! Best fit: the smallest enabled table that seats the party and is not held
//! at the requested slot. Equal capacities fall back to the lowest id.

use std::collections::HashSet;

use shared::models::DiningTable;

/// Pick the best-fit free table, or None when nothing fits
pub fn pick_best_fit(
    tables: &[DiningTable],
    occupied: &HashSet<i64>,
    party_size: i32,
) -> Option<i64> {
    tables
        .iter()
        .filter(|t| t.fits(party_size) && !occupied.contains(&t.id))
        .min_by_key(|t| (t.capacity, t.id))
        .map(|t| t.id)
}
