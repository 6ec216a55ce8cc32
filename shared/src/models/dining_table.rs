//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (桌台)
///
/// Tables are administered outside the booking flow; reservations only read
/// them. `is_available = false` takes a table out of assignment entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub table_number: i32,
    pub capacity: i32,
    /// Free-form tag: "window", "patio", "private"...
    pub location: Option<String>,
    pub is_available: bool,
}

impl DiningTable {
    /// Whether this table may seat `party_size` guests at all
    pub fn fits(&self, party_size: i32) -> bool {
        self.is_available && self.capacity >= party_size
    }
}

/// Toggle administrative availability payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAvailabilityUpdate {
    pub is_available: bool,
}
