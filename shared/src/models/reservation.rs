//! Reservation Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reservation status
///
/// Allowed transitions:
///
/// | From | To |
/// |------|----|
/// | pending | confirmed, cancelled |
/// | confirmed | completed, cancelled |
/// | cancelled | (terminal) |
/// | completed | (terminal) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    /// Statuses that hold a table; occupancy queries bind these
    pub const ACTIVE: [ReservationStatus; 2] = [Self::Pending, Self::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Whether a reservation in this status occupies its table
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Check the transition table. Re-applying the current status is allowed
    /// and treated as a no-op by callers.
    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub customer_id: i64,
    /// None when no table could be assigned
    pub table_id: Option<i64>,
    /// YYYY-MM-DD
    pub reservation_date: String,
    /// HH:MM:SS, one of the service slots
    pub reservation_time: String,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub created_at: i64,
}

/// Reservation joined with customer and table display fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationDetail {
    pub reservation_id: i64,
    pub reservation_date: String,
    pub reservation_time: String,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub created_at: i64,
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub table_id: Option<i64>,
    pub table_number: Option<i32>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
}

/// Create reservation payload (booking form)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub reservation_date: String,
    pub reservation_time: String,
    pub party_size: i32,
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationUpdate {
    #[serde(default)]
    pub reservation_date: Option<String>,
    #[serde(default)]
    pub reservation_time: Option<String>,
    #[serde(default)]
    pub party_size: Option<i32>,
    #[serde(default)]
    pub status: Option<ReservationStatus>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl ReservationUpdate {
    pub fn is_empty(&self) -> bool {
        self.reservation_date.is_none()
            && self.reservation_time.is_none()
            && self.party_size.is_none()
            && self.status.is_none()
            && self.special_requests.is_none()
    }
}

/// Response of a successful booking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreated {
    pub message: String,
    pub reservation_id: i64,
    pub table_id: Option<i64>,
}

/// Query string of the availability lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub date: String,
    pub party_size: i32,
}

/// Bookable slots of a day for a party size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlots {
    pub date: String,
    pub party_size: i32,
    pub available_slots: Vec<String>,
}
