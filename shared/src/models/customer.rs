//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity, keyed by email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: i64,
}

/// Contact details supplied with a booking
///
/// Used to upsert the customer: an existing email keeps its stored name and
/// phone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}
