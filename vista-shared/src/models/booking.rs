use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pii::Masked;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Accepted,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
        }
    }

    /// Pending bookings await an admin decision; everything else is history.
    pub fn is_pending(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "accepted" => Ok(BookingStatus::Accepted),
            "rejected" => Ok(BookingStatus::Rejected),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// A booking as listed by the backend. Only `id` and `status` decide where a
/// row goes; the rest is display data and may be absent or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub status: BookingStatus,
    #[serde(default)]
    pub destination_id: Option<i64>,
    #[serde(default)]
    pub venue_id: Option<i64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<Masked<String>>,
    #[serde(default)]
    pub booking_date: Option<NaiveDate>,
    #[serde(default)]
    pub venue_name: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
}

/// Body of `POST /api/bookings` from the public storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingRequest {
    pub destination_id: i64,
    pub venue_id: i64,
    pub customer_name: String,
    pub customer_email: Masked<String>,
    pub booking_date: NaiveDate,
}

/// Body of `PUT /api/bookings/:id`; only the status travels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusUpdate {
    pub status: BookingStatus,
}
