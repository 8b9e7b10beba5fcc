//! Booking persistence and notification traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CollectedInfo, Result};

/// A completed booking, ready to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// ISO `YYYY-MM-DD`
    pub appointment_date: String,
}

impl BookingRecord {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        appointment_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            appointment_date: appointment_date.into(),
        }
    }

    /// Build a record from collected info, if every field is set
    pub fn from_info(info: &CollectedInfo) -> Option<Self> {
        Some(Self {
            name: info.name.clone()?,
            phone: info.phone.clone()?,
            email: info.email.clone()?,
            appointment_date: info.appointment_date.clone()?,
        })
    }

    /// Row layout used by tabular sinks
    pub fn to_row(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.phone.as_str(),
            self.email.as_str(),
            self.appointment_date.as_str(),
        ]
    }
}

/// Persists completed bookings
#[async_trait]
pub trait BookingSink: Send + Sync {
    async fn record(&self, booking: &BookingRecord) -> Result<()>;

    fn name(&self) -> &str;
}

/// Sends the booking confirmation to the user
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn notify(&self, email: &str, name: &str, appointment_date: &str) -> Result<()>;

    fn name(&self) -> &str;
}
