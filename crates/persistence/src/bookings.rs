//! Booking sinks
//!
//! `InMemoryBookingSink` keeps records for the life of the process.
//! `SheetBookingSink` appends `[name, phone, email, date]` rows to a named
//! spreadsheet through an HTTP row-append endpoint, authenticated with a
//! base64-encoded service-account JSON.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use concierge_core::{BookingRecord, BookingSink};
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PersistenceError;

/// Env var holding the base64-encoded service-account JSON
pub const CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS_BASE64";
/// Env var holding the target sheet name
pub const SHEET_NAME_ENV: &str = "GOOGLE_SHEET_NAME";

/// A booking as stored by the in-memory sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredBooking {
    pub booking_id: Uuid,
    pub record: BookingRecord,
    pub created_at: DateTime<Utc>,
}

/// Keeps bookings in memory
#[derive(Debug, Default)]
pub struct InMemoryBookingSink {
    bookings: RwLock<Vec<StoredBooking>>,
}

impl InMemoryBookingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookings(&self) -> Vec<StoredBooking> {
        self.bookings.read().clone()
    }

    pub fn len(&self) -> usize {
        self.bookings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.read().is_empty()
    }
}

#[async_trait]
impl BookingSink for InMemoryBookingSink {
    async fn record(&self, booking: &BookingRecord) -> concierge_core::Result<()> {
        let stored = StoredBooking {
            booking_id: Uuid::new_v4(),
            record: booking.clone(),
            created_at: Utc::now(),
        };

        tracing::info!(
            booking_id = %stored.booking_id,
            date = %booking.appointment_date,
            "Booking stored in memory"
        );

        self.bookings.write().push(stored);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Service-account credentials
#[derive(Debug, Clone, Deserialize)]
pub struct SheetCredentials {
    pub client_email: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl SheetCredentials {
    /// Decode credentials from base64-encoded JSON
    pub fn from_base64(encoded: &str) -> Result<Self, PersistenceError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            PersistenceError::Configuration(format!("{} is not valid base64: {}", CREDENTIALS_ENV, e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            PersistenceError::Configuration(format!(
                "{} does not hold service-account JSON: {}",
                CREDENTIALS_ENV, e
            ))
        })
    }

    pub fn from_env() -> Result<Self, PersistenceError> {
        let encoded = std::env::var(CREDENTIALS_ENV)
            .map_err(|_| PersistenceError::Configuration(format!("Missing {}", CREDENTIALS_ENV)))?;
        Self::from_base64(&encoded)
    }
}

/// Spreadsheet sink configuration
#[derive(Debug, Clone)]
pub struct SheetConfig {
    /// Row-append endpoint
    pub endpoint: String,
    pub sheet_name: String,
    pub credentials: SheetCredentials,
    pub timeout: Duration,
}

impl SheetConfig {
    /// Read credentials and, when not given, the sheet name from the environment
    pub fn from_env(endpoint: impl Into<String>, sheet_name: Option<String>) -> Result<Self, PersistenceError> {
        let sheet_name = sheet_name
            .filter(|s| !s.trim().is_empty())
            .or_else(|| std::env::var(SHEET_NAME_ENV).ok())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PersistenceError::Configuration(format!("Missing {}", SHEET_NAME_ENV)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            sheet_name,
            credentials: SheetCredentials::from_env()?,
            timeout: Duration::from_secs(15),
        })
    }
}

#[derive(Debug, Serialize)]
struct AppendRowRequest<'a> {
    sheet: &'a str,
    client_email: &'a str,
    values: [&'a str; 4],
}

/// Appends booking rows to a spreadsheet
pub struct SheetBookingSink {
    client: Client,
    config: SheetConfig,
}

impl SheetBookingSink {
    pub fn new(config: SheetConfig) -> Result<Self, PersistenceError> {
        if config.endpoint.trim().is_empty() {
            return Err(PersistenceError::Configuration(
                "sheet endpoint must be set".to_string(),
            ));
        }
        if config.sheet_name.trim().is_empty() {
            return Err(PersistenceError::Configuration(format!("Missing {}", SHEET_NAME_ENV)));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PersistenceError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn append_row(&self, booking: &BookingRecord) -> Result<(), PersistenceError> {
        let request = AppendRowRequest {
            sheet: &self.config.sheet_name,
            client_email: &self.config.credentials.client_email,
            values: booking.to_row(),
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            sheet = %self.config.sheet_name,
            date = %booking.appointment_date,
            "Booking row appended"
        );
        Ok(())
    }
}

#[async_trait]
impl BookingSink for SheetBookingSink {
    async fn record(&self, booking: &BookingRecord) -> concierge_core::Result<()> {
        self.append_row(booking).await.map_err(|e| {
            tracing::warn!(error = %e, sheet = %self.config.sheet_name, "Failed to append booking row");
            e.into_sink_error()
        })
    }

    fn name(&self) -> &str {
        "sheet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BookingRecord {
        BookingRecord::new("Jane Doe", "9812345678", "jane@example.com", "2025-01-02")
    }

    fn credentials() -> SheetCredentials {
        SheetCredentials {
            client_email: "bot@project.iam.gserviceaccount.com".to_string(),
            project_id: None,
            private_key_id: None,
        }
    }

    #[tokio::test]
    async fn test_in_memory_sink_records() {
        let sink = InMemoryBookingSink::new();
        assert!(sink.is_empty());

        sink.record(&record()).await.unwrap();
        sink.record(&record()).await.unwrap();

        let stored = sink.bookings();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].record, record());
        assert_ne!(stored[0].booking_id, stored[1].booking_id);
    }

    #[test]
    fn test_credentials_from_base64() {
        let json = r#"{"client_email":"bot@project.iam.gserviceaccount.com","project_id":"p1"}"#;
        let encoded = STANDARD.encode(json);

        let creds = SheetCredentials::from_base64(&encoded).unwrap();
        assert_eq!(creds.client_email, "bot@project.iam.gserviceaccount.com");
        assert_eq!(creds.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_bad_credentials_are_configuration_errors() {
        assert!(matches!(
            SheetCredentials::from_base64("not base64!!"),
            Err(PersistenceError::Configuration(_))
        ));
        assert!(matches!(
            SheetCredentials::from_base64(&STANDARD.encode("{}")),
            Err(PersistenceError::Configuration(_))
        ));
    }

    #[test]
    fn test_sheet_sink_requires_name_and_endpoint() {
        let config = SheetConfig {
            endpoint: "http://localhost:8080/append".to_string(),
            sheet_name: " ".to_string(),
            credentials: credentials(),
            timeout: Duration::from_secs(1),
        };
        assert!(SheetBookingSink::new(config.clone()).is_err());

        let config = SheetConfig {
            endpoint: String::new(),
            sheet_name: "Bookings".to_string(),
            ..config
        };
        assert!(SheetBookingSink::new(config).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_sheet_is_sink_error() {
        let sink = SheetBookingSink::new(SheetConfig {
            endpoint: "http://127.0.0.1:9/append".to_string(),
            sheet_name: "Bookings".to_string(),
            credentials: credentials(),
            timeout: Duration::from_secs(2),
        })
        .unwrap();

        let err = sink.record(&record()).await.unwrap_err();
        assert!(matches!(err, concierge_core::Error::Sink(_)));
    }
}
