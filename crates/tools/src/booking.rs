//! Booking tool
//!
//! Persists a completed booking and sends the confirmation. Collaborator
//! failures never surface as errors; they become the reply text.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use concierge_core::{BookingRecord, BookingSink, NotificationSender};
use concierge_text_processing::{validate_email, validate_phone};

use crate::mcp::{required_str, InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};

pub const INVALID_EMAIL_REPLY: &str = "Invalid email format. Please provide a valid email address.";
pub const INVALID_PHONE_REPLY: &str = "Invalid phone number. Please provide a valid phone number.";
pub const NOTIFICATION_FAILED_REPLY: &str = "⚠️ Booked, but failed to send the confirmation email";

/// How a booking attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Confirmed,
    NotNotified,
    NotRecorded,
    Rejected,
}

impl BookingOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingOutcome::Confirmed => "confirmed",
            BookingOutcome::NotNotified => "not_notified",
            BookingOutcome::NotRecorded => "not_recorded",
            BookingOutcome::Rejected => "rejected",
        }
    }

    /// True when the booking row was written
    pub fn is_recorded(&self) -> bool {
        matches!(self, BookingOutcome::Confirmed | BookingOutcome::NotNotified)
    }
}

/// Reply text plus how the attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingResult {
    pub outcome: BookingOutcome,
    pub message: String,
}

pub struct BookingTool {
    sink: Arc<dyn BookingSink>,
    notifier: Arc<dyn NotificationSender>,
}

impl BookingTool {
    pub fn new(sink: Arc<dyn BookingSink>, notifier: Arc<dyn NotificationSender>) -> Self {
        Self { sink, notifier }
    }

    pub async fn book_record(&self, record: &BookingRecord) -> BookingResult {
        if !validate_email(&record.email) {
            return BookingResult {
                outcome: BookingOutcome::Rejected,
                message: INVALID_EMAIL_REPLY.to_string(),
            };
        }
        if !validate_phone(&record.phone) {
            return BookingResult {
                outcome: BookingOutcome::Rejected,
                message: INVALID_PHONE_REPLY.to_string(),
            };
        }

        if let Err(e) = self.sink.record(record).await {
            tracing::warn!(sink = self.sink.name(), error = %e, "Failed to record booking");
            return BookingResult {
                outcome: BookingOutcome::NotRecorded,
                message: format!("⚠️ Could not log the booking: {}", e),
            };
        }

        if let Err(e) = self
            .notifier
            .notify(&record.email, &record.name, &record.appointment_date)
            .await
        {
            tracing::warn!(
                notifier = self.notifier.name(),
                error = %e,
                "Booking recorded but confirmation failed"
            );
            return BookingResult {
                outcome: BookingOutcome::NotNotified,
                message: NOTIFICATION_FAILED_REPLY.to_string(),
            };
        }

        tracing::info!(
            sink = self.sink.name(),
            date = %record.appointment_date,
            "Appointment booked"
        );

        BookingResult {
            outcome: BookingOutcome::Confirmed,
            message: confirmation_text(record),
        }
    }
}

/// Success reply shown to the user
pub fn confirmation_text(record: &BookingRecord) -> String {
    format!(
        "✅ Appointment Successfully Booked!\n\n\
         Name: {}\n\
         Phone: {}\n\
         Email: {}\n\
         Date: {}\n\n\
         You will receive a confirmation email shortly.",
        record.name, record.phone, record.email, record.appointment_date
    )
}

#[async_trait]
impl Tool for BookingTool {
    fn name(&self) -> &str {
        "book_appointment"
    }

    fn description(&self) -> &str {
        "Book an appointment and send a confirmation email"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object()
                .property("name", PropertySchema::string("Full name"), true)
                .property("phone", PropertySchema::string("Phone number"), true)
                .property("email", PropertySchema::string("Email address"), true)
                .property(
                    "appointment_date",
                    PropertySchema::string("Appointment date (YYYY-MM-DD)"),
                    true,
                ),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let record = BookingRecord::new(
            required_str(&input, "name")?,
            required_str(&input, "phone")?,
            required_str(&input, "email")?,
            required_str(&input, "appointment_date")?,
        );

        let result = self.book_record(&record).await;
        Ok(match result.outcome {
            BookingOutcome::Confirmed | BookingOutcome::NotNotified => {
                ToolOutput::text(result.message)
            }
            BookingOutcome::NotRecorded | BookingOutcome::Rejected => {
                ToolOutput::error(result.message)
            }
        })
    }

    fn timeout_secs(&self) -> u64 {
        60
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{Error, Result};
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Default)]
    struct MockSink {
        fail: bool,
        rows: Mutex<Vec<BookingRecord>>,
    }

    #[async_trait]
    impl BookingSink for MockSink {
        async fn record(&self, booking: &BookingRecord) -> Result<()> {
            if self.fail {
                return Err(Error::Sink("sheet unavailable".into()));
            }
            self.rows.lock().push(booking.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        fail: bool,
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl NotificationSender for MockNotifier {
        async fn notify(&self, email: &str, name: &str, appointment_date: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Notification("smtp down".into()));
            }
            self.sent
                .lock()
                .push((email.into(), name.into(), appointment_date.into()));
            Ok(())
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn tool(sink: Arc<MockSink>, notifier: Arc<MockNotifier>) -> BookingTool {
        BookingTool::new(sink, notifier)
    }

    #[tokio::test]
    async fn test_successful_booking() {
        let sink = Arc::new(MockSink::default());
        let notifier = Arc::new(MockNotifier::default());
        let result = tool(sink.clone(), notifier.clone())
            .book_record(&BookingRecord::new("Jane Doe", "9812345678", "jane@example.com", "2025-03-11"))
            .await;
        let reply = result.message;

        assert_eq!(result.outcome, BookingOutcome::Confirmed);
        assert!(reply.starts_with("✅ Appointment Successfully Booked!"));
        assert!(reply.contains("Name: Jane Doe"));
        assert!(reply.contains("Date: 2025-03-11"));
        assert!(reply.ends_with("You will receive a confirmation email shortly."));
        assert_eq!(sink.rows.lock().len(), 1);
        assert_eq!(
            notifier.sent.lock()[0],
            ("jane@example.com".into(), "Jane Doe".into(), "2025-03-11".into())
        );
    }

    #[tokio::test]
    async fn test_invalid_email_skips_collaborators() {
        let sink = Arc::new(MockSink::default());
        let notifier = Arc::new(MockNotifier::default());
        let result = tool(sink.clone(), notifier.clone())
            .book_record(&BookingRecord::new("Jane", "9812345678", "jane@", "2025-03-11"))
            .await;

        assert_eq!(result.outcome, BookingOutcome::Rejected);
        assert_eq!(result.message, INVALID_EMAIL_REPLY);
        assert!(sink.rows.lock().is_empty());
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_phone_rejected() {
        let sink = Arc::new(MockSink::default());
        let result = tool(sink.clone(), Arc::new(MockNotifier::default()))
            .book_record(&BookingRecord::new("Jane", "12345", "jane@example.com", "2025-03-11"))
            .await;

        assert_eq!(result.outcome, BookingOutcome::Rejected);
        assert_eq!(result.message, INVALID_PHONE_REPLY);
        assert!(sink.rows.lock().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_skips_notification() {
        let sink = Arc::new(MockSink {
            fail: true,
            ..Default::default()
        });
        let notifier = Arc::new(MockNotifier::default());
        let result = tool(sink, notifier.clone())
            .book_record(&BookingRecord::new(
                "Jane",
                "9812345678",
                "jane@example.com",
                "2025-03-11",
            ))
            .await;

        assert_eq!(result.outcome, BookingOutcome::NotRecorded);
        assert!(result.message.starts_with("⚠️ Could not log the booking:"));
        assert!(result.message.contains("sheet unavailable"));
        assert!(notifier.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_notification_failure_is_distinct() {
        let sink = Arc::new(MockSink::default());
        let notifier = Arc::new(MockNotifier {
            fail: true,
            ..Default::default()
        });
        let result = tool(sink.clone(), notifier)
            .book_record(&BookingRecord::new(
                "Jane",
                "9812345678",
                "jane@example.com",
                "2025-03-11",
            ))
            .await;

        assert_eq!(result.outcome, BookingOutcome::NotNotified);
        assert!(result.outcome.is_recorded());
        assert_eq!(result.message, NOTIFICATION_FAILED_REPLY);
        assert_eq!(sink.rows.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_interface() {
        let sink = Arc::new(MockSink::default());
        let booking = tool(sink.clone(), Arc::new(MockNotifier::default()));

        assert_eq!(booking.schema().input_schema.required.len(), 4);

        let output = booking
            .execute(json!({
                "name": "Jane Doe",
                "phone": "+9779812345678",
                "email": "jane@example.com",
                "appointment_date": "2025-03-11"
            }))
            .await
            .unwrap();
        assert!(!output.is_error);
        assert!(output.as_text().contains("Phone: +9779812345678"));

        let err = booking.execute(json!({"name": "Jane"})).await.unwrap_err();
        assert_eq!(err.message, "phone is required");
    }
}
