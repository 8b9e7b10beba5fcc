//! Booking confirmation delivery
//!
//! `SimulatedEmailNotifier` does not send anything; it logs the message and
//! keeps it for inspection. `HttpEmailNotifier` hands the message to an HTTP
//! mail relay that performs the SMTP (STARTTLS) submission.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_core::NotificationSender;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PersistenceError;

pub const CONFIRMATION_SUBJECT: &str = "Appointment Confirmation";

/// A rendered confirmation email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl ConfirmationEmail {
    pub fn for_booking(email: &str, name: &str, appointment_date: &str) -> Self {
        Self {
            to: email.to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            body: format!(
                "Hi {},\n\n✅ Your appointment is booked for {}.\n\nThank you!",
                name, appointment_date
            ),
        }
    }
}

/// A message accepted by the simulated notifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentEmail {
    pub message_id: Uuid,
    pub email: ConfirmationEmail,
    pub sent_at: DateTime<Utc>,
}

/// Logs confirmations instead of sending them
#[derive(Debug, Default)]
pub struct SimulatedEmailNotifier {
    sent: RwLock<Vec<SentEmail>>,
}

impl SimulatedEmailNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.read().clone()
    }
}

#[async_trait]
impl NotificationSender for SimulatedEmailNotifier {
    async fn notify(
        &self,
        email: &str,
        name: &str,
        appointment_date: &str,
    ) -> concierge_core::Result<()> {
        let message = SentEmail {
            message_id: Uuid::new_v4(),
            email: ConfirmationEmail::for_booking(email, name, appointment_date),
            sent_at: Utc::now(),
        };

        tracing::info!(
            to = %email,
            message_id = %message.message_id,
            "Confirmation email simulated"
        );
        tracing::debug!(body = %message.email.body, "Confirmation content (simulated)");

        self.sent.write().push(message);
        Ok(())
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

/// SMTP submission settings passed to the mail relay
#[derive(Debug, Clone)]
pub struct MailRelayConfig {
    /// Relay endpoint accepting JSON messages
    pub endpoint: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub timeout: Duration,
}

impl MailRelayConfig {
    fn validate(&self) -> Result<(), PersistenceError> {
        let missing: Vec<&str> = [
            ("endpoint", self.endpoint.as_str()),
            ("smtp_host", self.smtp_host.as_str()),
            ("sender_email", self.sender_email.as_str()),
            ("sender_password", self.sender_password.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PersistenceError::Configuration(format!(
                "mail relay is missing: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    smtp_host: &'a str,
    smtp_port: u16,
    starttls: bool,
    username: &'a str,
    password: &'a str,
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Sends confirmations through an HTTP mail relay
pub struct HttpEmailNotifier {
    client: Client,
    config: MailRelayConfig,
}

impl HttpEmailNotifier {
    pub fn new(config: MailRelayConfig) -> Result<Self, PersistenceError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PersistenceError::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn send(&self, email: &ConfirmationEmail) -> Result<(), PersistenceError> {
        let request = RelayRequest {
            smtp_host: &self.config.smtp_host,
            smtp_port: self.config.smtp_port,
            starttls: true,
            username: &self.config.sender_email,
            password: &self.config.sender_password,
            from: &self.config.sender_email,
            to: &email.to,
            subject: &email.subject,
            body: &email.body,
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

        tracing::info!(to = %email.to, "Confirmation email sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for HttpEmailNotifier {
    async fn notify(
        &self,
        email: &str,
        name: &str,
        appointment_date: &str,
    ) -> concierge_core::Result<()> {
        let message = ConfirmationEmail::for_booking(email, name, appointment_date);
        self.send(&message).await.map_err(|e| {
            tracing::warn!(error = %e, to = %email, "Failed to send confirmation email");
            e.into_notification_error()
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay_config(endpoint: &str) -> MailRelayConfig {
        MailRelayConfig {
            endpoint: endpoint.to_string(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            sender_email: "noreply@example.com".to_string(),
            sender_password: "secret".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_confirmation_format() {
        let email = ConfirmationEmail::for_booking("jane@example.com", "Jane Doe", "2025-01-02");
        assert_eq!(email.to, "jane@example.com");
        assert_eq!(email.subject, "Appointment Confirmation");
        assert_eq!(
            email.body,
            "Hi Jane Doe,\n\n✅ Your appointment is booked for 2025-01-02.\n\nThank you!"
        );
    }

    #[tokio::test]
    async fn test_simulated_notifier_keeps_messages() {
        let notifier = SimulatedEmailNotifier::new();
        notifier
            .notify("jane@example.com", "Jane Doe", "2025-01-02")
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email.to, "jane@example.com");
        assert!(sent[0].email.body.contains("2025-01-02"));
    }

    #[test]
    fn test_relay_config_reports_missing_fields() {
        let mut config = relay_config("http://localhost:8025/send");
        config.smtp_host.clear();
        config.sender_password.clear();

        match HttpEmailNotifier::new(config) {
            Err(PersistenceError::Configuration(msg)) => {
                assert!(msg.contains("smtp_host"));
                assert!(msg.contains("sender_password"));
            },
            _ => panic!("expected configuration error"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_notification_error() {
        let notifier = HttpEmailNotifier::new(relay_config("http://127.0.0.1:9/send")).unwrap();
        let err = notifier
            .notify("jane@example.com", "Jane", "2025-01-02")
            .await
            .unwrap_err();
        assert!(matches!(err, concierge_core::Error::Notification(_)));
    }
}
