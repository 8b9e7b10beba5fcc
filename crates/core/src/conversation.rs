//! Conversation types: routing state, collected booking fields and turns

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Routing state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Free-form questions go to retrieval, then reasoning
    #[default]
    General,
    /// Booking fields are being filled one per turn
    CollectingInfo,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::General => "general",
            ConversationState::CollectingInfo => "collecting_info",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Booking fields in the order they are collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoField {
    Name,
    Phone,
    Email,
    AppointmentDate,
}

impl InfoField {
    /// Collection order
    pub const ORDER: [InfoField; 4] = [
        InfoField::Name,
        InfoField::Phone,
        InfoField::Email,
        InfoField::AppointmentDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InfoField::Name => "name",
            InfoField::Phone => "phone",
            InfoField::Email => "email",
            InfoField::AppointmentDate => "appointment_date",
        }
    }
}

impl std::fmt::Display for InfoField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four booking fields gathered during slot-filling
///
/// Values are only written after validation (phone, email) or parsing
/// (date). The date is stored as an ISO `YYYY-MM-DD` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub appointment_date: Option<String>,
}

impl CollectedInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field, if set
    pub fn get(&self, field: InfoField) -> Option<&str> {
        match field {
            InfoField::Name => self.name.as_deref(),
            InfoField::Phone => self.phone.as_deref(),
            InfoField::Email => self.email.as_deref(),
            InfoField::AppointmentDate => self.appointment_date.as_deref(),
        }
    }

    /// Set a field
    pub fn set(&mut self, field: InfoField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            InfoField::Name => self.name = value,
            InfoField::Phone => self.phone = value,
            InfoField::Email => self.email = value,
            InfoField::AppointmentDate => self.appointment_date = value,
        }
    }

    /// First unset field in collection order
    pub fn next_missing(&self) -> Option<InfoField> {
        InfoField::ORDER
            .into_iter()
            .find(|field| self.get(*field).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.next_missing().is_none()
    }

    pub fn is_empty(&self) -> bool {
        InfoField::ORDER
            .into_iter()
            .all(|field| self.get(field).is_none())
    }

    /// Reset all fields to unset
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Role in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in the conversation
///
/// History is kept for display only; routing never reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_missing_follows_order() {
        let mut info = CollectedInfo::new();
        assert_eq!(info.next_missing(), Some(InfoField::Name));

        info.set(InfoField::Name, "Jane Doe");
        assert_eq!(info.next_missing(), Some(InfoField::Phone));

        // Filling out of order still reports the earliest gap
        info.set(InfoField::Email, "jane@example.com");
        assert_eq!(info.next_missing(), Some(InfoField::Phone));

        info.set(InfoField::Phone, "9812345678");
        info.set(InfoField::AppointmentDate, "2025-01-02");
        assert!(info.is_complete());
        assert_eq!(info.next_missing(), None);
    }

    #[test]
    fn test_clear_resets_all_fields() {
        let mut info = CollectedInfo::new();
        assert!(info.is_empty());

        info.set(InfoField::Name, "Jane");
        assert!(!info.is_empty());

        info.clear();
        assert!(info.is_empty());
        assert_eq!(info, CollectedInfo::default());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ConversationState::CollectingInfo).unwrap();
        assert_eq!(json, "\"collecting_info\"");
        assert_eq!(ConversationState::default(), ConversationState::General);
    }

    #[test]
    fn test_turn_creation() {
        let turn = Turn::user("book a call");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(Turn::assistant("ok").role.as_str(), "assistant");
    }
}
