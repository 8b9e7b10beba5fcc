//! Core traits and types for the concierge assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Session data model (conversation state, collected booking fields, turns)
//! - Collaborator traits (question answering, booking sink, notification sender)
//! - Error types

pub mod conversation;
pub mod error;
pub mod traits;

pub use conversation::{CollectedInfo, ConversationState, InfoField, Turn, TurnRole};
pub use error::{Error, Result};
pub use traits::{
    is_unknown, BookingRecord, BookingSink, NotificationSender, QuestionAnswerer,
    UNKNOWN_SENTINEL,
};
