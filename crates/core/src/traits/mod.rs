//! Collaborator traits for the dialogue core
//!
//! ```text
//! Question answering:
//!   - QuestionAnswerer: retrieval answerer and reasoning agent, tried in priority order
//!
//! Booking:
//!   - BookingSink: persists a completed booking record
//!   - NotificationSender: confirms the booking to the user
//! ```

mod answerer;
mod booking;

pub use answerer::{is_unknown, QuestionAnswerer, UNKNOWN_SENTINEL};
pub use booking::{BookingRecord, BookingSink, NotificationSender};
