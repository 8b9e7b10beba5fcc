//! Text processing for the concierge assistant
//!
//! This crate provides the pure text helpers the dialogue core depends on:
//! - **Validators**: email syntax and Nepali mobile number checks
//! - **Date Resolution**: free-text date phrases to calendar dates, anchored to "now"
//! - **Intent Detection**: fixed booking-trigger phrases
//!
//! # Example
//!
//! ```ignore
//! use concierge_text_processing::{resolve_date, validate_phone};
//!
//! let now = chrono::Local::now().naive_local();
//! assert!(validate_phone("+977 981-234-5678"));
//! let date = resolve_date("next monday", now);
//! ```

pub mod date_resolver;
pub mod intent;
pub mod validators;

mod error;

pub use error::{Result, TextProcessingError};

pub use date_resolver::{resolve_date, resolve_date_iso, ISO_DATE_FORMAT};
pub use intent::{BookingIntentDetector, DEFAULT_BOOKING_TRIGGERS};
pub use validators::{validate_email, validate_phone};
