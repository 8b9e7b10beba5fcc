//! Booking persistence and confirmation delivery
//!
//! Provides the collaborators the booking tool writes to:
//! - Booking sinks: in-memory, or a spreadsheet row-append endpoint
//! - Notification senders: simulated (logged only), or an HTTP mail relay

pub mod bookings;
pub mod error;
pub mod notifications;

pub use bookings::{InMemoryBookingSink, SheetBookingSink, SheetConfig, SheetCredentials, StoredBooking};
pub use error::PersistenceError;
pub use notifications::{
    ConfirmationEmail, HttpEmailNotifier, MailRelayConfig, SentEmail, SimulatedEmailNotifier,
};
