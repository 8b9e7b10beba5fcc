//! Booking dialogue state machine
//!
//! `transition` is a pure function of the current state, the collected
//! fields, the utterance, and the clock. It never calls a collaborator;
//! instead it returns an [`Action`] the orchestrator carries out.
//!
//! Routing order on every turn:
//! 1. Booking trigger phrase, in any state. Collected fields are left as is.
//! 2. `CollectingInfo`: fill the first missing field (name, phone, email, date).
//! 3. `General`: hand the utterance to the question-answering chain.

use chrono::NaiveDateTime;

use concierge_core::{BookingRecord, CollectedInfo, ConversationState, InfoField};
use concierge_text_processing::{
    resolve_date_iso, validate_email, validate_phone, BookingIntentDetector,
};

pub const ASK_NAME: &str = "I'd be happy to help you book an appointment! Let me collect some information from you. What's your full name?";
pub const REPEAT_NAME: &str = "Could you please tell me your full name?";
pub const ASK_PHONE: &str = "Great! Now, could you please provide your phone number?";
pub const INVALID_PHONE: &str = "Please provide a valid phone number (e.g., +9779XXXXXXXXX or a 10-digit number starting with 96/97/98).";
pub const ASK_EMAIL: &str = "Perfect! Now, please provide your email address.";
pub const INVALID_EMAIL: &str = "Please provide a valid email address (e.g., user@example.com).";
pub const ASK_DATE: &str = "Excellent! Finally, when would you like to schedule the appointment? (e.g., 'next Monday', 'tomorrow', or '2024-12-25')";
pub const INVALID_DATE: &str = "I couldn't understand the date. Please specify when you'd like to book (e.g., 'next Monday', 'tomorrow', or '2024-12-25').";

/// What the orchestrator must do after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send this text back
    Reply(String),
    /// All four fields collected; book and reply with the tool's result
    Book(BookingRecord),
    /// Not a booking turn; answer the question
    Answer,
}

/// Result of one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: ConversationState,
    pub info: CollectedInfo,
    pub action: Action,
}

impl Step {
    fn stay(state: ConversationState, info: CollectedInfo, reply: &str) -> Self {
        Self {
            state,
            info,
            action: Action::Reply(reply.to_string()),
        }
    }
}

/// Compute the next state, fields, and action for one utterance
pub fn transition(
    state: ConversationState,
    info: &CollectedInfo,
    utterance: &str,
    now: NaiveDateTime,
    detector: &BookingIntentDetector,
) -> Step {
    if let Some(phrase) = detector.matched_phrase(utterance) {
        tracing::debug!(phrase, previous = %state, "Booking trigger matched");
        return Step::stay(ConversationState::CollectingInfo, info.clone(), ASK_NAME);
    }

    match state {
        ConversationState::General => Step {
            state,
            info: info.clone(),
            action: Action::Answer,
        },
        ConversationState::CollectingInfo => fill_next(info, utterance, now),
    }
}

fn fill_next(info: &CollectedInfo, utterance: &str, now: NaiveDateTime) -> Step {
    let collecting = ConversationState::CollectingInfo;
    let value = utterance.trim();
    let mut next = info.clone();

    let Some(field) = info.next_missing() else {
        // Only reachable if a complete record was left behind; commit it.
        return commit(next);
    };

    match field {
        InfoField::Name => {
            if value.is_empty() {
                return Step::stay(collecting, next, REPEAT_NAME);
            }
            next.set(InfoField::Name, value);
            Step::stay(collecting, next, ASK_PHONE)
        }
        InfoField::Phone => {
            if !validate_phone(value) {
                return Step::stay(collecting, next, INVALID_PHONE);
            }
            next.set(InfoField::Phone, value);
            Step::stay(collecting, next, ASK_EMAIL)
        }
        InfoField::Email => {
            if !validate_email(value) {
                return Step::stay(collecting, next, INVALID_EMAIL);
            }
            next.set(InfoField::Email, value);
            Step::stay(collecting, next, ASK_DATE)
        }
        InfoField::AppointmentDate => match resolve_date_iso(value, now) {
            Some(date) => {
                next.set(InfoField::AppointmentDate, date);
                commit(next)
            }
            None => Step::stay(collecting, next, INVALID_DATE),
        },
    }
}

fn commit(info: CollectedInfo) -> Step {
    let action = match BookingRecord::from_info(&info) {
        Some(record) => Action::Book(record),
        None => Action::Answer,
    };
    Step {
        state: ConversationState::General,
        info: CollectedInfo::new(),
        action,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        // Monday
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn step(state: ConversationState, info: &CollectedInfo, utterance: &str) -> Step {
        transition(state, info, utterance, now(), &BookingIntentDetector::new())
    }

    fn info_with(fields: &[(InfoField, &str)]) -> CollectedInfo {
        let mut info = CollectedInfo::new();
        for (field, value) in fields {
            info.set(*field, *value);
        }
        info
    }

    #[test]
    fn test_general_routes_to_answer() {
        let s = step(ConversationState::General, &CollectedInfo::new(), "What is in the report?");
        assert_eq!(s.state, ConversationState::General);
        assert_eq!(s.action, Action::Answer);
    }

    #[test]
    fn test_trigger_enters_collection() {
        let s = step(ConversationState::General, &CollectedInfo::new(), "Please BOOK ME A CALL");
        assert_eq!(s.state, ConversationState::CollectingInfo);
        assert_eq!(s.action, Action::Reply(ASK_NAME.to_string()));
        assert!(s.info.is_empty());
    }

    #[test]
    fn test_trigger_mid_flow_keeps_fields() {
        let info = info_with(&[(InfoField::Name, "Jane")]);
        let s = step(ConversationState::CollectingInfo, &info, "book appointment");
        assert_eq!(s.state, ConversationState::CollectingInfo);
        assert_eq!(s.info, info);
        assert_eq!(s.action, Action::Reply(ASK_NAME.to_string()));
    }

    #[test]
    fn test_name_is_trimmed_and_unvalidated() {
        let s = step(ConversationState::CollectingInfo, &CollectedInfo::new(), "  Jane Doe ");
        assert_eq!(s.info.name.as_deref(), Some("Jane Doe"));
        assert_eq!(s.action, Action::Reply(ASK_PHONE.to_string()));
    }

    #[test]
    fn test_blank_name_is_asked_again() {
        let blank = step(ConversationState::CollectingInfo, &CollectedInfo::new(), "   ");
        assert_eq!(blank.state, ConversationState::CollectingInfo);
        assert!(blank.info.name.is_none());
        assert_eq!(blank.action, Action::Reply(REPEAT_NAME.to_string()));

        let named = step(blank.state, &blank.info, "Jane Doe");
        assert_eq!(named.info.name.as_deref(), Some("Jane Doe"));
        assert_eq!(named.action, Action::Reply(ASK_PHONE.to_string()));
    }

    #[test]
    fn test_invalid_phone_keeps_state() {
        let info = info_with(&[(InfoField::Name, "Jane")]);
        let s = step(ConversationState::CollectingInfo, &info, "123");
        assert_eq!(s.state, ConversationState::CollectingInfo);
        assert_eq!(s.info, info);
        assert_eq!(s.action, Action::Reply(INVALID_PHONE.to_string()));
    }

    #[test]
    fn test_valid_phone_asks_email() {
        let info = info_with(&[(InfoField::Name, "Jane")]);
        let s = step(ConversationState::CollectingInfo, &info, "+977 9812345678");
        assert_eq!(s.info.phone.as_deref(), Some("+977 9812345678"));
        assert_eq!(s.action, Action::Reply(ASK_EMAIL.to_string()));
    }

    #[test]
    fn test_email_validation() {
        let info = info_with(&[(InfoField::Name, "Jane"), (InfoField::Phone, "9812345678")]);

        let bad = step(ConversationState::CollectingInfo, &info, "jane at example");
        assert_eq!(bad.action, Action::Reply(INVALID_EMAIL.to_string()));
        assert!(bad.info.email.is_none());

        let good = step(ConversationState::CollectingInfo, &info, " jane@example.com ");
        assert_eq!(good.info.email.as_deref(), Some("jane@example.com"));
        assert_eq!(good.action, Action::Reply(ASK_DATE.to_string()));
    }

    #[test]
    fn test_unparseable_date_reprompts() {
        let info = info_with(&[
            (InfoField::Name, "Jane"),
            (InfoField::Phone, "9812345678"),
            (InfoField::Email, "jane@example.com"),
        ]);
        let s = step(ConversationState::CollectingInfo, &info, "whenever");
        assert_eq!(s.state, ConversationState::CollectingInfo);
        assert_eq!(s.action, Action::Reply(INVALID_DATE.to_string()));
    }

    #[test]
    fn test_date_commits_and_resets() {
        let info = info_with(&[
            (InfoField::Name, "Jane"),
            (InfoField::Phone, "9812345678"),
            (InfoField::Email, "jane@example.com"),
        ]);
        let s = step(ConversationState::CollectingInfo, &info, "next monday");

        assert_eq!(s.state, ConversationState::General);
        assert!(s.info.is_empty());
        assert_eq!(
            s.action,
            Action::Book(BookingRecord::new(
                "Jane",
                "9812345678",
                "jane@example.com",
                "2025-03-17"
            ))
        );
    }

    #[test]
    fn test_complete_leftover_is_committed() {
        let info = info_with(&[
            (InfoField::Name, "Jane"),
            (InfoField::Phone, "9812345678"),
            (InfoField::Email, "jane@example.com"),
            (InfoField::AppointmentDate, "2025-03-11"),
        ]);
        let s = step(ConversationState::CollectingInfo, &info, "anything");
        assert_eq!(s.state, ConversationState::General);
        assert!(matches!(s.action, Action::Book(_)));
    }
}
