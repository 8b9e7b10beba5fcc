//! End-to-end booking dialogue tests
//!
//! Drive the orchestrator turn by turn with recording collaborators and a
//! fixed clock.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use std::sync::Arc;

use concierge_agent::{dialogue, Orchestrator, Session};
use concierge_core::{
    BookingRecord, BookingSink, ConversationState, Error, NotificationSender, QuestionAnswerer,
    Result,
};
use concierge_tools::BookingTool;

#[derive(Default)]
struct RecordingSink {
    fail: bool,
    rows: Mutex<Vec<BookingRecord>>,
}

#[async_trait]
impl BookingSink for RecordingSink {
    async fn record(&self, booking: &BookingRecord) -> Result<()> {
        if self.fail {
            return Err(Error::Sink("quota exceeded".into()));
        }
        self.rows.lock().push(booking.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[derive(Default)]
struct RecordingNotifier {
    fail: bool,
    calls: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn notify(&self, email: &str, name: &str, appointment_date: &str) -> Result<()> {
        self.calls
            .lock()
            .push((email.into(), name.into(), appointment_date.into()));
        if self.fail {
            return Err(Error::Notification("smtp auth failed".into()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

struct CountingAnswerer {
    calls: Mutex<usize>,
}

#[async_trait]
impl QuestionAnswerer for CountingAnswerer {
    async fn answer(&self, _question: &str) -> Result<String> {
        *self.calls.lock() += 1;
        Ok("general answer".into())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Monday 2025-03-10, 14:30
fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

fn orchestrator(sink: Arc<RecordingSink>, notifier: Arc<RecordingNotifier>) -> Orchestrator {
    Orchestrator::new(Arc::new(BookingTool::new(sink, notifier))).with_clock(now)
}

#[tokio::test]
async fn test_full_booking_conversation() {
    let sink = Arc::new(RecordingSink::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let orch = orchestrator(sink.clone(), notifier.clone());
    let mut session = Session::new();

    let reply = orch.handle_turn(&mut session, "book me a call").await;
    assert_eq!(session.state(), ConversationState::CollectingInfo);
    assert_eq!(reply, dialogue::ASK_NAME);

    let reply = orch.handle_turn(&mut session, "Jane Doe").await;
    assert_eq!(session.info().name.as_deref(), Some("Jane Doe"));
    assert_eq!(reply, dialogue::ASK_PHONE);

    let reply = orch.handle_turn(&mut session, "123").await;
    assert_eq!(session.state(), ConversationState::CollectingInfo);
    assert_eq!(reply, dialogue::INVALID_PHONE);
    assert_eq!(session.info().name.as_deref(), Some("Jane Doe"));
    assert!(session.info().phone.is_none());

    let reply = orch.handle_turn(&mut session, "9812345678").await;
    assert_eq!(session.info().phone.as_deref(), Some("9812345678"));
    assert_eq!(reply, dialogue::ASK_EMAIL);

    let reply = orch.handle_turn(&mut session, "jane@example.com").await;
    assert_eq!(session.info().email.as_deref(), Some("jane@example.com"));
    assert_eq!(reply, dialogue::ASK_DATE);

    let reply = orch.handle_turn(&mut session, "tomorrow").await;
    assert_eq!(session.state(), ConversationState::General);
    assert!(session.info().is_empty());
    assert!(reply.starts_with("✅ Appointment Successfully Booked!"));
    assert!(reply.contains("Date: 2025-03-11"));

    assert_eq!(
        sink.rows.lock().as_slice(),
        &[BookingRecord::new(
            "Jane Doe",
            "9812345678",
            "jane@example.com",
            "2025-03-11"
        )]
    );
    assert_eq!(
        notifier.calls.lock().as_slice(),
        &[(
            "jane@example.com".to_string(),
            "Jane Doe".to_string(),
            "2025-03-11".to_string()
        )]
    );

    // Six user turns, six replies
    assert_eq!(session.history().len(), 12);
}

#[tokio::test]
async fn test_sink_failure_still_returns_to_general() {
    let sink = Arc::new(RecordingSink {
        fail: true,
        ..Default::default()
    });
    let notifier = Arc::new(RecordingNotifier::default());
    let orch = orchestrator(sink, notifier.clone());
    let mut session = Session::new();

    for utterance in ["contact me", "Ram", "+9779712345678", "ram@example.org"] {
        orch.handle_turn(&mut session, utterance).await;
    }
    let reply = orch.handle_turn(&mut session, "26th may").await;

    assert_eq!(
        reply,
        "⚠️ Could not log the booking: Booking sink error: quota exceeded"
    );
    assert_eq!(session.state(), ConversationState::General);
    assert!(session.info().is_empty());
    assert!(notifier.calls.lock().is_empty());
}

#[tokio::test]
async fn test_notification_failure_reply_is_distinct() {
    let sink = Arc::new(RecordingSink::default());
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let orch = orchestrator(sink.clone(), notifier);
    let mut session = Session::new();

    for utterance in ["schedule appointment", "Sita", "09612345678", "sita@example.com"] {
        orch.handle_turn(&mut session, utterance).await;
    }
    let reply = orch.handle_turn(&mut session, "2025-12-25").await;

    assert_eq!(reply, "⚠️ Booked, but failed to send the confirmation email");
    assert_eq!(sink.rows.lock()[0].appointment_date, "2025-12-25");
    assert_eq!(session.state(), ConversationState::General);
}

#[tokio::test]
async fn test_day_month_rolls_to_next_year() {
    let sink = Arc::new(RecordingSink::default());
    let orch = orchestrator(sink.clone(), Arc::new(RecordingNotifier::default()));
    let mut session = Session::new();

    for utterance in ["call me", "Hari", "9812345678", "hari@example.com", "feb 1st"] {
        orch.handle_turn(&mut session, utterance).await;
    }

    assert_eq!(sink.rows.lock()[0].appointment_date, "2026-02-01");
}

#[tokio::test]
async fn test_trigger_restarts_flow_mid_collection() {
    let sink = Arc::new(RecordingSink::default());
    let orch = orchestrator(sink, Arc::new(RecordingNotifier::default()));
    let mut session = Session::new();

    orch.handle_turn(&mut session, "book a call").await;
    orch.handle_turn(&mut session, "Jane").await;
    let reply = orch.handle_turn(&mut session, "actually, book appointment").await;

    assert_eq!(reply, dialogue::ASK_NAME);
    assert_eq!(session.state(), ConversationState::CollectingInfo);
    // Fields survive; the next turn still fills the phone
    assert_eq!(session.info().name.as_deref(), Some("Jane"));
    let reply = orch.handle_turn(&mut session, "9812345678").await;
    assert_eq!(reply, dialogue::ASK_EMAIL);
}

#[tokio::test]
async fn test_general_turns_reach_reasoning_after_booking() {
    let answerer = Arc::new(CountingAnswerer {
        calls: Mutex::new(0),
    });
    let orch = orchestrator(
        Arc::new(RecordingSink::default()),
        Arc::new(RecordingNotifier::default()),
    )
    .with_reasoning(answerer.clone());
    let mut session = Session::new();

    for utterance in ["call me", "Jane", "9812345678", "jane@example.com", "today"] {
        orch.handle_turn(&mut session, utterance).await;
    }
    assert_eq!(*answerer.calls.lock(), 0);

    let reply = orch.handle_turn(&mut session, "what can you do?").await;
    assert_eq!(reply, "general answer");
    assert_eq!(*answerer.calls.lock(), 1);
}

#[tokio::test]
async fn test_reset_abandons_booking() {
    let orch = orchestrator(
        Arc::new(RecordingSink::default()),
        Arc::new(RecordingNotifier::default()),
    );
    let mut session = Session::new();

    orch.handle_turn(&mut session, "call me").await;
    orch.handle_turn(&mut session, "Jane").await;
    session.reset();

    assert_eq!(session.state(), ConversationState::General);
    assert!(session.info().is_empty());
    assert!(session.history().is_empty());
}
