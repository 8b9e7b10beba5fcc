//! Dialogue orchestrator
//!
//! Runs one turn at a time against a caller-owned [`Session`]: the pure
//! transition decides what happens, this type performs the side effects
//! (booking, retrieval, reasoning) and records the transcript.

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

use concierge_core::{is_unknown, QuestionAnswerer, Turn};
use concierge_text_processing::BookingIntentDetector;
use concierge_tools::BookingTool;

use crate::dialogue::{transition, Action};
use crate::session::Session;

pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process your request.";

/// Wall-clock source used to anchor relative dates
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub struct Orchestrator {
    detector: BookingIntentDetector,
    booking: Arc<BookingTool>,
    retrieval: Option<Arc<dyn QuestionAnswerer>>,
    reasoning: Option<Arc<dyn QuestionAnswerer>>,
    clock: Clock,
}

impl Orchestrator {
    pub fn new(booking: Arc<BookingTool>) -> Self {
        Self {
            detector: BookingIntentDetector::new(),
            booking,
            retrieval: None,
            reasoning: None,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_detector(mut self, detector: BookingIntentDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_retrieval(mut self, retrieval: Arc<dyn QuestionAnswerer>) -> Self {
        self.retrieval = Some(retrieval);
        self
    }

    pub fn with_reasoning(mut self, reasoning: Arc<dyn QuestionAnswerer>) -> Self {
        self.reasoning = Some(reasoning);
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Swap the document answerer, e.g. after a new upload
    pub fn set_retrieval(&mut self, retrieval: Option<Arc<dyn QuestionAnswerer>>) {
        self.retrieval = retrieval;
    }

    pub fn has_documents(&self) -> bool {
        self.retrieval.is_some()
    }

    /// Handle one utterance and return the reply
    ///
    /// Never fails: collaborator errors become the reply for this turn and
    /// the state already computed by the transition is kept.
    pub async fn handle_turn(&self, session: &mut Session, utterance: &str) -> String {
        metrics::counter!("concierge_turns_total").increment(1);
        session.push(Turn::user(utterance));

        let step = transition(
            session.state(),
            session.info(),
            utterance,
            (self.clock)(),
            &self.detector,
        );
        tracing::debug!(
            session_id = %session.id(),
            from = %session.state(),
            to = %step.state,
            "Dialogue transition"
        );
        session.apply(step.state, step.info);

        let reply = match step.action {
            Action::Reply(text) => text,
            Action::Book(record) => {
                let result = self.booking.book_record(&record).await;
                let outcome = result.outcome.as_str();
                if result.outcome.is_recorded() {
                    metrics::counter!("concierge_bookings_completed_total", "outcome" => outcome)
                        .increment(1);
                } else {
                    metrics::counter!("concierge_bookings_degraded_total", "outcome" => outcome)
                        .increment(1);
                }
                tracing::info!(session_id = %session.id(), outcome, "Booking turn finished");
                result.message
            }
            Action::Answer => self.answer(utterance).await,
        };

        session.push(Turn::assistant(reply.as_str()));
        reply
    }

    /// Documents first, then general reasoning
    async fn answer(&self, question: &str) -> String {
        if let Some(retrieval) = &self.retrieval {
            match retrieval.answer(question).await {
                Ok(answer) if !is_unknown(&answer) => return answer,
                Ok(_) => tracing::debug!("Documents do not answer the question"),
                Err(e) => tracing::warn!(error = %e, "Retrieval failed, falling back"),
            }
            metrics::counter!("concierge_retrieval_fallbacks_total").increment(1);
        }

        let Some(reasoning) = &self.reasoning else {
            return FALLBACK_REPLY.to_string();
        };

        match reasoning.answer(question).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => FALLBACK_REPLY.to_string(),
            Err(e) => {
                tracing::warn!(answerer = reasoning.name(), error = %e, "Reasoning failed");
                format!("I encountered an error: {}", e)
            }
        }
    }
}
