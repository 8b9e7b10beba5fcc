//! Booking-intent detection
//!
//! Intent is a case-insensitive substring match against a fixed phrase
//! set. There is no scoring and no fuzzy matching.

use serde::{Deserialize, Serialize};

use crate::{Result, TextProcessingError};

/// Phrases that start the booking flow
pub const DEFAULT_BOOKING_TRIGGERS: [&str; 6] = [
    "call me",
    "book appointment",
    "schedule appointment",
    "book a call",
    "book me a call",
    "contact me",
];

/// Detects requests to book an appointment or be called back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingIntentDetector {
    phrases: Vec<String>,
}

impl BookingIntentDetector {
    pub fn new() -> Self {
        Self {
            phrases: DEFAULT_BOOKING_TRIGGERS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }

    /// Detector with a custom phrase set
    ///
    /// Phrases are lowercased and trimmed. Blank phrases are rejected since
    /// they would match every utterance.
    pub fn with_phrases<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if phrase.is_empty() {
                return Err(TextProcessingError::InvalidConfig(
                    "booking trigger phrase must not be blank".to_string(),
                ));
            }
            normalized.push(phrase);
        }
        if normalized.is_empty() {
            return Err(TextProcessingError::InvalidConfig(
                "at least one booking trigger phrase is required".to_string(),
            ));
        }
        Ok(Self { phrases: normalized })
    }

    /// The trigger phrase found in the utterance, if any
    pub fn matched_phrase(&self, utterance: &str) -> Option<&str> {
        let lowered = utterance.to_lowercase();
        self.phrases
            .iter()
            .find(|phrase| lowered.contains(phrase.as_str()))
            .map(String::as_str)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for BookingIntentDetector {
    fn default() -> Self {
        Self::new()
    }
}
