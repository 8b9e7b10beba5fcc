//! Per-conversation session state
//!
//! A session is owned by its host and passed into the orchestrator by
//! mutable reference each turn. Nothing here is shared across sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use concierge_core::{CollectedInfo, ConversationState, Turn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: String,
    state: ConversationState,
    info: CollectedInfo,
    history: Vec<Turn>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// New session with a random id
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: ConversationState::General,
            info: CollectedInfo::new(),
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn info(&self) -> &CollectedInfo {
        &self.info
    }

    /// Display-only transcript; routing never reads it
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn apply(&mut self, state: ConversationState, info: CollectedInfo) {
        self.state = state;
        self.info = info;
    }

    pub(crate) fn push(&mut self, turn: Turn) {
        self.history.push(turn);
    }

    /// Back to a fresh conversation, keeping the id
    pub fn reset(&mut self) {
        self.state = ConversationState::General;
        self.info.clear();
        self.history.clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{InfoField, TurnRole};

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert_eq!(session.state(), ConversationState::General);
        assert!(session.info().is_empty());
        assert!(session.history().is_empty());
        assert!(!session.id().is_empty());
    }

    #[test]
    fn test_reset_clears_everything_but_id() {
        let mut session = Session::with_id("abc");
        let mut info = CollectedInfo::new();
        info.set(InfoField::Name, "Jane");
        session.apply(ConversationState::CollectingInfo, info);
        session.push(Turn::user("hi"));

        session.reset();

        assert_eq!(session.id(), "abc");
        assert_eq!(session.state(), ConversationState::General);
        assert!(session.info().is_empty());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_history_order() {
        let mut session = Session::new();
        session.push(Turn::user("hello"));
        session.push(Turn::assistant("hi there"));

        let roles: Vec<TurnRole> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![TurnRole::User, TurnRole::Assistant]);
    }
}
