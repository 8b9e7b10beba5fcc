//! Session management
//!
//! One orchestrator and one dialogue session per conversation. Turns on the
//! same conversation are serialized by an async mutex; different
//! conversations never share state.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};

use concierge_agent::{Orchestrator, Session};

use crate::ServerError;

/// Orchestrator plus the session it drives
pub struct Conversation {
    pub orchestrator: Orchestrator,
    pub session: Session,
}

impl Conversation {
    pub async fn handle_turn(&mut self, utterance: &str) -> String {
        self.orchestrator.handle_turn(&mut self.session, utterance).await
    }
}

/// A hosted conversation
pub struct ManagedSession {
    pub id: String,
    conversation: Mutex<Conversation>,
    last_activity: RwLock<Instant>,
}

impl ManagedSession {
    fn new(id: String, orchestrator: Orchestrator) -> Self {
        let session = Session::with_id(id.clone());
        Self {
            id,
            conversation: Mutex::new(Conversation {
                orchestrator,
                session,
            }),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    /// Exclusive access for one turn or update
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, Conversation> {
        self.touch();
        self.conversation.lock().await
    }

    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<ManagedSession>>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(
            max_sessions,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        )
    }

    pub fn with_config(
        max_sessions: usize,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
            cleanup_interval,
        }
    }

    /// Periodically drop idle sessions until the returned sender sends `true`
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = manager.cleanup_expired();
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = manager.count(),
                                "Session cleanup"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    /// Register a new conversation driven by `orchestrator`
    pub fn create(&self, orchestrator: Orchestrator) -> Result<Arc<ManagedSession>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            self.cleanup_expired_internal(&mut sessions);

            if sessions.len() >= self.max_sessions {
                return Err(ServerError::Session("Max sessions reached".to_string()));
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(ManagedSession::new(id.clone(), orchestrator));
        sessions.insert(id.clone(), session.clone());

        tracing::info!(session_id = %id, "Created session");
        metrics::gauge!("concierge_active_sessions").set(sessions.len() as f64);

        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<ManagedSession>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session, returning whether it existed
    pub fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write();
        let removed = sessions.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Removed session");
            metrics::gauge!("concierge_active_sessions").set(sessions.len() as f64);
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Drop idle sessions, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions)
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<ManagedSession>>) -> usize {
        let timeout = self.session_timeout;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = !session.is_expired(timeout);
            if !keep {
                tracing::info!(session_id = %id, "Expired session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Sorted session ids
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}
