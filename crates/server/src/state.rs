//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use concierge_config::Settings;
use concierge_tools::ToolRegistry;

use crate::services::Services;
use crate::session::SessionManager;
use crate::ServerError;

const DEFAULT_MAX_SESSIONS: usize = 100;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    pub services: Arc<Services>,
    /// Tools callable over HTTP
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    /// Wire collaborators from settings
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let services = Services::from_settings(&config)?;
        Ok(Self::with_services(config, services))
    }

    /// State around pre-built collaborators
    pub fn with_services(config: Settings, services: Services) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionManager::new(DEFAULT_MAX_SESSIONS)),
            tools: services.tools.clone(),
            services: Arc::new(services),
        }
    }
}
