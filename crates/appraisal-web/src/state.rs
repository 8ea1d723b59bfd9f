//! Application state.

use std::sync::Arc;

use appraisal_client::{HttpPerformanceApi, PerformanceApi};
use appraisal_config::{PortalConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn PerformanceApi>,
    pub session: Arc<SessionConfig>,
}

impl AppState {
    pub fn new(api: Arc<dyn PerformanceApi>, session: SessionConfig) -> Self {
        Self {
            api,
            session: Arc::new(session),
        }
    }

    /// State backed by the HTTP client for the configured backend.
    pub fn from_config(config: &PortalConfig) -> Self {
        let api = HttpPerformanceApi::new(config.api.base_url.clone())
            .with_token(config.api.token.clone());
        Self::new(Arc::new(api), config.session.clone())
    }
}
