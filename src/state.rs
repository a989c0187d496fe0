use std::sync::Arc;

use crate::api::{BackendApi, BackendConfig, HttpBackendClient};
use crate::error::AppError;
use crate::session::SessionStore;

/// The application context handed to every flow: the backend seam plus the
/// session store. Built once at startup; nothing reaches for globals.
pub struct AppState {
    pub api: Arc<dyn BackendApi>,
    pub session: SessionStore,
}

impl AppState {
    /// Wires the real HTTP client from the environment and restores any
    /// persisted session.
    pub fn initialize() -> Result<Self, AppError> {
        let config = BackendConfig::new_from_env();
        let api: Arc<dyn BackendApi> = Arc::new(HttpBackendClient::new(config)?);
        Ok(AppState {
            api,
            session: SessionStore::open_from_env(),
        })
    }

    pub fn with_api(api: Arc<dyn BackendApi>, session: SessionStore) -> Self {
        AppState { api, session }
    }

    /// Ends the session: clears the store and its file.
    pub fn teardown(&mut self) -> Result<(), AppError> {
        self.session.logout()
    }
}
