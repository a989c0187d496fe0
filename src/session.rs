use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::BackendApi;
use crate::error::AppError;
use crate::models::{LoginRequest, SessionUser};

pub const DEFAULT_SESSION_FILE: &str = ".coursemap-session.json";

/// Client-side session persistence: the authenticated user payload is kept
/// as JSON at a fixed path, restored on startup and removed on logout.
/// There is no token expiry or refresh; whatever the login endpoint
/// returned is trusted until the user logs out.
pub struct SessionStore {
    path: PathBuf,
    current: Option<SessionUser>,
}

impl SessionStore {
    /// Opens the store and restores a persisted session if one exists.
    /// A corrupt session file is discarded rather than treated as fatal.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match Self::read_file(&path) {
            Ok(user) => user,
            Err(err) => {
                warn!("discarding unreadable session file: {}", err);
                None
            }
        };
        SessionStore { path, current }
    }

    pub fn open_from_env() -> Self {
        let path = std::env::var("COURSEMAP_SESSION_FILE")
            .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
        Self::open(path)
    }

    fn read_file(path: &Path) -> Result<Option<SessionUser>, AppError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current.as_ref().is_some_and(SessionUser::is_admin)
    }

    /// Authenticates against the backend and persists the returned payload.
    /// Nothing is written when the credentials are rejected.
    pub async fn login(
        &mut self,
        api: &Arc<dyn BackendApi>,
        username: &str,
        password: &str,
    ) -> Result<SessionUser, AppError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let user = api.login(&req).await.map_err(|err| {
            info!("login rejected for {}: {}", username, err);
            AppError::validation("Invalid username or password")
        })?;
        fs::write(&self.path, serde_json::to_string(&user)?)?;
        self.current = Some(user.clone());
        Ok(user)
    }

    /// Clears the in-memory session and removes the persisted file.
    pub fn logout(&mut self) -> Result<(), AppError> {
        self.current = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
