use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AppError;
use crate::models::Admin;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub token: Option<String>,
    pub admin: Option<Admin>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Cloneable handle; every clone sees the same state. Written through to the
/// session file when opened from one.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: RwLock<SessionState>,
    path: Option<PathBuf>,
    changes: watch::Sender<bool>,
}

impl SessionStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::with_state(SessionState::default(), None)
    }

    /// Restore the session persisted at `path`. A missing file starts signed
    /// out; an unreadable one is discarded with a warning.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let state = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<SessionState>(&bytes) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "discarding unreadable session file");
                    SessionState::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => SessionState::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(
            path = %path.display(),
            authenticated = state.is_authenticated(),
            "session restored"
        );
        Ok(Self::with_state(state, Some(path)))
    }

    fn with_state(state: SessionState, path: Option<PathBuf>) -> Self {
        let (changes, _) = watch::channel(state.is_authenticated());
        SessionStore {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                path,
                changes,
            }),
        }
    }

    /// Record a successful login.
    pub fn set_auth(&self, token: impl Into<String>, admin: Admin) -> Result<(), AppError> {
        let username = admin.username.clone();
        self.replace(SessionState {
            token: Some(token.into()),
            admin: Some(admin),
        })?;
        tracing::info!(%username, "signed in");
        Ok(())
    }

    /// Replace the stored profile of the signed-in admin, keeping the token.
    /// Returns `false` and changes nothing when signed out or when `admin`
    /// is a different account.
    pub fn refresh_identity(&self, admin: Admin) -> Result<bool, AppError> {
        let current = self.snapshot();
        let same_account = current.admin.as_ref().is_some_and(|a| a.id == admin.id);
        if !current.is_authenticated() || !same_account {
            tracing::debug!("identity refresh ignored");
            return Ok(false);
        }
        self.replace(SessionState {
            token: current.token,
            admin: Some(admin),
        })?;
        Ok(true)
    }

    /// Forget the token and identity (explicit logout or a 401).
    pub fn reset(&self) -> Result<(), AppError> {
        let was_authenticated = self.is_authenticated();
        self.replace(SessionState::default())?;
        if was_authenticated {
            tracing::info!("session cleared");
        }
        Ok(())
    }

    fn replace(&self, next: SessionState) -> Result<(), AppError> {
        let authenticated = next.is_authenticated();
        {
            let mut state = self.inner.state.write();
            *state = next;
        }
        self.inner.changes.send_replace(authenticated);
        match &self.inner.path {
            Some(path) => persist(path, &self.snapshot()),
            None => Ok(()),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.read().token.clone()
    }

    pub fn admin(&self) -> Option<Admin> {
        self.inner.state.read().admin.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().is_authenticated()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.read().clone()
    }

    /// Receiver that observes every authenticated/unauthenticated transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.changes.subscribe()
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }
}

fn persist(path: &Path, state: &SessionState) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let body = serde_json::to_vec_pretty(state).map_err(|e| AppError::Decode(e.to_string()))?;
    fs::write(path, body)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
