//! Session lifecycle: created by a successful login, persisted between console invocations,
//! revalidated on restore, and torn down on logout or when the backend answers 401.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::{ApiError, PlacementClient, SessionClient};
use crate::workflows::directory::{CurrentUser, Role};

/// Bearer credential plus the identity it resolves to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: String,
    user: CurrentUser,
}

impl Session {
    pub fn new(token: impl Into<String>, user: CurrentUser) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("not logged in")]
    NotLoggedIn,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("cannot access session file {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Log in and resolve the identity in one step, as the dashboards expect.
pub async fn login(
    client: &PlacementClient,
    username: &str,
    password: &str,
) -> Result<Session, SessionError> {
    let token = match client.authenticate(username, password).await {
        Ok(token) => token,
        Err(ApiError::Unauthorized) | Err(ApiError::Rejected { .. }) => {
            return Err(SessionError::InvalidCredentials)
        }
        Err(other) => return Err(other.into()),
    };

    let user = client.current_user(&token).await?;
    info!(username = %user.username, role = %user.role, "logged in");
    Ok(Session::new(token, user))
}

/// File-backed session persistence for the console.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Store {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let encoded = serde_json::to_string_pretty(session).map_err(|source| {
            SessionError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, encoded).map_err(|source| SessionError::Store {
            path: self.path.clone(),
            source,
        })
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Store {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Remove the stored session and hand back what it held. A corrupt file is still removed.
    pub fn discard(&self) -> Result<Option<Session>, SessionError> {
        let stored = match self.load() {
            Ok(stored) => stored,
            Err(SessionError::Corrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "removing corrupt session file");
                None
            }
            Err(other) => return Err(other),
        };
        self.clear()?;
        Ok(stored)
    }

    /// Load the stored session and confirm the backend still honours it. A refused token
    /// (or an unreadable file) clears the store and yields `None`.
    pub async fn restore(
        &self,
        client: &PlacementClient,
    ) -> Result<Option<SessionClient>, SessionError> {
        let stored = match self.load() {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(SessionError::Corrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "discarding corrupt session file");
                self.clear()?;
                return Ok(None);
            }
            Err(other) => return Err(other),
        };

        match client.current_user(stored.token()).await {
            Ok(user) => {
                let session = Session::new(stored.token, user);
                Ok(Some(SessionClient::new(client.clone(), session)))
            }
            Err(ApiError::Unauthorized) => {
                warn!("stored session was refused, clearing it");
                self.clear()?;
                Ok(None)
            }
            Err(other) => Err(other.into()),
        }
    }
}
