//! Session authority: the per-client authentication state machine.
//!
//! A session is either [`SessionState::Anonymous`] or bound to exactly one
//! username. Login binds, logout unbinds, and a bound session cannot be bound
//! again until it is logged out. The transport holding the binding is the
//! [`SessionStore`] port; unreadable session values count as anonymous.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{LoginService, SessionStore};
use crate::domain::{Error, LoginCredentials};

/// Authentication state of one client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No identity is bound.
    Anonymous,
    /// The session is bound to this username.
    Authenticated(String),
}

impl SessionState {
    /// Bound username, if any.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(username) => Some(username.as_str()),
        }
    }
}

/// Issues, inspects and revokes session bindings.
#[derive(Clone)]
pub struct SessionAuthority {
    login: Arc<dyn LoginService>,
}

impl SessionAuthority {
    /// Build an authority that checks credentials through `login`.
    pub fn new(login: Arc<dyn LoginService>) -> Self {
        Self { login }
    }

    /// Authenticate `credentials` and bind the username to `session`.
    ///
    /// Fails with `already_authenticated` when the session is already bound;
    /// credential failures leave the session untouched.
    pub async fn login<S>(&self, session: &S, credentials: &LoginCredentials) -> Result<String, Error>
    where
        S: SessionStore + ?Sized,
    {
        if let SessionState::Authenticated(current) = Self::check_session(session) {
            return Err(Error::already_authenticated(format!(
                "session is already authenticated as {current}"
            )));
        }

        let user = self.login.authenticate(credentials).await?;
        session
            .bind_username(user.username())
            .map_err(|err| Error::internal(format!("failed to persist session: {err}")))?;
        info!(username = %user.username(), "session authenticated");
        Ok(user.username().to_owned())
    }

    /// Remove the binding from `session`.
    pub fn logout<S>(session: &S) -> Result<(), Error>
    where
        S: SessionStore + ?Sized,
    {
        let username = Self::require_authenticated(session)?;
        session.unbind();
        info!(%username, "session logged out");
        Ok(())
    }

    /// Read-only view of the session state.
    pub fn check_session<S>(session: &S) -> SessionState
    where
        S: SessionStore + ?Sized,
    {
        match session.bound_username() {
            Ok(Some(username)) => SessionState::Authenticated(username),
            Ok(None) => SessionState::Anonymous,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session value");
                SessionState::Anonymous
            }
        }
    }

    /// Bound username, or `unauthorized` when the session is anonymous.
    pub fn require_authenticated<S>(session: &S) -> Result<String, Error>
    where
        S: SessionStore + ?Sized,
    {
        match Self::check_session(session) {
            SessionState::Authenticated(username) => Ok(username),
            SessionState::Anonymous => Err(Error::unauthorized("login required")),
        }
    }
}
