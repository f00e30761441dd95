//! Cookie-session transport for the session authority.
//!
//! [`SessionContext`] wraps the Actix session and implements the domain
//! [`SessionStore`] port, so handlers hand it straight to
//! [`SessionAuthority`](crate::domain::SessionAuthority).

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::{SessionStore, SessionStoreError};

/// Session slot holding the bound username.
pub(crate) const USER_KEY: &str = "user";

/// Request-scoped handle on the client's cookie session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

impl SessionStore for SessionContext {
    fn bound_username(&self) -> Result<Option<String>, SessionStoreError> {
        self.0
            .get::<String>(USER_KEY)
            .map_err(|error| SessionStoreError::read(error.to_string()))
    }

    fn bind_username(&self, username: &str) -> Result<(), SessionStoreError> {
        self.0
            .insert(USER_KEY, username)
            .map_err(|error| SessionStoreError::write(error.to_string()))?;
        self.0.renew();
        Ok(())
    }

    fn unbind(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
