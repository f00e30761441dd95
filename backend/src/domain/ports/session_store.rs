//! Driven port for the per-client session slot holding the bound username.
//!
//! The HTTP adapter implements this over a signed, encrypted cookie session.
//! Binding rules (one username per session, no rebinding) live in
//! [`SessionAuthority`](crate::domain::SessionAuthority), not here.

use super::define_port_error;

define_port_error! {
    /// Errors raised by session transports.
    pub enum SessionStoreError {
        /// The stored value could not be decoded.
        Read { message: String } => "session read failed: {message}",
        /// The value could not be written back to the session.
        Write { message: String } => "session write failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait SessionStore {
    /// Username currently bound to the session, if any.
    fn bound_username(&self) -> Result<Option<String>, SessionStoreError>;

    /// Bind `username` to the session and mark it for persistence.
    fn bind_username(&self, username: &str) -> Result<(), SessionStoreError>;

    /// Drop the bound username and any other session state.
    fn unbind(&self);
}
