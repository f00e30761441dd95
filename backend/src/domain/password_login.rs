//! Password-based [`LoginService`] backed by the user repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::credentials::CredentialHasher;
use crate::domain::ports::{LoginService, UserRepository};
use crate::domain::user_service::{PASSWORD_FIELD, map_user_persistence_error};
use crate::domain::{Error, LoginCredentials, User};

/// Checks a username/password pair against stored credential material.
pub struct PasswordLoginService<R: ?Sized> {
    repo: Arc<R>,
    hasher: CredentialHasher,
}

impl<R: ?Sized> PasswordLoginService<R> {
    /// Create a login service over `repo`.
    pub fn new(repo: Arc<R>, hasher: CredentialHasher) -> Self {
        Self { repo, hasher }
    }
}

#[async_trait]
impl<R> LoginService for PasswordLoginService<R>
where
    R: UserRepository + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let user = self
            .repo
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let stored = user.credential();
        if self
            .hasher
            .verify(credentials.password(), stored.salt(), stored.hash())
        {
            Ok(user)
        } else {
            warn!(username = %credentials.username(), "rejected login with wrong password");
            Err(Error::invalid_fields("invalid password", &[PASSWORD_FIELD]))
        }
    }
}
