//! User registration and lookup.
//!
//! [`UserService`] owns the user aggregate's lifecycle: required-field and
//! uniqueness validation before insert, credential assignment on unsaved
//! candidates, and exact-match lookups.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use crate::domain::credentials::{CredentialError, CredentialHasher};
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Error, User, UserDraft, UserId};

/// Field names reported when required values are blank.
pub const USERNAME_FIELD: &str = "Username";
/// Field name reported when the phone number is blank or malformed.
pub const PHONE_NUMBER_FIELD: &str = "Phonenumber";
/// Field name reported for credential failures.
pub const PASSWORD_FIELD: &str = "Password";

/// User lifecycle service.
pub struct UserService<R: ?Sized> {
    repo: Arc<R>,
    hasher: CredentialHasher,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            hasher: self.hasher.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R: ?Sized> UserService<R> {
    /// Create a service over `repo`.
    pub fn new(repo: Arc<R>, hasher: CredentialHasher, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            hasher,
            clock,
        }
    }

    /// Credential hasher used for new passwords.
    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }
}

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::conflict_on(&field, format!("a user with this {field} already exists"))
        }
        UserPersistenceError::Missing { id } => Error::not_found(format!("user {id} not found")),
    }
}

fn map_credential_error(error: CredentialError) -> Error {
    match error {
        CredentialError::PolicyViolation { .. } => {
            Error::invalid_fields(error.to_string(), &[PASSWORD_FIELD])
        }
        CredentialError::InvalidParameters(_) | CredentialError::Hashing(_) => {
            Error::internal(error.to_string())
        }
    }
}

impl<R> UserService<R>
where
    R: UserRepository + ?Sized,
{
    /// Hash `plaintext` and attach the result to the unsaved candidate.
    ///
    /// Nothing is persisted.
    pub fn set_credential(&self, draft: &mut UserDraft, plaintext: &str) -> Result<(), Error> {
        let credential = self
            .hasher
            .hash_password(plaintext)
            .map_err(map_credential_error)?;
        draft.set_credential(credential);
        Ok(())
    }

    /// Validate and persist a new user.
    ///
    /// Checks run in order: blank required fields (all reported together),
    /// missing credential, username uniqueness, then phone number uniqueness.
    pub async fn create(&self, draft: UserDraft) -> Result<User, Error> {
        let profile = draft.profile();
        let mut missing = Vec::new();
        if profile.username.trim().is_empty() {
            missing.push(USERNAME_FIELD);
        }
        if profile.phone_number.trim().is_empty() {
            missing.push(PHONE_NUMBER_FIELD);
        }
        if !missing.is_empty() {
            return Err(Error::invalid_fields(
                "required fields must not be empty",
                &missing,
            ));
        }

        let credential = match draft.credential() {
            Some(credential) if !credential.is_blank() => credential.clone(),
            _ => {
                return Err(Error::invalid_fields(
                    "a password must be set before saving",
                    &[PASSWORD_FIELD],
                ));
            }
        };

        if self
            .repo
            .find_by_username(&profile.username)
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            debug!(username = %profile.username, "username already registered");
            return Err(Error::conflict_on("username", "username already taken"));
        }
        if self
            .repo
            .find_by_phone_number(&profile.phone_number)
            .await
            .map_err(map_user_persistence_error)?
            .is_some()
        {
            debug!("phone number already registered");
            return Err(Error::conflict_on(
                "phoneNumber",
                "phone number already registered",
            ));
        }

        let user = User::new(
            UserId::random(),
            profile.clone(),
            credential,
            self.clock.utc(),
            Vec::new(),
        );
        self.repo
            .insert(&user)
            .await
            .map_err(map_user_persistence_error)?;
        info!(user_id = %user.id(), username = %user.username(), "user created");
        Ok(user)
    }

    /// Set the credential from `plaintext`, then [`create`](Self::create).
    pub async fn register(&self, mut draft: UserDraft, plaintext: &str) -> Result<User, Error> {
        self.set_credential(&mut draft, plaintext)?;
        self.create(draft).await
    }

    /// Look up a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> Result<User, Error> {
        self.repo
            .find_by_username(username)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Look up a user by exact normalised phone number.
    pub async fn find_by_phone_number(&self, phone_number: &str) -> Result<User, Error> {
        self.repo
            .find_by_phone_number(phone_number)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
