//! Port abstraction for user persistence adapters and their errors.
//!
//! Adapters store users together with their credential material and the
//! ordered set of group identifiers the user belongs to. Lookups are exact
//! matches on the indexed fields only.

use async_trait::async_trait;

use crate::domain::{GroupId, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique index rejected the write.
        Duplicate { field: String } => "user with the same {field} already exists",
        /// The targeted user does not exist.
        Missing { id: String } => "user {id} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    ///
    /// Adapters backed by unique indexes report a collision as
    /// [`UserPersistenceError::Duplicate`] naming `username` or `phoneNumber`.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact normalised phone number.
    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user whose id appears in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError>;

    /// Append `group_id` to the user's group set unless already present.
    async fn add_group(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
    ) -> Result<(), UserPersistenceError>;
}
