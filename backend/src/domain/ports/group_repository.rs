//! Port abstraction for group persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Group, GroupId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by group repository adapters.
    pub enum GroupPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "group repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "group repository query failed: {message}",
        /// A unique index rejected the write.
        Duplicate { field: String } => "group with the same {field} already exists",
        /// The targeted group does not exist.
        Missing { id: String } => "group {id} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Insert a new group record.
    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError>;

    /// Fetch a group by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, GroupPersistenceError>;

    /// Fetch a group by its provisioned phone number.
    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<Group>, GroupPersistenceError>;

    /// Fetch every group whose id appears in `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[GroupId]) -> Result<Vec<Group>, GroupPersistenceError>;

    /// Assign a phone number to an existing group.
    async fn set_phone_number(
        &self,
        group_id: &GroupId,
        phone_number: &str,
    ) -> Result<(), GroupPersistenceError>;

    /// Append `user_id` to the group's member set unless already present.
    ///
    /// Returns `true` when the id was appended and `false` when the group
    /// already listed it.
    async fn add_user(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<bool, GroupPersistenceError>;

    /// Remove `user_id` from the group's member set. Absent ids are ignored.
    async fn remove_user(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<(), GroupPersistenceError>;
}
