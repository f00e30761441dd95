//! In-process store implementing both repository ports.
//!
//! Used when no database URL is configured and by the HTTP integration
//! tests. Unique lookups mirror the Postgres unique indexes so a racing
//! insert is still rejected with the offending field.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    GroupPersistenceError, GroupRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{Group, GroupId, User, UserId};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    groups: Vec<Group>,
}

/// Locked in-memory user and group collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // Writes are single assignments, so a poisoned guard still holds
        // consistent collections.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut store = self.lock();
        if store.users.iter().any(|u| u.username() == user.username()) {
            return Err(UserPersistenceError::duplicate("username"));
        }
        if store
            .users
            .iter()
            .any(|u| u.phone_number() == user.phone_number())
        {
            return Err(UserPersistenceError::duplicate("phoneNumber"));
        }
        store.users.push(user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.phone_number() == phone_number)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let store = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| store.users.iter().find(|u| u.id() == id).cloned())
            .collect())
    }

    async fn add_group(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
    ) -> Result<(), UserPersistenceError> {
        let mut store = self.lock();
        let slot = store
            .users
            .iter_mut()
            .find(|u| u.id() == user_id)
            .ok_or_else(|| UserPersistenceError::missing(user_id.to_string()))?;
        *slot = slot.clone().with_group(*group_id);
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError> {
        let mut store = self.lock();
        if store.groups.iter().any(|g| g.name() == group.name()) {
            return Err(GroupPersistenceError::duplicate("name"));
        }
        store.groups.push(group.clone());
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, GroupPersistenceError> {
        Ok(self
            .lock()
            .groups
            .iter()
            .find(|g| g.name() == name)
            .cloned())
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<Group>, GroupPersistenceError> {
        Ok(self
            .lock()
            .groups
            .iter()
            .find(|g| g.phone_number() == Some(phone_number))
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[GroupId]) -> Result<Vec<Group>, GroupPersistenceError> {
        let store = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| store.groups.iter().find(|g| g.id() == id).cloned())
            .collect())
    }

    async fn set_phone_number(
        &self,
        group_id: &GroupId,
        phone_number: &str,
    ) -> Result<(), GroupPersistenceError> {
        let mut store = self.lock();
        if store
            .groups
            .iter()
            .any(|g| g.id() != group_id && g.phone_number() == Some(phone_number))
        {
            return Err(GroupPersistenceError::duplicate("phoneNumber"));
        }
        let slot = store
            .groups
            .iter_mut()
            .find(|g| g.id() == group_id)
            .ok_or_else(|| GroupPersistenceError::missing(group_id.to_string()))?;
        *slot = slot.clone().with_phone_number(phone_number);
        Ok(())
    }

    async fn add_user(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<bool, GroupPersistenceError> {
        let mut store = self.lock();
        let slot = store
            .groups
            .iter_mut()
            .find(|g| g.id() == group_id)
            .ok_or_else(|| GroupPersistenceError::missing(group_id.to_string()))?;
        if slot.user_ids().contains(user_id) {
            return Ok(false);
        }
        *slot = slot.clone().with_member(*user_id);
        Ok(true)
    }

    async fn remove_user(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<(), GroupPersistenceError> {
        let mut store = self.lock();
        let slot = store
            .groups
            .iter_mut()
            .find(|g| g.id() == group_id)
            .ok_or_else(|| GroupPersistenceError::missing(group_id.to_string()))?;
        *slot = slot.clone().without_member(user_id);
        Ok(())
    }
}
