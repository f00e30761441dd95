//! Group data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Group identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Generate a new random [`GroupId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unsaved group candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDraft {
    name: String,
}

impl GroupDraft {
    /// Candidate with the given name. Surrounding whitespace is trimmed.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_owned(),
        }
    }

    /// Candidate name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Persisted group.
///
/// ## Invariants
/// - `name` is non-empty and unique across groups.
/// - `phone_number`, once provisioned, is unique across groups.
/// - `user_ids` holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    name: String,
    phone_number: Option<String>,
    created_at: DateTime<Utc>,
    user_ids: Vec<super::UserId>,
}

impl Group {
    /// Assemble a group from stored components.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        phone_number: Option<String>,
        created_at: DateTime<Utc>,
        user_ids: Vec<super::UserId>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone_number,
            created_at,
            user_ids,
        }
    }

    /// Stable group identifier.
    pub fn id(&self) -> &GroupId {
        &self.id
    }

    /// Unique group name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Provisioned phone number, if any.
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Members of this group.
    pub fn user_ids(&self) -> &[super::UserId] {
        &self.user_ids
    }

    /// Copy of this group with `user_id` added to its member set.
    #[must_use]
    pub fn with_member(mut self, user_id: super::UserId) -> Self {
        if !self.user_ids.contains(&user_id) {
            self.user_ids.push(user_id);
        }
        self
    }

    /// Copy of this group with `user_id` removed from its member set.
    #[must_use]
    pub fn without_member(mut self, user_id: &super::UserId) -> Self {
        self.user_ids.retain(|id| id != user_id);
        self
    }

    /// Copy of this group with `phone_number` assigned.
    #[must_use]
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }
}
