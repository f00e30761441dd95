//! User data model.
//!
//! A [`UserDraft`] is the unsaved candidate assembled by inbound adapters; a
//! [`User`] is the persisted aggregate carrying its store-assigned identifier,
//! creation timestamp, credential and group memberships.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credentials::PasswordCredential;
use super::group::GroupId;

/// Validation errors for user identifiers and profile values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier was empty.
    EmptyId,
    /// Identifier was not a canonical UUID.
    InvalidId,
    /// Phone number contained characters other than digits, separators or a
    /// leading `+`.
    InvalidPhoneNumber,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::InvalidPhoneNumber => write!(
                f,
                "phone number may only contain digits, an optional leading '+', and separators",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalise a phone number for storage and lookup.
///
/// Surrounding whitespace, inner spaces, dashes, dots and parentheses are
/// dropped. A single leading `+` is kept. Blank input normalises to an empty
/// string so required-field checks can report it.
///
/// # Examples
/// ```
/// use backend::domain::normalize_phone_number;
///
/// assert_eq!(normalize_phone_number(" +1 (555) 123-4567 ").unwrap(), "+15551234567");
/// assert_eq!(normalize_phone_number("   ").unwrap(), "");
/// assert!(normalize_phone_number("555-CALL").is_err());
/// ```
pub fn normalize_phone_number(raw: &str) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };
    let mut normalized = String::with_capacity(trimmed.len());
    normalized.push_str(prefix);
    for c in rest.chars() {
        match c {
            '0'..='9' => normalized.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return Err(UserValidationError::InvalidPhoneNumber),
        }
    }
    if normalized == "+" {
        return Err(UserValidationError::InvalidPhoneNumber);
    }
    Ok(normalized)
}

/// Profile values supplied when a user registers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Unique login name.
    pub username: String,
    /// Informational given name.
    pub first_name: String,
    /// Informational family name.
    pub last_name: String,
    /// Unique, normalised phone number.
    pub phone_number: String,
}

/// Unsaved user candidate.
///
/// The credential starts unset and is filled by
/// [`UserService::set_credential`](crate::domain::UserService::set_credential).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    profile: UserProfile,
    credential: Option<PasswordCredential>,
}

impl UserDraft {
    /// Build a candidate without credential material.
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            credential: None,
        }
    }

    /// Candidate profile.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Credential material, once set.
    pub fn credential(&self) -> Option<&PasswordCredential> {
        self.credential.as_ref()
    }

    /// Replace the credential material.
    pub fn set_credential(&mut self, credential: PasswordCredential) {
        self.credential = Some(credential);
    }
}

/// Persisted application user.
///
/// ## Invariants
/// - `username` and `phone_number` are non-empty and unique across users.
/// - `credential` is never blank.
/// - `group_ids` holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    profile: UserProfile,
    credential: PasswordCredential,
    inserted_at: DateTime<Utc>,
    group_ids: Vec<GroupId>,
}

impl User {
    /// Assemble a user from stored components.
    pub fn new(
        id: UserId,
        profile: UserProfile,
        credential: PasswordCredential,
        inserted_at: DateTime<Utc>,
        group_ids: Vec<GroupId>,
    ) -> Self {
        Self {
            id,
            profile,
            credential,
            inserted_at,
            group_ids,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique login name.
    pub fn username(&self) -> &str {
        self.profile.username.as_str()
    }

    /// Given name.
    pub fn first_name(&self) -> &str {
        self.profile.first_name.as_str()
    }

    /// Family name.
    pub fn last_name(&self) -> &str {
        self.profile.last_name.as_str()
    }

    /// Normalised phone number.
    pub fn phone_number(&self) -> &str {
        self.profile.phone_number.as_str()
    }

    /// Stored credential material.
    pub fn credential(&self) -> &PasswordCredential {
        &self.credential
    }

    /// Creation timestamp.
    pub fn inserted_at(&self) -> DateTime<Utc> {
        self.inserted_at
    }

    /// Groups this user belongs to.
    pub fn group_ids(&self) -> &[GroupId] {
        &self.group_ids
    }

    /// Copy of this user with `group_id` added to its group set.
    #[must_use]
    pub fn with_group(mut self, group_id: GroupId) -> Self {
        if !self.group_ids.contains(&group_id) {
            self.group_ids.push(group_id);
        }
        self
    }
}
