//! Row types mapping the Diesel schema to domain aggregates.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::credentials::PasswordCredential;
use crate::domain::{Group, GroupId, User, UserId, UserProfile};

use super::schema::{groups, users};

/// Full `users` row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub password_hash: String,
    pub password_salt: String,
    pub inserted_at: DateTime<Utc>,
    pub group_ids: Vec<Uuid>,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username().to_owned(),
            first_name: user.first_name().to_owned(),
            last_name: user.last_name().to_owned(),
            phone_number: user.phone_number().to_owned(),
            password_hash: user.credential().hash().to_owned(),
            password_salt: user.credential().salt().to_owned(),
            inserted_at: user.inserted_at(),
            group_ids: user.group_ids().iter().map(|id| *id.as_uuid()).collect(),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self::new(
            UserId::from_uuid(row.id),
            UserProfile {
                username: row.username,
                first_name: row.first_name,
                last_name: row.last_name,
                phone_number: row.phone_number,
            },
            PasswordCredential::new(row.password_hash, row.password_salt),
            row.inserted_at,
            row.group_ids.into_iter().map(GroupId::from_uuid).collect(),
        )
    }
}

/// Full `groups` row, used for both reads and inserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user_ids: Vec<Uuid>,
}

impl From<&Group> for GroupRow {
    fn from(group: &Group) -> Self {
        Self {
            id: *group.id().as_uuid(),
            name: group.name().to_owned(),
            phone_number: group.phone_number().map(str::to_owned),
            created_at: group.created_at(),
            user_ids: group.user_ids().iter().map(|id| *id.as_uuid()).collect(),
        }
    }
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Self::new(
            GroupId::from_uuid(row.id),
            row.name,
            row.phone_number,
            row.created_at,
            row.user_ids.into_iter().map(UserId::from_uuid).collect(),
        )
    }
}

/// Reorder `rows` to follow `ids`, dropping ids with no row.
pub(crate) fn order_by_ids<T, K>(rows: Vec<T>, ids: &[Uuid], key: K) -> Vec<T>
where
    K: Fn(&T) -> Uuid,
{
    let mut slots: Vec<Option<T>> = rows.into_iter().map(Some).collect();
    ids.iter()
        .filter_map(|id| {
            slots
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|row| key(row) == *id))
                .and_then(Option::take)
        })
        .collect()
}
