//! PostgreSQL-backed [`GroupRepository`] using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{GroupPersistenceError, GroupRepository};
use crate::domain::{Group, GroupId, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{GroupRow, order_by_ids};
use super::pool::{DbPool, PoolError};
use super::schema::groups;

const ADD_USER_SQL: &str = "UPDATE groups SET user_ids = array_append(user_ids, $1) \
     WHERE id = $2 AND NOT ($1 = ANY(user_ids))";

const REMOVE_USER_SQL: &str = "UPDATE groups SET user_ids = array_remove(user_ids, $1) WHERE id = $2";

/// Diesel adapter for the group collection.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run a membership `UPDATE` and report whether a row changed.
    ///
    /// When nothing changed the group is looked up so a missing group is still
    /// reported as [`GroupPersistenceError::Missing`].
    async fn update_members(
        &self,
        sql: &'static str,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<bool, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::sql_query(sql)
            .bind::<sql_types::Uuid, _>(*user_id.as_uuid())
            .bind::<sql_types::Uuid, _>(*group_id.as_uuid())
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(true);
        }
        let exists = groups::table
            .find(*group_id.as_uuid())
            .select(groups::id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match exists {
            Some(_) => Ok(false),
            None => Err(GroupPersistenceError::missing(group_id.to_string())),
        }
    }
}

fn map_pool_error(error: PoolError) -> GroupPersistenceError {
    GroupPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> GroupPersistenceError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection(message) => GroupPersistenceError::connection(message),
        DieselFailure::Query(message) => GroupPersistenceError::query(message),
        DieselFailure::Duplicate(field) => GroupPersistenceError::duplicate(field),
    }
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn insert(&self, group: &Group) -> Result<(), GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(groups::table)
            .values(GroupRow::from(group))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = groups::table
            .filter(groups::name.eq(name))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Group::from))
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<Group>, GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = groups::table
            .filter(groups::phone_number.eq(phone_number))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Group::from))
    }

    async fn find_by_ids(&self, ids: &[GroupId]) -> Result<Vec<Group>, GroupPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let wanted: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = groups::table
            .filter(groups::id.eq_any(wanted.clone()))
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(order_by_ids(rows, &wanted, |row| row.id)
            .into_iter()
            .map(Group::from)
            .collect())
    }

    async fn set_phone_number(
        &self,
        group_id: &GroupId,
        phone_number: &str,
    ) -> Result<(), GroupPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(groups::table.find(*group_id.as_uuid()))
            .set(groups::phone_number.eq(Some(phone_number)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(GroupPersistenceError::missing(group_id.to_string()));
        }
        Ok(())
    }

    async fn add_user(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<bool, GroupPersistenceError> {
        self.update_members(ADD_USER_SQL, group_id, user_id).await
    }

    async fn remove_user(
        &self,
        group_id: &GroupId,
        user_id: &UserId,
    ) -> Result<(), GroupPersistenceError> {
        self.update_members(REMOVE_USER_SQL, group_id, user_id)
            .await
            .map(|_| ())
    }
}
