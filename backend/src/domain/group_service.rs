//! Group lifecycle and membership.
//!
//! Membership is stored on both sides: the group's member set and the user's
//! group set. [`GroupService::add_user`] writes the group side first, then the
//! user side, and pulls the user back out of the group when the second write
//! fails after the first one appended the id.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{
    GroupPersistenceError, GroupRepository, PhoneNumberProvisioner, PhoneNumberProvisionerError,
    UserRepository,
};
use crate::domain::user_service::map_user_persistence_error;
use crate::domain::{Error, Group, GroupDraft, GroupId, User};

/// Field name reported when the group name is blank.
pub const NAME_FIELD: &str = "Name";

/// Group lifecycle and membership service.
pub struct GroupService<G: ?Sized, U: ?Sized> {
    groups: Arc<G>,
    users: Arc<U>,
    provisioner: Arc<dyn PhoneNumberProvisioner>,
    clock: Arc<dyn Clock>,
}

impl<G: ?Sized, U: ?Sized> Clone for GroupService<G, U> {
    fn clone(&self) -> Self {
        Self {
            groups: Arc::clone(&self.groups),
            users: Arc::clone(&self.users),
            provisioner: Arc::clone(&self.provisioner),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<G: ?Sized, U: ?Sized> GroupService<G, U> {
    /// Create a service over the group and user repositories.
    pub fn new(
        groups: Arc<G>,
        users: Arc<U>,
        provisioner: Arc<dyn PhoneNumberProvisioner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            groups,
            users,
            provisioner,
            clock,
        }
    }
}

fn map_group_persistence_error(error: GroupPersistenceError) -> Error {
    match error {
        GroupPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("group repository unavailable: {message}"))
        }
        GroupPersistenceError::Query { message } => {
            Error::internal(format!("group repository error: {message}"))
        }
        GroupPersistenceError::Duplicate { field } => {
            Error::conflict_on(&field, format!("a group with this {field} already exists"))
        }
        GroupPersistenceError::Missing { id } => Error::not_found(format!("group {id} not found")),
    }
}

fn map_provisioner_error(error: PhoneNumberProvisionerError) -> Error {
    match error {
        PhoneNumberProvisionerError::Unavailable { message } => {
            Error::service_unavailable(format!("phone number provisioning unavailable: {message}"))
        }
    }
}

impl<G, U> GroupService<G, U>
where
    G: GroupRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    /// Validate and persist a new group with no members and no number.
    pub async fn create(&self, draft: GroupDraft) -> Result<Group, Error> {
        if draft.name().is_empty() {
            return Err(Error::invalid_fields(
                "group name must not be empty",
                &[NAME_FIELD],
            ));
        }
        if self
            .groups
            .find_by_name(draft.name())
            .await
            .map_err(map_group_persistence_error)?
            .is_some()
        {
            return Err(Error::conflict_on("name", "group name already taken"));
        }

        let group = Group::new(
            GroupId::random(),
            draft.name(),
            None,
            self.clock.utc(),
            Vec::new(),
        );
        self.groups
            .insert(&group)
            .await
            .map_err(map_group_persistence_error)?;
        info!(group_id = %group.id(), name = %group.name(), "group created");
        Ok(group)
    }

    /// Ask the provisioner for a number and assign it when no other group
    /// holds it.
    pub async fn provision_phone_number(&self, group: Group) -> Result<Group, Error> {
        let number = self
            .provisioner
            .propose(&group)
            .await
            .map_err(map_provisioner_error)?;

        match self
            .groups
            .find_by_phone_number(&number)
            .await
            .map_err(map_group_persistence_error)?
        {
            Some(holder) if holder.id() == group.id() => return Ok(group.with_phone_number(number)),
            Some(_) => {
                return Err(Error::conflict_on(
                    "phoneNumber",
                    "phone number already assigned to another group",
                ));
            }
            None => {}
        }

        self.groups
            .set_phone_number(group.id(), &number)
            .await
            .map_err(map_group_persistence_error)?;
        info!(group_id = %group.id(), "phone number provisioned");
        Ok(group.with_phone_number(number))
    }

    /// Record `user` as a member of `group` on both sides.
    ///
    /// Repeated calls do not duplicate ids. When the user-side write fails the
    /// group-side id is pulled again only if this call appended it, and the
    /// user-side error is returned.
    pub async fn add_user(&self, group: &Group, user: &User) -> Result<(), Error> {
        let appended = self
            .groups
            .add_user(group.id(), user.id())
            .await
            .map_err(map_group_persistence_error)?;

        if let Err(err) = self.users.add_group(user.id(), group.id()).await {
            if !appended {
                return Err(map_user_persistence_error(err));
            }
            if let Err(undo) = self.groups.remove_user(group.id(), user.id()).await {
                error!(
                    group_id = %group.id(),
                    user_id = %user.id(),
                    error = %undo,
                    "membership left asymmetric: group lists user but user does not list group"
                );
            }
            return Err(map_user_persistence_error(err));
        }

        info!(group_id = %group.id(), user_id = %user.id(), "user added to group");
        Ok(())
    }

    /// Members of `group`, fetched in one batch.
    pub async fn get_users(&self, group: &Group) -> Result<Vec<User>, Error> {
        self.users
            .find_by_ids(group.user_ids())
            .await
            .map_err(map_user_persistence_error)
    }

    /// Look up a group by exact name.
    pub async fn find_by_name(&self, name: &str) -> Result<Group, Error> {
        self.groups
            .find_by_name(name)
            .await
            .map_err(map_group_persistence_error)?
            .ok_or_else(|| Error::not_found("group not found"))
    }

    /// Look up a group by its provisioned phone number.
    pub async fn find_by_phone_number(&self, phone_number: &str) -> Result<Group, Error> {
        self.groups
            .find_by_phone_number(phone_number)
            .await
            .map_err(map_group_persistence_error)?
            .ok_or_else(|| Error::not_found("group not found"))
    }

    /// Groups `user` belongs to, fetched in one batch.
    pub async fn get_groups_for_user(&self, user: &User) -> Result<Vec<Group>, Error> {
        self.groups
            .find_by_ids(user.group_ids())
            .await
            .map_err(map_group_persistence_error)
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
