//! Tests for the group service.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use rstest::rstest;

use super::*;
use crate::domain::credentials::PasswordCredential;
use crate::domain::ports::{
    FixturePhoneNumberProvisioner, GroupRepository, MockGroupRepository,
    MockPhoneNumberProvisioner, MockUserRepository, PLACEHOLDER_PHONE_NUMBER,
    UserPersistenceError, UserRepository,
};
use crate::domain::{ErrorCode, UserId, UserProfile};
use crate::outbound::memory::MemoryStore;

type Service = GroupService<MockGroupRepository, MockUserRepository>;

fn make_service(groups: MockGroupRepository, users: MockUserRepository) -> Service {
    GroupService::new(
        Arc::new(groups),
        Arc::new(users),
        Arc::new(FixturePhoneNumberProvisioner),
        Arc::new(DefaultClock),
    )
}

fn group(name: &str) -> Group {
    Group::new(GroupId::random(), name, None, Utc::now(), Vec::new())
}

fn user(username: &str) -> User {
    User::new(
        UserId::random(),
        UserProfile {
            username: username.to_owned(),
            phone_number: "+15551234567".to_owned(),
            ..UserProfile::default()
        },
        PasswordCredential::new("ab", "cd"),
        Utc::now(),
        Vec::new(),
    )
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn create_rejects_blank_name(#[case] name: &str) {
    let service = make_service(MockGroupRepository::new(), MockUserRepository::new());
    let err = service
        .create(GroupDraft::new(name))
        .await
        .expect_err("blank name");
    assert_eq!(err.fields(), vec!["Name"]);
}

#[tokio::test]
async fn create_rejects_duplicate_name() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_name()
        .return_once(|_| Ok(Some(group("owls"))));
    groups.expect_insert().never();
    let service = make_service(groups, MockUserRepository::new());

    let err = service
        .create(GroupDraft::new("owls"))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.fields(), vec!["name"]);
}

#[tokio::test]
async fn create_persists_empty_group() {
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_name().return_once(|_| Ok(None));
    groups
        .expect_insert()
        .withf(|g| g.name() == "owls" && g.user_ids().is_empty() && g.phone_number().is_none())
        .times(1)
        .return_once(|_| Ok(()));
    let service = make_service(groups, MockUserRepository::new());

    let created = service
        .create(GroupDraft::new("owls"))
        .await
        .expect("group created");
    assert_eq!(created.name(), "owls");
}

#[tokio::test]
async fn provision_assigns_free_placeholder_number() {
    let target = group("owls");
    let target_id = *target.id();
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_phone_number().return_once(|_| Ok(None));
    groups
        .expect_set_phone_number()
        .withf(move |id, number| *id == target_id && number == PLACEHOLDER_PHONE_NUMBER)
        .times(1)
        .return_once(|_, _| Ok(()));
    let service = make_service(groups, MockUserRepository::new());

    let provisioned = service
        .provision_phone_number(target)
        .await
        .expect("provisioned");
    assert_eq!(provisioned.phone_number(), Some(PLACEHOLDER_PHONE_NUMBER));
}

#[tokio::test]
async fn provision_rejects_number_held_elsewhere() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_phone_number()
        .return_once(|_| Ok(Some(group("larks").with_phone_number(PLACEHOLDER_PHONE_NUMBER))));
    groups.expect_set_phone_number().never();
    let service = make_service(groups, MockUserRepository::new());

    let err = service
        .provision_phone_number(group("owls"))
        .await
        .expect_err("number taken");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.fields(), vec!["phoneNumber"]);
}

#[tokio::test]
async fn provision_surfaces_provisioner_outage() {
    let mut provisioner = MockPhoneNumberProvisioner::new();
    provisioner
        .expect_propose()
        .return_once(|_| Err(PhoneNumberProvisionerError::unavailable("pool empty")));
    let service: Service = GroupService::new(
        Arc::new(MockGroupRepository::new()),
        Arc::new(MockUserRepository::new()),
        Arc::new(provisioner),
        Arc::new(DefaultClock),
    );

    let err = service
        .provision_phone_number(group("owls"))
        .await
        .expect_err("outage");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn add_user_writes_both_sides() {
    let (g, u) = (group("owls"), user("alice"));
    let mut groups = MockGroupRepository::new();
    groups.expect_add_user().times(1).return_once(|_, _| Ok(true));
    groups.expect_remove_user().never();
    let mut users = MockUserRepository::new();
    users.expect_add_group().times(1).return_once(|_, _| Ok(()));
    let service = make_service(groups, users);

    service.add_user(&g, &u).await.expect("membership recorded");
}

#[tokio::test]
async fn add_user_compensates_failed_user_write() {
    let (g, u) = (group("owls"), user("alice"));
    let (group_id, user_id) = (*g.id(), *u.id());
    let mut groups = MockGroupRepository::new();
    groups.expect_add_user().times(1).return_once(|_, _| Ok(true));
    groups
        .expect_remove_user()
        .withf(move |gid, uid| *gid == group_id && *uid == user_id)
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut users = MockUserRepository::new();
    users
        .expect_add_group()
        .return_once(|_, _| Err(UserPersistenceError::connection("reset")));
    let service = make_service(groups, users);

    let err = service.add_user(&g, &u).await.expect_err("step two fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn add_user_keeps_existing_membership_when_user_write_fails() {
    let (g, u) = (group("owls"), user("alice"));
    let mut groups = MockGroupRepository::new();
    groups.expect_add_user().times(1).return_once(|_, _| Ok(false));
    groups.expect_remove_user().never();
    let mut users = MockUserRepository::new();
    users
        .expect_add_group()
        .return_once(|_, _| Err(UserPersistenceError::query("transient")));
    let service = make_service(groups, users);

    let err = service.add_user(&g, &u).await.expect_err("step two fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn retried_membership_stays_symmetric_in_memory_store() {
    let store = Arc::new(MemoryStore::new());
    let (owls, alice) = (group("owls"), user("alice"));
    GroupRepository::insert(store.as_ref(), &owls).await.expect("group");
    UserRepository::insert(store.as_ref(), &alice).await.expect("user");
    let healthy = GroupService::new(
        store.clone(),
        store.clone(),
        Arc::new(FixturePhoneNumberProvisioner),
        Arc::new(DefaultClock),
    );
    healthy.add_user(&owls, &alice).await.expect("first add");

    let mut flaky_users = MockUserRepository::new();
    flaky_users
        .expect_add_group()
        .return_once(|_, _| Err(UserPersistenceError::query("transient")));
    let flaky = GroupService::new(
        store.clone(),
        Arc::new(flaky_users),
        Arc::new(FixturePhoneNumberProvisioner),
        Arc::new(DefaultClock),
    );
    flaky
        .add_user(&owls, &alice)
        .await
        .expect_err("user side fails on retry");

    let stored_group = healthy.find_by_name("owls").await.expect("group");
    let stored_user = UserRepository::find_by_username(store.as_ref(), "alice")
        .await
        .expect("lookup")
        .expect("user");
    assert_eq!(stored_group.user_ids(), &[*alice.id()]);
    assert_eq!(stored_user.group_ids(), &[*owls.id()]);
}

#[tokio::test]
async fn add_user_returns_original_error_when_compensation_fails() {
    let (g, u) = (group("owls"), user("alice"));
    let mut groups = MockGroupRepository::new();
    groups.expect_add_user().return_once(|_, _| Ok(true));
    groups
        .expect_remove_user()
        .return_once(|_, _| Err(GroupPersistenceError::query("deadlock")));
    let mut users = MockUserRepository::new();
    users
        .expect_add_group()
        .return_once(|_, _| Err(UserPersistenceError::missing("gone")));
    let service = make_service(groups, users);

    let err = service.add_user(&g, &u).await.expect_err("step two fails");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_user_stops_when_group_write_fails() {
    let (g, u) = (group("owls"), user("alice"));
    let mut groups = MockGroupRepository::new();
    groups
        .expect_add_user()
        .return_once(|_, _| Err(GroupPersistenceError::query("boom")));
    let mut users = MockUserRepository::new();
    users.expect_add_group().never();
    let service = make_service(groups, users);

    let err = service.add_user(&g, &u).await.expect_err("step one fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn get_users_fails_whole_batch_on_error() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_ids()
        .return_once(|_| Err(UserPersistenceError::query("timeout")));
    let service = make_service(MockGroupRepository::new(), users);

    let err = service.get_users(&group("owls")).await.expect_err("batch fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[tokio::test]
async fn get_groups_for_user_resolves_ids() {
    let owls = group("owls");
    let member = User::new(
        UserId::random(),
        UserProfile::default(),
        PasswordCredential::new("ab", "cd"),
        Utc::now(),
        vec![*owls.id()],
    );
    let expected = vec![*owls.id()];
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_ids()
        .withf(move |ids| ids == expected.as_slice())
        .return_once(move |_| Ok(vec![owls]));
    let service = make_service(groups, MockUserRepository::new());

    let found = service
        .get_groups_for_user(&member)
        .await
        .expect("groups resolved");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "owls");
}

#[rstest]
#[case("owls", true)]
#[case("ghosts", false)]
#[tokio::test]
async fn find_by_name_maps_absence(#[case] name: &str, #[case] exists: bool) {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_name()
        .return_once(move |n| Ok(exists.then(|| group(n))));
    let service = make_service(groups, MockUserRepository::new());

    match service.find_by_name(name).await {
        Ok(found) => {
            assert!(exists);
            assert_eq!(found.name(), name);
        }
        Err(err) => {
            assert!(!exists);
            assert_eq!(err.code(), ErrorCode::NotFound);
        }
    }
}
