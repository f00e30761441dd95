//! Tests for the user service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::credentials::{HashingCost, PasswordCredential, PasswordPolicy};
use crate::domain::ports::MockUserRepository;
use crate::domain::{ErrorCode, UserProfile};

fn fixed_clock() -> Arc<MockClock> {
    let mut clock = MockClock::new();
    clock
        .expect_utc()
        .return_const(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().expect("valid time"));
    Arc::new(clock)
}

#[fixture]
fn hasher() -> CredentialHasher {
    let cost = HashingCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };
    CredentialHasher::new(PasswordPolicy::default(), cost).expect("cheap params are valid")
}

fn make_service(repo: MockUserRepository, hasher: CredentialHasher) -> UserService<MockUserRepository> {
    UserService::new(Arc::new(repo), hasher, fixed_clock())
}

fn profile(username: &str, phone_number: &str) -> UserProfile {
    UserProfile {
        username: username.to_owned(),
        first_name: "Alice".to_owned(),
        last_name: "Liddell".to_owned(),
        phone_number: phone_number.to_owned(),
    }
}

fn existing_user(username: &str, phone_number: &str) -> User {
    User::new(
        UserId::random(),
        profile(username, phone_number),
        PasswordCredential::new("ab", "cd"),
        Utc::now(),
        Vec::new(),
    )
}

#[rstest]
#[tokio::test]
async fn create_reports_every_empty_field(hasher: CredentialHasher) {
    let service = make_service(MockUserRepository::new(), hasher);
    let draft = UserDraft::new(profile("", "  "));

    let err = service.create(draft).await.expect_err("validation fails");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.fields(), vec!["Username", "Phonenumber"]);
}

#[rstest]
#[tokio::test]
async fn create_requires_credential(hasher: CredentialHasher) {
    let service = make_service(MockUserRepository::new(), hasher);
    let draft = UserDraft::new(profile("alice", "+15551234567"));

    let err = service.create(draft).await.expect_err("missing credential");
    assert_eq!(err.fields(), vec!["Password"]);
}

#[rstest]
#[tokio::test]
async fn create_rejects_duplicate_username_without_insert(hasher: CredentialHasher) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .return_once(|_| Ok(Some(existing_user("alice", "+15550000000"))));
    repo.expect_insert().never();
    let service = make_service(repo, hasher);

    let err = service
        .register(UserDraft::new(profile("alice", "+15551234567")), "hunter22")
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.fields(), vec!["username"]);
}

#[rstest]
#[tokio::test]
async fn create_rejects_duplicate_phone_number(hasher: CredentialHasher) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    repo.expect_find_by_phone_number()
        .times(1)
        .return_once(|_| Ok(Some(existing_user("bob", "+15551234567"))));
    repo.expect_insert().never();
    let service = make_service(repo, hasher);

    let err = service
        .register(UserDraft::new(profile("alice", "+15551234567")), "hunter22")
        .await
        .expect_err("conflict");
    assert_eq!(err.fields(), vec!["phoneNumber"]);
}

#[rstest]
#[tokio::test]
async fn register_persists_hashed_credential_and_timestamp(hasher: CredentialHasher) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    repo.expect_find_by_phone_number().return_once(|_| Ok(None));
    repo.expect_insert()
        .withf(|user| user.username() == "alice" && user.credential().hash() != "hunter22")
        .times(1)
        .return_once(|_| Ok(()));
    let verifier = hasher.clone();
    let service = make_service(repo, hasher);

    let user = service
        .register(UserDraft::new(profile("alice", "+15551234567")), "hunter22")
        .await
        .expect("user created");

    assert_eq!(
        user.inserted_at(),
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).single().expect("valid time")
    );
    assert!(!user.credential().is_blank());
    assert!(user.group_ids().is_empty());
    assert!(verifier.verify(
        "hunter22",
        user.credential().salt(),
        user.credential().hash()
    ));
}

#[rstest]
#[tokio::test]
async fn insert_unique_violation_maps_to_conflict(hasher: CredentialHasher) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    repo.expect_find_by_phone_number().return_once(|_| Ok(None));
    repo.expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate("username")));
    let service = make_service(repo, hasher);

    let err = service
        .register(UserDraft::new(profile("alice", "+15551234567")), "hunter22")
        .await
        .expect_err("raced insert");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.fields(), vec!["username"]);
}

#[rstest]
fn set_credential_reports_policy_failure(hasher: CredentialHasher) {
    let service = make_service(MockUserRepository::new(), hasher);
    let mut draft = UserDraft::new(profile("alice", "+15551234567"));

    let err = service
        .set_credential(&mut draft, "short")
        .expect_err("policy rejects");
    assert_eq!(err.fields(), vec!["Password"]);
    assert!(draft.credential().is_none());
}

#[rstest]
#[tokio::test]
async fn find_by_username_maps_absence_to_not_found(hasher: CredentialHasher) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    let service = make_service(repo, hasher);

    let err = service.find_by_username("ghost").await.expect_err("absent");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn find_by_phone_number_maps_store_failures(
    hasher: CredentialHasher,
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_phone_number()
        .return_once(move |_| Err(failure));
    let service = make_service(repo, hasher);

    let err = service
        .find_by_phone_number("+15551234567")
        .await
        .expect_err("store failure");
    assert_eq!(err.code(), expected);
}
