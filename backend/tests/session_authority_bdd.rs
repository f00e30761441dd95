//! Behaviour tests for the session authority state machine.
//!
//! Scenarios run the real password login against the in-memory store and a
//! session slot standing in for the cookie session.

use std::sync::{Arc, Mutex};

use backend::domain::credentials::{CredentialHasher, HashingCost, PasswordPolicy};
use backend::domain::ports::{SessionStore, SessionStoreError};
use backend::domain::{
    Error, ErrorCode, LoginCredentials, PasswordLoginService, SessionAuthority, SessionState,
    UserDraft, UserProfile, UserService,
};
use backend::outbound::memory::MemoryStore;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Runtime;

/// Session slot shared between steps.
#[derive(Clone, Default)]
struct SlotSession(Arc<Mutex<Option<String>>>);

impl SessionStore for SlotSession {
    fn bound_username(&self) -> Result<Option<String>, SessionStoreError> {
        self.0
            .lock()
            .map(|slot| slot.clone())
            .map_err(|err| SessionStoreError::read(err.to_string()))
    }

    fn bind_username(&self, username: &str) -> Result<(), SessionStoreError> {
        let mut slot = self
            .0
            .lock()
            .map_err(|err| SessionStoreError::write(err.to_string()))?;
        *slot = Some(username.to_owned());
        Ok(())
    }

    fn unbind(&self) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = None;
        }
    }
}

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Default, ScenarioState)]
struct SessionWorld {
    runtime: Slot<RuntimeHandle>,
    authority: Slot<SessionAuthority>,
    session: Slot<SlotSession>,
    last_login: Slot<Result<String, Error>>,
}

impl SessionWorld {
    fn runtime(&self) -> Arc<Runtime> {
        self.runtime.get().expect("runtime").0
    }

    fn session(&self) -> SlotSession {
        self.session.get().expect("session")
    }

    fn state(&self) -> SessionState {
        SessionAuthority::check_session(&self.session())
    }
}

fn cheap_hasher() -> CredentialHasher {
    CredentialHasher::new(
        PasswordPolicy::default(),
        HashingCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
    )
    .expect("cheap hashing cost is valid")
}

#[fixture]
fn world() -> SessionWorld {
    SessionWorld::default()
}

#[given("a registered user {username} with password {password}")]
fn a_registered_user(world: &SessionWorld, username: String, password: String) {
    let runtime = Runtime::new().expect("create runtime");
    let store = Arc::new(MemoryStore::new());
    let users = UserService::new(store.clone(), cheap_hasher(), Arc::new(DefaultClock));
    let draft = UserDraft::new(UserProfile {
        username,
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        phone_number: "+15551234567".to_owned(),
    });
    runtime
        .block_on(users.register(draft, &password))
        .expect("register user");

    let login = PasswordLoginService::new(store, cheap_hasher());
    world.authority.set(SessionAuthority::new(Arc::new(login)));
    world.runtime.set(RuntimeHandle(Arc::new(runtime)));
}

#[given("an anonymous session")]
fn an_anonymous_session(world: &SessionWorld) {
    world.session.set(SlotSession::default());
}

#[when("{username} logs in with password {password}")]
fn user_logs_in(world: &SessionWorld, username: String, password: String) {
    let authority = world.authority.get().expect("authority");
    let session = world.session();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).expect("credential shape");
    let result = world
        .runtime()
        .block_on(authority.login(&session, &credentials));
    world.last_login.set(result);
}

#[when("the session is logged out")]
fn the_session_is_logged_out(world: &SessionWorld) {
    SessionAuthority::logout(&world.session()).expect("logout");
}

#[then("the login succeeds")]
fn the_login_succeeds(world: &SessionWorld) {
    let result = world.last_login.get().expect("login attempted");
    assert_eq!(result.expect("login succeeds"), "alice");
}

#[then("the login is rejected on the {field} field")]
fn the_login_is_rejected_on_field(world: &SessionWorld, field: String) {
    let err = world
        .last_login
        .get()
        .expect("login attempted")
        .expect_err("login rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.fields(), vec![field.as_str()]);
}

#[then("the login is rejected as already authenticated")]
fn the_login_is_rejected_as_already_authenticated(world: &SessionWorld) {
    let err = world
        .last_login
        .get()
        .expect("login attempted")
        .expect_err("login rejected");
    assert_eq!(err.code(), ErrorCode::AlreadyAuthenticated);
}

#[then("the login is rejected as not found")]
fn the_login_is_rejected_as_not_found(world: &SessionWorld) {
    let err = world
        .last_login
        .get()
        .expect("login attempted")
        .expect_err("login rejected");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[then("the session is bound to {username}")]
fn the_session_is_bound_to(world: &SessionWorld, username: String) {
    assert_eq!(world.state(), SessionState::Authenticated(username));
}

#[then("the session is anonymous")]
fn the_session_is_anonymous(world: &SessionWorld) {
    assert_eq!(world.state(), SessionState::Anonymous);
}

#[scenario(
    path = "tests/features/session_authority.feature",
    name = "Correct password binds the session"
)]
fn correct_password_binds_the_session(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_authority.feature",
    name = "Wrong password leaves the session anonymous"
)]
fn wrong_password_leaves_the_session_anonymous(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_authority.feature",
    name = "A bound session refuses a second login"
)]
fn a_bound_session_refuses_a_second_login(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_authority.feature",
    name = "Logout returns the session to anonymous"
)]
fn logout_returns_the_session_to_anonymous(world: SessionWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/session_authority.feature",
    name = "Unknown users are not found"
)]
fn unknown_users_are_not_found(world: SessionWorld) {
    let _ = world;
}
