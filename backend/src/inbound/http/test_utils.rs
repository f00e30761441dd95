//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::Value;

use super::session_config::SESSION_COOKIE_NAME;
use super::state::{HttpState, HttpStatePorts};
use crate::domain::credentials::{CredentialHasher, HashingCost, PasswordPolicy};
use crate::domain::ports::{FixturePhoneNumberProvisioner, PhoneNumberProvisioner};
use crate::outbound::memory::MemoryStore;

/// Cookie-session middleware with a throwaway key and no `Secure` flag, so
/// plain-HTTP test requests carry the cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over a fresh in-memory store with a cheap hashing cost.
pub fn memory_state() -> web::Data<HttpState> {
    memory_state_with(Arc::new(FixturePhoneNumberProvisioner))
}

/// Like [`memory_state`] but proposing numbers through `provisioner`.
pub fn memory_state_with(provisioner: Arc<dyn PhoneNumberProvisioner>) -> web::Data<HttpState> {
    let store = Arc::new(MemoryStore::new());
    let hasher = CredentialHasher::new(
        PasswordPolicy::default(),
        HashingCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
    )
    .expect("cheap hashing cost is valid");
    web::Data::new(HttpState::new(HttpStatePorts {
        users: store.clone(),
        groups: store,
        provisioner,
        hasher,
        clock: Arc::new(DefaultClock),
    }))
}

/// Full `/api/v1` surface over `state`.
pub fn api_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(state).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .configure(super::configure_api),
    )
}

/// Session cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}

/// Decode the JSON envelope of `res`.
pub async fn envelope_body<B: MessageBody>(res: ServiceResponse<B>) -> Value {
    let body = test::read_body(res).await;
    serde_json::from_slice(&body).expect("json envelope")
}

/// Register `username` with a valid profile and password `hunter22`.
pub async fn register<S, B>(app: &S, username: &str, phone_number: &str)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_form([
            ("Username", username),
            ("Firstname", "Test"),
            ("Lastname", "User"),
            ("Phonenumber", phone_number),
            ("Password", "hunter22"),
        ])
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "registering {username} failed");
}

/// Log `username` in with password `hunter22` and return the session cookie.
pub async fn login<S, B>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/users/login")
        .set_form([("Username", username), ("Password", "hunter22")])
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success(), "login for {username} failed");
    session_cookie(&res).expect("login sets the session cookie")
}
