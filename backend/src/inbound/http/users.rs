//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users            Username=alice&Firstname=Alice&Lastname=Liddell&Phonenumber=%2B15551234567&Password=hunter22
//! GET  /api/v1/users?phoneNumber=%2B15551234567
//! POST /api/v1/users/login      Username=alice&Password=hunter22
//! POST /api/v1/users/logout
//! GET  /api/v1/users/info
//! GET  /api/v1/users/{username}/groups
//! GET  /api/v1/users/sessioncheck
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::user_service::PHONE_NUMBER_FIELD;
use crate::domain::{
    Error, LoginCredentials, SessionAuthority, SessionState, User, UserDraft, UserProfile,
    normalize_phone_number,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::groups::GroupResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query parameter naming the phone number to look up.
const PHONE_QUERY_FIELD: &str = "phoneNumber";

/// Form body for `POST /api/v1/users`.
///
/// Absent fields deserialise as empty so the service can report every blank
/// required field at once.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateUserForm {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub phonenumber: String,
    pub password: String,
}

/// Form body for `POST /api/v1/users/login`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Query string for `GET /api/v1/users`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneLookup {
    pub phone_number: Option<String>,
}

/// Public view of a user. Credential material and identifiers stay private.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_name: user.username().to_owned(),
            first_name: user.first_name().to_owned(),
            last_name: user.last_name().to_owned(),
            phone_number: user.phone_number().to_owned(),
        }
    }
}

fn phone_number_from(raw: &str, field: &str) -> Result<String, Error> {
    normalize_phone_number(raw)
        .map_err(|err| Error::invalid_fields(format!("given phone number is invalid: {err}"), &[field]))
}

/// Register a new user.
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    form: web::Form<CreateUserForm>,
) -> ApiResult<HttpResponse> {
    let CreateUserForm {
        username,
        firstname,
        lastname,
        phonenumber,
        password,
    } = form.into_inner();
    let profile = UserProfile {
        username: username.trim().to_owned(),
        first_name: firstname.trim().to_owned(),
        last_name: lastname.trim().to_owned(),
        phone_number: phone_number_from(&phonenumber, PHONE_NUMBER_FIELD)?,
    };
    let user = state
        .users
        .register(UserDraft::new(profile), &password)
        .await?;
    Ok(envelope::data(
        StatusCode::CREATED,
        &UserResponse::from(&user),
    ))
}

/// Look a user up by phone number.
#[get("/users")]
pub async fn find_user_by_phone(
    state: web::Data<HttpState>,
    query: web::Query<PhoneLookup>,
) -> ApiResult<HttpResponse> {
    let raw = query
        .into_inner()
        .phone_number
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            Error::invalid_fields(
                "a phone number must be included to query for a user",
                &[PHONE_QUERY_FIELD],
            )
        })?;
    let phone_number = phone_number_from(&raw, PHONE_QUERY_FIELD)?;
    debug!(%phone_number, "user lookup by phone number");
    let user = state.users.find_by_phone_number(&phone_number).await?;
    Ok(envelope::ok(&UserResponse::from(&user)))
}

/// Authenticate and bind the username to the session.
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    let credentials = LoginCredentials::try_from_parts(&form.username, &form.password)?;
    state.sessions.login(&session, &credentials).await?;
    Ok(envelope::ok(&"Successfully signed in"))
}

/// Drop the session binding.
#[post("/users/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    SessionAuthority::logout(&session)?;
    Ok(envelope::ok(&"Successfully logged out"))
}

/// Profile of the signed-in user.
#[get("/users/info")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let username = SessionAuthority::require_authenticated(&session)?;
    let user = state.users.find_by_username(&username).await?;
    Ok(envelope::ok(&UserResponse::from(&user)))
}

/// Groups the named user belongs to. Requires a signed-in caller.
#[get("/users/{username}/groups")]
pub async fn user_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    SessionAuthority::require_authenticated(&session)?;
    let user = state.users.find_by_username(&path.into_inner()).await?;
    let groups = state.groups.get_groups_for_user(&user).await?;
    let body: Vec<GroupResponse> = groups.iter().map(GroupResponse::from).collect();
    Ok(envelope::ok(&body))
}

/// Report whether the request carries a bound session.
#[get("/users/sessioncheck")]
pub async fn session_check(session: SessionContext) -> ApiResult<HttpResponse> {
    match SessionAuthority::check_session(&session) {
        SessionState::Authenticated(_) => Ok(envelope::ok(&"Valid cookie found")),
        SessionState::Anonymous => Err(Error::unauthorized("Invalid cookie given")),
    }
}
