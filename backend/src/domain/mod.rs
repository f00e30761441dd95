//! Domain primitives, aggregates and services.
//!
//! Purpose: own the authentication and membership core. Types here are
//! transport agnostic; inbound adapters translate [`Error`] into HTTP
//! responses and outbound adapters implement the [`ports`].
//!
//! Public surface:
//! - `User`, `Group` and their drafts: the two aggregates.
//! - `UserService`, `GroupService`: lifecycle, uniqueness and membership.
//! - `SessionAuthority`: the per-client login state machine.
//! - `credentials`: password policy, salting, hashing and verification.

pub mod auth;
pub mod credentials;
pub mod error;
pub mod group;
pub mod group_service;
pub mod password_login;
pub mod ports;
pub mod session;
pub mod trace_id;
pub mod user;
pub mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::group::{Group, GroupDraft, GroupId};
pub use self::group_service::GroupService;
pub use self::password_login::PasswordLoginService;
pub use self::session::{SessionAuthority, SessionState};
pub use self::trace_id::TraceId;
pub use self::user::{
    User, UserDraft, UserId, UserProfile, UserValidationError, normalize_phone_number,
};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("login required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
