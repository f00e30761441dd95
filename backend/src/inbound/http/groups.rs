//! Groups API handlers.
//!
//! ```text
//! POST /api/v1/groups                 Name=night+owls
//! GET  /api/v1/groups/{name}
//! GET  /api/v1/groups/{name}/users
//! POST /api/v1/groups/{name}/users    Username=bob
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ErrorCode, Group, GroupDraft, SessionAuthority};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::UserResponse;

/// Form body for `POST /api/v1/groups`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CreateGroupForm {
    pub name: String,
}

/// Form body for `POST /api/v1/groups/{name}/users`.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AddMemberForm {
    pub username: String,
}

/// Public view of a group.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            group_name: group.name().to_owned(),
            phone_number: group.phone_number().map(str::to_owned),
        }
    }
}

/// Create a group owned by the caller.
///
/// A phone number is provisioned when one is available. A number already held
/// by another group leaves this one without a number; other provisioning
/// failures fail the request.
/// The caller becomes the first member.
#[post("/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<CreateGroupForm>,
) -> ApiResult<HttpResponse> {
    let username = SessionAuthority::require_authenticated(&session)?;
    let owner = state.users.find_by_username(&username).await?;
    let group = state
        .groups
        .create(GroupDraft::new(&form.into_inner().name))
        .await?;
    let group = match state.groups.provision_phone_number(group.clone()).await {
        Ok(provisioned) => provisioned,
        Err(err) if err.code() == ErrorCode::Conflict => {
            warn!(group = %group.name(), error = %err, "group created without a phone number");
            group
        }
        Err(err) => return Err(err),
    };
    state.groups.add_user(&group, &owner).await?;
    Ok(envelope::data(
        StatusCode::CREATED,
        &GroupResponse::from(&group),
    ))
}

/// Look a group up by name.
#[get("/groups/{name}")]
pub async fn get_group(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let group = state.groups.find_by_name(&path.into_inner()).await?;
    Ok(envelope::ok(&GroupResponse::from(&group)))
}

/// Members of the named group. Requires a signed-in caller.
#[get("/groups/{name}/users")]
pub async fn group_members(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    SessionAuthority::require_authenticated(&session)?;
    let group = state.groups.find_by_name(&path.into_inner()).await?;
    let members = state.groups.get_users(&group).await?;
    let body: Vec<UserResponse> = members.iter().map(UserResponse::from).collect();
    Ok(envelope::ok(&body))
}

/// Add a user to the named group. Requires a signed-in caller.
#[post("/groups/{name}/users")]
pub async fn add_group_member(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    form: web::Form<AddMemberForm>,
) -> ApiResult<HttpResponse> {
    SessionAuthority::require_authenticated(&session)?;
    let group = state.groups.find_by_name(&path.into_inner()).await?;
    let user = state
        .users
        .find_by_username(form.into_inner().username.trim())
        .await?;
    state.groups.add_user(&group, &user).await?;
    Ok(envelope::ok(&"User added to group"))
}
