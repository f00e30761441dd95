//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod envelope;
pub mod error;
pub mod groups;
pub mod health;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Register the `/api/v1` resources and their extractor error handlers.
///
/// The caller supplies the scope, the session middleware and the
/// [`state::HttpState`].
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use backend::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(error::form_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .service(users::create_user)
        .service(users::find_user_by_phone)
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::session_check)
        .service(users::user_groups)
        .service(groups::create_group)
        .service(groups::group_members)
        .service(groups::add_group_member)
        .service(groups::get_group);
}
