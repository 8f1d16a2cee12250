//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod auth;
pub mod comments;
pub mod error;
pub mod health;
pub mod loads;
pub mod reports;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Register every `/api/v1` handler and the extractor error handlers.
///
/// Literal load paths (`page`, `export`, `status`) are registered before
/// `/loads/{id}` so they are not captured as ids.
///
/// # Examples
/// ```no_run
/// use actix_web::{App, web};
/// use loadboard::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .service(auth::login)
        .service(auth::logout)
        .service(auth::session_user)
        .service(loads::list_loads)
        .service(loads::page_loads)
        .service(reports::export_loads)
        .service(loads::list_loads_by_status)
        .service(comments::list_comments)
        .service(comments::add_comment)
        .service(loads::get_load)
        .service(loads::create_load)
        .service(loads::update_load)
        .service(loads::delete_load)
        .service(reports::dashboard)
        .service(reports::daily_allocation)
        .service(users::list_users)
        .service(users::current_user)
        .service(users::create_user)
        .service(users::update_user)
        .service(users::delete_user);
}
