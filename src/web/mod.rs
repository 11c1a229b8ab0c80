pub mod admin;
pub mod auth;
pub mod index;
pub mod media;
pub mod movies;
pub mod payments;
pub mod requests;
pub mod series;
pub mod social;
pub mod subscriptions;
pub mod trending;

use crate::content_id;
use crate::error::{self, ApiError, ApiResult};
use actix_web::web;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut web::ServiceConfig) {
    conf.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler));

    index::configure(conf);

    // Route resolution stops at the first match, so literal segments
    // (`/trending/positions`, `/subscriptions/cancel`) are registered before
    // their `{id}` siblings inside each module.
    conf.service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(movies::configure)
            .configure(series::configure)
            .configure(trending::configure)
            .configure(social::configure)
            .configure(requests::configure)
            .configure(subscriptions::configure)
            .configure(payments::configure)
            .configure(admin::configure)
            .configure(media::configure),
    );
}

/// Movie or series id from a path segment, formatted or bare.
pub(crate) fn content_path(raw: &str) -> ApiResult<i32> {
    content_id::parse_numeric(raw).ok_or_else(|| ApiError::bad_request("Invalid content ID format"))
}
