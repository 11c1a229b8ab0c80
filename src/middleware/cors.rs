//! Cross-origin policy for the browse SPA and the admin console.

use crate::app_config::AppConfig;
use actix_cors::Cors;
use actix_web::http::{header, Method};

/// Origins allowed to call the API: the configured frontend plus any extras.
/// Trailing slashes are dropped since browsers never send them in `Origin`.
pub fn allowed_origins(config: &AppConfig) -> Vec<String> {
    let mut origins: Vec<String> = std::iter::once(&config.site.frontend_url)
        .chain(config.server.cors_origins.iter())
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect();
    origins.dedup();
    origins
}

pub fn build_cors(config: &AppConfig) -> Cors {
    let origins = allowed_origins(config);

    let mut cors = Cors::default()
        .allowed_origin_fn(move |origin, _req| {
            origin
                .to_str()
                .map(|origin| origins.iter().any(|allowed| allowed == origin))
                .unwrap_or(false)
        })
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::ORIGIN,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ])
        .max_age(3600);

    if config.server.cors_credentials {
        cors = cors.supports_credentials();
    }

    cors
}
