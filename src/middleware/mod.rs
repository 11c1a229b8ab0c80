mod auth;
mod cors;

pub use auth::{AdminUser, AuthUser};
pub use cors::{allowed_origins, build_cors};
