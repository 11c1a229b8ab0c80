//! Bearer token extractors.
//!
//! Handlers that take an [`AuthUser`] argument require a valid
//! `Authorization: Bearer <jwt>` header; [`AdminUser`] additionally requires
//! the `admin` role. The token is verified with the [`JwtKeys`] registered as
//! app data.

use crate::auth::jwt::{Claims, JwtKeys};
use crate::error::ApiError;
use crate::orm::users::Role;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web::Data, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

/// Caller identity taken from a verified token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
    pub email: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner-or-admin check used by delete endpoints.
    pub fn can_modify(&self, owner_id: i32) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role,
            email: claims.email,
        }
    }
}

/// Caller verified to hold the admin role.
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

fn authenticate(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid token format"))?;

    let keys = req
        .app_data::<Data<JwtKeys>>()
        .ok_or_else(|| ApiError::internal("JwtKeys are not registered as app data"))?;

    match keys.verify(token) {
        Ok(claims) => Ok(claims.into()),
        Err(e) => {
            log::debug!("Rejected bearer token: {}", e);
            Err(ApiError::forbidden("Token is not valid"))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            if user.is_admin() {
                Ok(AdminUser(user))
            } else {
                Err(ApiError::forbidden("Admin only"))
            }
        }))
    }
}
