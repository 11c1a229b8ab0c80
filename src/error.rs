//! JSON error responses shared by every API handler.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use sea_orm::DbErr;
use serde::Serialize;

/// Error returned by API handlers. Serialized as `{"error": "..."}`.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    /// An external service (object storage, mail) refused; the message is
    /// shown to the client.
    #[display(fmt = "{}", _0)]
    Upstream(String),
    /// Detail is logged, never sent to the client.
    #[display(fmt = "{}", _0)]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        ApiError::Upstream(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Internal(detail) => {
                log::error!("internal error: {}", detail);
                "Server error"
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Upstream(msg) => msg.as_str(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { error: message })
    }
}

impl From<DbErr> for ApiError {
    fn from(e: DbErr) -> Self {
        ApiError::Internal(format!("database error: {}", e))
    }
}

/// True when the database refused a write because of a unique constraint.
/// sea-orm only carries the driver's message, so both the Postgres and the
/// SQLite wording are recognised.
pub fn is_unique_violation(e: &DbErr) -> bool {
    match e {
        DbErr::Exec(msg) | DbErr::Query(msg) => {
            msg.contains("duplicate key value violates unique constraint")
                || msg.contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

/// Maps a unique-constraint failure to 409 and anything else to 500.
pub fn conflict_on_duplicate(e: DbErr, msg: impl Into<String>) -> ApiError {
    if is_unique_violation(&e) {
        log::info!("write rejected by a unique constraint: {}", e);
        ApiError::Conflict(msg.into())
    } else {
        e.into()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        log::debug!("request validation failed: {}", e);
        ApiError::BadRequest(format!("Invalid request: {}", e))
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(e: crate::storage::StorageError) -> Self {
        ApiError::Internal(format!("storage error: {}", e))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Turns extractor failures (bad JSON, bad path segment, bad query) into JSON
/// 400 responses instead of actix's plain-text defaults.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    log::debug!("rejected JSON body: {}", err);
    ApiError::bad_request(format!("Invalid JSON body: {}", err)).into()
}

pub fn path_error_handler(
    err: actix_web::error::PathError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::bad_request(format!("Invalid path parameter: {}", err)).into()
}

pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::bad_request(format!("Invalid query string: {}", err)).into()
}
