//! Content requests: viewers ask for titles, admins mark them fulfilled.

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::orm::content_requests::{self, RequestStatus, RequestType};
use chrono::{NaiveDateTime, Utc};
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct NewRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(rename = "type", alias = "request_type")]
    pub request_type: RequestType,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequestStatusUpdate {
    pub status: RequestStatus,
}

#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: i32,
    pub user_id: Option<i32>,
    pub title: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub language: Option<String>,
    pub status: RequestStatus,
    pub requested_at: NaiveDateTime,
    pub fulfilled_at: Option<NaiveDateTime>,
}

impl From<content_requests::Model> for RequestView {
    fn from(request: content_requests::Model) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            title: request.title,
            request_type: request.request_type,
            language: request.language,
            status: request.status,
            requested_at: request.requested_at,
            fulfilled_at: request.fulfilled_at,
        }
    }
}

fn not_found() -> ApiError {
    ApiError::not_found("Request not found")
}

/// Newest first.
pub async fn list(db: &DatabaseConnection) -> ApiResult<Vec<content_requests::Model>> {
    Ok(content_requests::Entity::find()
        .order_by_desc(content_requests::Column::RequestedAt)
        .order_by_desc(content_requests::Column::Id)
        .all(db)
        .await?)
}

pub async fn create(
    db: &DatabaseConnection,
    user: &AuthUser,
    input: NewRequest,
) -> ApiResult<content_requests::Model> {
    input.validate()?;

    let title = input.title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required"));
    }

    let request = content_requests::ActiveModel {
        user_id: Set(Some(user.user_id)),
        title: Set(title.to_string()),
        request_type: Set(input.request_type),
        language: Set(input.language.filter(|l| !l.trim().is_empty())),
        status: Set(RequestStatus::Unfulfilled),
        requested_at: Set(Utc::now().naive_utc()),
        fulfilled_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("user_id {} requested '{}'", user.user_id, request.title);
    Ok(request)
}

/// `fulfilled_at` follows the status: stamped when fulfilled, cleared
/// otherwise.
pub async fn set_status(
    db: &DatabaseConnection,
    id: i32,
    status: RequestStatus,
) -> ApiResult<content_requests::Model> {
    let request = content_requests::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;

    let mut model: content_requests::ActiveModel = request.into();
    model.status = Set(status);
    model.fulfilled_at = Set(match status {
        RequestStatus::Fulfilled => Some(Utc::now().naive_utc()),
        RequestStatus::Unfulfilled => None,
    });

    Ok(model.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: i32) -> ApiResult<content_requests::Model> {
    let request = content_requests::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)?;

    content_requests::Entity::delete_by_id(request.id)
        .exec(db)
        .await?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_name() {
        let input: NewRequest =
            serde_json::from_str(r#"{"title":"Akira","type":"anime","language":"ja"}"#).unwrap();
        assert_eq!(input.request_type, RequestType::Anime);

        assert!(serde_json::from_str::<NewRequest>(r#"{"title":"Akira","type":"opera"}"#).is_err());
    }
}
