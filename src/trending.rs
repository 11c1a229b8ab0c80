//! Trending slots: up to [`MAX_POSITION`] ranked entries per trending type.
//!
//! A row holds its slot while it is active, i.e. `expires_at` is NULL or in
//! the future. Expired rows are ignored by every read and deleted when a new
//! entry claims their slot. Slot checks run inside the same transaction as the
//! write they guard.

use crate::content_id::{self, ContentKind, IdParam};
use crate::error::{conflict_on_duplicate, ApiError, ApiResult};
use crate::orm::trending::{self, ContentType, TrendingType};
use crate::orm::{movies, series};
use crate::storage::{AssetRef, AssetStore};
use crate::datetime::parse_timestamp;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    entity::*, query::*, sea_query::Condition, ActiveValue::Set, ConnectionTrait,
    DatabaseConnection, DbErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};

pub const MAX_POSITION: i32 = 10;

#[derive(Debug, Deserialize)]
pub struct NewTrending {
    pub content_id: IdParam,
    pub content_type: ContentType,
    pub trending_type: TrendingType,
    pub position: i32,
    pub video_url: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingUpdate {
    pub position: i32,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingFilter {
    pub trending_type: Option<TrendingType>,
}

#[derive(Debug, Serialize)]
pub struct TrendingView {
    pub id: i32,
    /// Formatted according to `content_type`.
    pub content_id: String,
    pub content_type: ContentType,
    pub trending_type: TrendingType,
    pub position: i32,
    pub video_url: String,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl From<trending::Model> for TrendingView {
    fn from(row: trending::Model) -> Self {
        Self {
            id: row.id,
            content_id: content_id::format(kind_of(row.content_type), row.content_id),
            content_type: row.content_type,
            trending_type: row.trending_type,
            position: row.position,
            video_url: row.video_url,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Outcome of removing a slot. The row is always gone; the asset may not be.
#[derive(Debug, Serialize)]
pub struct TrendingDeletion {
    pub deleted: TrendingView,
    pub asset_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_error: Option<String>,
}

fn kind_of(content_type: ContentType) -> ContentKind {
    match content_type {
        ContentType::Movie => ContentKind::Movie,
        ContentType::Series => ContentKind::Series,
    }
}

/// Movies trend as `movie`; series trend as `series` or `anime`.
pub fn is_compatible(content_type: ContentType, trending_type: TrendingType) -> bool {
    matches!(
        (content_type, trending_type),
        (ContentType::Movie, TrendingType::Movie)
            | (ContentType::Series, TrendingType::Series)
            | (ContentType::Series, TrendingType::Anime)
    )
}

fn slot_taken(trending_type: TrendingType, position: i32) -> String {
    format!(
        "Position {} is already taken for {:?} trending",
        position, trending_type
    )
}

fn check_position(position: i32) -> ApiResult<()> {
    if (1..=MAX_POSITION).contains(&position) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Position must be between 1 and {}",
            MAX_POSITION
        )))
    }
}

fn active_condition(now: NaiveDateTime) -> Condition {
    Condition::any()
        .add(trending::Column::ExpiresAt.is_null())
        .add(trending::Column::ExpiresAt.gt(now))
}

fn expired_condition(now: NaiveDateTime) -> Condition {
    Condition::all()
        .add(trending::Column::ExpiresAt.is_not_null())
        .add(trending::Column::ExpiresAt.lte(now))
}

/// Active rows ordered by position.
pub async fn list_active(
    db: &DatabaseConnection,
    trending_type: Option<TrendingType>,
) -> ApiResult<Vec<trending::Model>> {
    let mut select = trending::Entity::find().filter(active_condition(Utc::now().naive_utc()));
    if let Some(trending_type) = trending_type {
        select = select.filter(trending::Column::TrendingType.eq(trending_type));
    }

    Ok(select
        .order_by_asc(trending::Column::Position)
        .order_by_asc(trending::Column::TrendingType)
        .all(db)
        .await?)
}

/// Positions 1 through 10 not held by an active row of this type.
pub async fn available_positions(
    db: &DatabaseConnection,
    trending_type: TrendingType,
) -> ApiResult<Vec<i32>> {
    let taken: Vec<i32> = list_active(db, Some(trending_type))
        .await?
        .into_iter()
        .map(|row| row.position)
        .collect();

    Ok((1..=MAX_POSITION).filter(|p| !taken.contains(p)).collect())
}

async fn content_exists<C>(conn: &C, content_type: ContentType, id: i32) -> ApiResult<bool>
where
    C: ConnectionTrait,
{
    Ok(match content_type {
        ContentType::Movie => movies::Entity::find_by_id(id).one(conn).await?.is_some(),
        ContentType::Series => series::Entity::find_by_id(id).one(conn).await?.is_some(),
    })
}

/// Deletes expired rows sitting on the slot, then fails if an active row
/// other than `except` still holds it.
async fn claim_slot<C>(
    conn: &C,
    trending_type: TrendingType,
    position: i32,
    except: Option<i32>,
    now: NaiveDateTime,
) -> ApiResult<()>
where
    C: ConnectionTrait,
{
    let reclaimed = trending::Entity::delete_many()
        .filter(trending::Column::TrendingType.eq(trending_type))
        .filter(trending::Column::Position.eq(position))
        .filter(expired_condition(now))
        .exec(conn)
        .await?
        .rows_affected;
    if reclaimed > 0 {
        log::info!(
            "Reclaimed {} expired {:?} trending row(s) at position {}",
            reclaimed,
            trending_type,
            position
        );
    }

    let mut holder = trending::Entity::find()
        .filter(trending::Column::TrendingType.eq(trending_type))
        .filter(trending::Column::Position.eq(position))
        .filter(active_condition(now));
    if let Some(id) = except {
        holder = holder.filter(trending::Column::Id.ne(id));
    }

    if holder.one(conn).await?.is_some() {
        return Err(ApiError::conflict(slot_taken(trending_type, position)));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: NewTrending) -> ApiResult<trending::Model> {
    check_position(input.position)?;
    let video_url = input.video_url.trim().to_string();
    if video_url.is_empty() {
        return Err(ApiError::bad_request("video_url is required"));
    }
    if !is_compatible(input.content_type, input.trending_type) {
        return Err(ApiError::bad_request(format!(
            "A {:?} cannot trend as {:?}",
            input.content_type, input.trending_type
        )));
    }
    let expires_at = parse_timestamp(input.expires_at.as_deref())?;
    let content_id = input.content_id.0;
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;

    if !content_exists(&txn, input.content_type, content_id).await? {
        return Err(ApiError::not_found(format!(
            "{} {} not found",
            kind_of(input.content_type),
            content_id::format(kind_of(input.content_type), content_id)
        )));
    }

    claim_slot(&txn, input.trending_type, input.position, None, now).await?;

    let duplicate = trending::Entity::find()
        .filter(trending::Column::ContentId.eq(content_id))
        .filter(trending::Column::ContentType.eq(input.content_type))
        .filter(trending::Column::TrendingType.eq(input.trending_type))
        .filter(active_condition(now))
        .one(&txn)
        .await?;
    if let Some(existing) = duplicate {
        return Err(ApiError::conflict(format!(
            "This content is already trending at position {}",
            existing.position
        )));
    }

    let row = trending::ActiveModel {
        content_id: Set(content_id),
        content_type: Set(input.content_type),
        trending_type: Set(input.trending_type),
        position: Set(input.position),
        video_url: Set(video_url),
        expires_at: Set(expires_at),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| conflict_on_duplicate(e, slot_taken(input.trending_type, input.position)))?;

    txn.commit().await?;

    log::info!(
        "Trending {:?} position {} set to {}",
        row.trending_type,
        row.position,
        content_id::format(kind_of(row.content_type), row.content_id)
    );
    Ok(row)
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: TrendingUpdate,
) -> ApiResult<trending::Model> {
    check_position(input.position)?;
    let expires_at = parse_timestamp(input.expires_at.as_deref())?;
    let now = Utc::now().naive_utc();

    let txn = db.begin().await?;

    let row = trending::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ApiError::not_found("Trending item not found"))?;

    claim_slot(&txn, row.trending_type, input.position, Some(row.id), now).await?;

    let trending_type = row.trending_type;
    let mut model: trending::ActiveModel = row.into();
    model.position = Set(input.position);
    model.expires_at = Set(expires_at);
    let row = model
        .update(&txn)
        .await
        .map_err(|e| conflict_on_duplicate(e, slot_taken(trending_type, input.position)))?;

    txn.commit().await?;
    Ok(row)
}

/// Best-effort removal of a slot's video. Failures are logged and reported,
/// never returned as errors.
async fn remove_video(store: &dyn AssetStore, row: trending::Model) -> TrendingDeletion {
    let asset_result = match AssetRef::from_url(&row.video_url) {
        Ok(asset) => store.delete(&asset).await,
        Err(e) => Err(e),
    };

    let (asset_deleted, asset_error) = match asset_result {
        Ok(()) => (true, None),
        Err(e) => {
            log::warn!(
                "Trending row {} removed but its video was not deleted from {}: {}",
                row.id,
                store.name(),
                e
            );
            (false, Some(e.to_string()))
        }
    };

    TrendingDeletion {
        deleted: row.into(),
        asset_deleted,
        asset_error,
    }
}

/// Deletes the row, then tries to remove its video from storage. Storage
/// failures are reported but never undo the row deletion.
pub async fn delete(
    db: &DatabaseConnection,
    store: &dyn AssetStore,
    id: i32,
) -> ApiResult<TrendingDeletion> {
    let row = trending::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Trending item not found"))?;

    trending::Entity::delete_by_id(row.id).exec(db).await?;
    log::info!(
        "Removed trending {:?} position {}",
        row.trending_type,
        row.position
    );

    Ok(remove_video(store, row).await)
}

/// Deletes every slot pointing at a title and returns the removed rows.
/// Runs on the caller's connection so it can share the title's transaction;
/// pass the rows to [`remove_videos`] once that transaction has committed.
pub async fn delete_for_content<C>(
    conn: &C,
    content_type: ContentType,
    content_id: i32,
) -> Result<Vec<trending::Model>, DbErr>
where
    C: ConnectionTrait,
{
    let rows = trending::Entity::find()
        .filter(trending::Column::ContentType.eq(content_type))
        .filter(trending::Column::ContentId.eq(content_id))
        .all(conn)
        .await?;

    if !rows.is_empty() {
        trending::Entity::delete_many()
            .filter(trending::Column::ContentType.eq(content_type))
            .filter(trending::Column::ContentId.eq(content_id))
            .exec(conn)
            .await?;
    }
    Ok(rows)
}

pub async fn remove_videos(
    store: &dyn AssetStore,
    rows: Vec<trending::Model>,
) -> Vec<TrendingDeletion> {
    let mut removed = Vec::with_capacity(rows.len());
    for row in rows {
        removed.push(remove_video(store, row).await);
    }
    removed
}
