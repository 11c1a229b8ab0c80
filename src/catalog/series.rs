//! Series catalog.

use super::episodes::EpisodeView;
use super::{CatalogQuery, Removed};
use crate::content_id::{self, ContentKind};
use crate::error::{ApiError, ApiResult};
use crate::orm::{episodes, series, trending::ContentType};
use crate::storage::AssetStore;
use crate::trending;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SeriesInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1888, max = 2100))]
    pub release_year: Option<i32>,
    pub language: Option<String>,
    #[serde(default)]
    pub is_animated: bool,
    pub poster_url: Option<String>,
    pub wide_poster_url: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

impl SeriesInput {
    fn apply(self, model: &mut series::ActiveModel) {
        model.title = Set(self.title.trim().to_string());
        model.description = Set(self.description);
        model.release_year = Set(self.release_year);
        model.language = Set(self.language);
        model.is_animated = Set(self.is_animated);
        model.poster_url = Set(self.poster_url);
        model.wide_poster_url = Set(self.wide_poster_url);
        model.is_premium = Set(self.is_premium);
    }
}

#[derive(Debug, Serialize)]
pub struct SeriesView {
    /// Formatted id, `s_<n>`.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub language: Option<String>,
    pub is_animated: bool,
    pub poster_url: Option<String>,
    pub wide_poster_url: Option<String>,
    pub is_premium: bool,
}

impl From<series::Model> for SeriesView {
    fn from(series: series::Model) -> Self {
        Self {
            id: content_id::format(ContentKind::Series, series.id),
            title: series.title,
            description: series.description,
            release_year: series.release_year,
            language: series.language,
            is_animated: series.is_animated,
            poster_url: series.poster_url,
            wide_poster_url: series.wide_poster_url,
            is_premium: series.is_premium,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeriesDetail {
    #[serde(flatten)]
    pub series: SeriesView,
    pub episodes: Vec<EpisodeView>,
}

pub(crate) fn not_found() -> ApiError {
    ApiError::not_found("Series not found")
}

/// Newest first.
pub async fn list(db: &DatabaseConnection, query: &CatalogQuery) -> ApiResult<Vec<SeriesView>> {
    let mut select = series::Entity::find().order_by_desc(series::Column::Id);

    if let Some(q) = query.search() {
        select = select.filter(series::Column::Title.contains(q));
    }
    if let Some(animated) = query.is_animated {
        select = select.filter(series::Column::IsAnimated.eq(animated));
    }
    if let Some(limit) = query.limit() {
        select = select.limit(limit);
    }

    Ok(select
        .all(db)
        .await?
        .into_iter()
        .map(SeriesView::from)
        .collect())
}

pub async fn get(db: &DatabaseConnection, id: i32) -> ApiResult<series::Model> {
    series::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

/// Series with its episodes ordered by number, then audio track.
pub async fn get_with_episodes(db: &DatabaseConnection, id: i32) -> ApiResult<SeriesDetail> {
    let series = get(db, id).await?;

    let episodes = episodes::Entity::find()
        .filter(episodes::Column::SeriesId.eq(id))
        .order_by_asc(episodes::Column::EpisodeNumber)
        .order_by_asc(episodes::Column::Status)
        .all(db)
        .await?;

    Ok(SeriesDetail {
        series: series.into(),
        episodes: episodes.into_iter().map(EpisodeView::from).collect(),
    })
}

pub async fn create(db: &DatabaseConnection, input: SeriesInput) -> ApiResult<series::Model> {
    input.validate()?;

    let mut model: series::ActiveModel = Default::default();
    input.apply(&mut model);
    let series = model.insert(db).await?;

    log::info!("Created series {} ({})", series.id, series.title);
    Ok(series)
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: SeriesInput,
) -> ApiResult<series::Model> {
    input.validate()?;

    let mut model: series::ActiveModel = get(db, id).await?.into();
    input.apply(&mut model);
    Ok(model.update(db).await?)
}

/// Removes the series, its episodes and any trending slots pointing at it.
/// The slots' videos are deleted from storage after the rows are gone.
pub async fn delete(
    db: &DatabaseConnection,
    store: &dyn AssetStore,
    id: i32,
) -> ApiResult<Removed<series::Model>> {
    let series = get(db, id).await?;

    let txn = db.begin().await?;
    let slots = trending::delete_for_content(&txn, ContentType::Series, id).await?;
    episodes::Entity::delete_many()
        .filter(episodes::Column::SeriesId.eq(id))
        .exec(&txn)
        .await?;
    series::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    log::info!(
        "Deleted series {} ({}) and {} trending slot(s)",
        series.id,
        series.title,
        slots.len()
    );
    Ok(Removed {
        model: series,
        trending: trending::remove_videos(store, slots).await,
    })
}
