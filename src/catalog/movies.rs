//! Movie catalog.

use super::{CatalogQuery, Removed};
use crate::content_id::{self, ContentKind};
use crate::error::{ApiError, ApiResult};
use crate::orm::{movies, trending::ContentType};
use crate::storage::AssetStore;
use crate::trending;
use sea_orm::{entity::*, query::*, ActiveValue::Set, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct MovieInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1888, max = 2100))]
    pub release_year: Option<i32>,
    pub language: Option<String>,
    pub poster_url: Option<String>,
    pub wide_poster_url: Option<String>,
    pub hash_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

impl MovieInput {
    fn apply(self, model: &mut movies::ActiveModel) {
        model.title = Set(self.title.trim().to_string());
        model.description = Set(self.description);
        model.release_year = Set(self.release_year);
        model.language = Set(self.language);
        model.poster_url = Set(self.poster_url);
        model.wide_poster_url = Set(self.wide_poster_url);
        model.hash_code = Set(self.hash_code);
        model.is_premium = Set(self.is_premium);
        model.duration = Set(self.duration);
    }
}

#[derive(Debug, Serialize)]
pub struct MovieView {
    /// Formatted id, `m_<n>`.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub language: Option<String>,
    pub poster_url: Option<String>,
    pub wide_poster_url: Option<String>,
    pub hash_code: Option<String>,
    pub is_premium: bool,
    pub duration: Option<i32>,
}

impl From<movies::Model> for MovieView {
    fn from(movie: movies::Model) -> Self {
        Self {
            id: content_id::format(ContentKind::Movie, movie.id),
            title: movie.title,
            description: movie.description,
            release_year: movie.release_year,
            language: movie.language,
            poster_url: movie.poster_url,
            wide_poster_url: movie.wide_poster_url,
            hash_code: movie.hash_code,
            is_premium: movie.is_premium,
            duration: movie.duration,
        }
    }
}

fn not_found() -> ApiError {
    ApiError::not_found("Movie not found")
}

/// Newest first.
pub async fn list(db: &DatabaseConnection, query: &CatalogQuery) -> ApiResult<Vec<MovieView>> {
    let mut select = movies::Entity::find().order_by_desc(movies::Column::Id);

    if let Some(q) = query.search() {
        select = select.filter(movies::Column::Title.contains(q));
    }
    if let Some(limit) = query.limit() {
        select = select.limit(limit);
    }

    Ok(select
        .all(db)
        .await?
        .into_iter()
        .map(MovieView::from)
        .collect())
}

pub async fn get(db: &DatabaseConnection, id: i32) -> ApiResult<movies::Model> {
    movies::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}

pub async fn create(db: &DatabaseConnection, input: MovieInput) -> ApiResult<movies::Model> {
    input.validate()?;

    let mut model: movies::ActiveModel = Default::default();
    input.apply(&mut model);
    let movie = model.insert(db).await?;

    log::info!("Created movie {} ({})", movie.id, movie.title);
    Ok(movie)
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    input: MovieInput,
) -> ApiResult<movies::Model> {
    input.validate()?;

    let mut model: movies::ActiveModel = get(db, id).await?.into();
    input.apply(&mut model);
    Ok(model.update(db).await?)
}

/// Removes the movie together with any trending slots pointing at it. The
/// slots' videos are deleted from storage after the rows are gone.
pub async fn delete(
    db: &DatabaseConnection,
    store: &dyn AssetStore,
    id: i32,
) -> ApiResult<Removed<movies::Model>> {
    let movie = get(db, id).await?;

    let txn = db.begin().await?;
    let slots = trending::delete_for_content(&txn, ContentType::Movie, id).await?;
    movies::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    log::info!(
        "Deleted movie {} ({}) and {} trending slot(s)",
        movie.id,
        movie.title,
        slots.len()
    );
    Ok(Removed {
        model: movie,
        trending: trending::remove_videos(store, slots).await,
    })
}
