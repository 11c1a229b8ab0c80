//! Poster deletion: remove the hosted image, then clear any catalog column
//! still pointing at it.

use crate::content_id::{self, optional_id, ContentKind, IdParam};
use crate::error::{ApiError, ApiResult};
use crate::orm::{movies, series};
use crate::storage::{AssetRef, AssetStore};
use sea_orm::{entity::*, query::*, sea_query::Condition, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DeleteImage {
    pub image_url: String,
    /// `movies` or `series`.
    pub content_type: Option<String>,
    /// `7`, `"7"` or `"m_7"`.
    #[serde(default, deserialize_with = "optional_id")]
    pub content_id: Option<IdParam>,
}

/// Row after its poster columns were cleared.
#[derive(Debug, Serialize)]
pub struct PosterRecord {
    pub id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub wide_poster_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DatabaseUpdate {
    pub table: &'static str,
    pub record: PosterRecord,
}

#[derive(Debug, Serialize)]
pub struct DeleteImageOutcome {
    pub message: String,
    pub asset: String,
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_update: Option<DatabaseUpdate>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PosterTable {
    Movies,
    Series,
}

impl PosterTable {
    fn parse(raw: &str) -> ApiResult<Self> {
        match raw.trim() {
            "movies" | "movie" => Ok(PosterTable::Movies),
            "series" => Ok(PosterTable::Series),
            _ => Err(ApiError::bad_request(
                "content_type must be 'series' or 'movies'",
            )),
        }
    }

    fn name(self) -> &'static str {
        match self {
            PosterTable::Movies => "movies",
            PosterTable::Series => "series",
        }
    }
}

/// `Some("")` for the column equal to `url`, `NotSet` otherwise.
fn cleared(column: &Option<String>, url: &str) -> ActiveValue<Option<String>> {
    if column.as_deref() == Some(url) {
        Set(Some(String::new()))
    } else {
        ActiveValue::NotSet
    }
}

async fn clear_movie(
    db: &DatabaseConnection,
    movie: movies::Model,
    url: &str,
) -> ApiResult<DatabaseUpdate> {
    let poster_url = cleared(&movie.poster_url, url);
    let wide_poster_url = cleared(&movie.wide_poster_url, url);

    let movie = if poster_url.is_set() || wide_poster_url.is_set() {
        let mut model: movies::ActiveModel = movie.into();
        model.poster_url = poster_url;
        model.wide_poster_url = wide_poster_url;
        model.update(db).await?
    } else {
        movie
    };

    Ok(DatabaseUpdate {
        table: PosterTable::Movies.name(),
        record: PosterRecord {
            id: content_id::format(ContentKind::Movie, movie.id),
            title: movie.title,
            poster_url: movie.poster_url,
            wide_poster_url: movie.wide_poster_url,
        },
    })
}

async fn clear_series(
    db: &DatabaseConnection,
    series: series::Model,
    url: &str,
) -> ApiResult<DatabaseUpdate> {
    let poster_url = cleared(&series.poster_url, url);
    let wide_poster_url = cleared(&series.wide_poster_url, url);

    let series = if poster_url.is_set() || wide_poster_url.is_set() {
        let mut model: series::ActiveModel = series.into();
        model.poster_url = poster_url;
        model.wide_poster_url = wide_poster_url;
        model.update(db).await?
    } else {
        series
    };

    Ok(DatabaseUpdate {
        table: PosterTable::Series.name(),
        record: PosterRecord {
            id: content_id::format(ContentKind::Series, series.id),
            title: series.title,
            poster_url: series.poster_url,
            wide_poster_url: series.wide_poster_url,
        },
    })
}

/// Clears the named row, whether or not it referenced the URL.
async fn update_named(
    db: &DatabaseConnection,
    table: PosterTable,
    id: i32,
    url: &str,
) -> ApiResult<Option<DatabaseUpdate>> {
    match table {
        PosterTable::Movies => match movies::Entity::find_by_id(id).one(db).await? {
            Some(movie) => Ok(Some(clear_movie(db, movie, url).await?)),
            None => Ok(None),
        },
        PosterTable::Series => match series::Entity::find_by_id(id).one(db).await? {
            Some(series) => Ok(Some(clear_series(db, series, url).await?)),
            None => Ok(None),
        },
    }
}

/// Series first, then movies.
async fn update_by_search(db: &DatabaseConnection, url: &str) -> ApiResult<Option<DatabaseUpdate>> {
    let series = series::Entity::find()
        .filter(
            Condition::any()
                .add(series::Column::PosterUrl.eq(url))
                .add(series::Column::WidePosterUrl.eq(url)),
        )
        .one(db)
        .await?;
    if let Some(series) = series {
        return Ok(Some(clear_series(db, series, url).await?));
    }

    let movie = movies::Entity::find()
        .filter(
            Condition::any()
                .add(movies::Column::PosterUrl.eq(url))
                .add(movies::Column::WidePosterUrl.eq(url)),
        )
        .one(db)
        .await?;
    match movie {
        Some(movie) => Ok(Some(clear_movie(db, movie, url).await?)),
        None => Ok(None),
    }
}

/// Deletes the asset first. If storage refuses, the catalog is left as is.
pub async fn delete_image(
    db: &DatabaseConnection,
    store: &dyn AssetStore,
    input: DeleteImage,
) -> ApiResult<DeleteImageOutcome> {
    let url = input.image_url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("Image URL is required"));
    }

    let named = match (input.content_type.as_deref(), input.content_id) {
        (Some(table), Some(IdParam(id))) if !table.trim().is_empty() => {
            Some((PosterTable::parse(table)?, id))
        }
        _ => None,
    };

    let asset = AssetRef::from_url(url).map_err(|e| {
        log::info!("Rejected image URL: {}", e);
        ApiError::bad_request("Could not extract public_id from URL")
    })?;

    if let Err(e) = store.delete(&asset).await {
        log::error!(
            "Failed to delete {} {} from {}: {}",
            asset.resource_type,
            asset.public_id,
            store.name(),
            e
        );
        return Err(ApiError::upstream(format!(
            "Failed to delete image from storage: {}",
            e
        )));
    }
    log::info!("Deleted {} {} from {}", asset.resource_type, asset.public_id, store.name());

    let database_update = match named {
        Some((table, id)) => update_named(db, table, id, url).await?,
        None => update_by_search(db, url).await?,
    };

    let message = match &database_update {
        Some(update) => {
            log::info!("Cleared poster reference in {} {}", update.table, update.record.id);
            "Image deleted successfully and database updated".to_string()
        }
        None => "Image deleted successfully (image not found in database)".to_string(),
    };

    Ok(DeleteImageOutcome {
        message,
        asset: asset.public_id,
        resource_type: asset.resource_type,
        database_update,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_table() {
        assert_eq!(PosterTable::parse("movies").unwrap(), PosterTable::Movies);
        assert_eq!(PosterTable::parse("series").unwrap(), PosterTable::Series);
        assert!(PosterTable::parse("episodes").is_err());
    }

    #[test]
    fn test_cleared_only_matching_column() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1/p.jpg";
        assert!(matches!(
            cleared(&Some(url.to_string()), url),
            ActiveValue::Set(Some(ref s)) if s.is_empty()
        ));
        assert!(matches!(
            cleared(&Some("other".to_string()), url),
            ActiveValue::NotSet
        ));
        assert!(matches!(cleared(&None, url), ActiveValue::NotSet));
    }

    #[test]
    fn test_content_id_accepts_numbers() {
        let body = r#"{"image_url":"https://res.cloudinary.com/demo/image/upload/p.jpg","content_type":"movies","content_id":7}"#;
        let input: DeleteImage = serde_json::from_str(body).unwrap();
        assert_eq!(input.content_id, Some(IdParam(7)));

        let input: DeleteImage =
            serde_json::from_str(r#"{"image_url":"x","content_type":"","content_id":""}"#).unwrap();
        assert!(input.content_id.is_none());

        assert!(serde_json::from_str::<DeleteImage>(r#"{"image_url":"x","content_id":"m_abc"}"#).is_err());
    }
}
