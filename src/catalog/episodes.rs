//! Episode upsert keyed on (series_id, episode_number, status).

use crate::datetime::optional_date;
use crate::error::{conflict_on_duplicate, ApiError, ApiResult};
use crate::orm::episodes::{self, EpisodeStatus};
use chrono::NaiveDate;
use sea_orm::{
    entity::*, query::*, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct EpisodeInput {
    #[validate(range(min = 0))]
    pub episode_number: i32,
    #[serde(default, deserialize_with = "optional_date")]
    pub release_date: Option<NaiveDate>,
    pub hash_code: Option<String>,
    #[serde(default)]
    pub status: EpisodeStatus,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BulkEpisodes {
    pub episodes: Vec<EpisodeInput>,
}

#[derive(Debug, Serialize)]
pub struct EpisodeView {
    pub id: i32,
    pub series_id: i32,
    pub episode_number: i32,
    pub release_date: Option<NaiveDate>,
    pub hash_code: Option<String>,
    pub status: EpisodeStatus,
    pub duration: Option<i32>,
}

impl From<episodes::Model> for EpisodeView {
    fn from(episode: episodes::Model) -> Self {
        Self {
            id: episode.id,
            series_id: episode.series_id,
            episode_number: episode.episode_number,
            release_date: episode.release_date,
            hash_code: episode.hash_code,
            status: episode.status,
            duration: episode.duration,
        }
    }
}

/// Result of a single upsert.
#[derive(Debug, Serialize)]
pub struct UpsertedEpisode {
    #[serde(flatten)]
    pub episode: EpisodeView,
    pub created: bool,
}

/// Updates the episode with the same natural key or inserts a new one.
/// The boolean is true when a row was inserted.
pub async fn upsert<C>(
    conn: &C,
    series_id: i32,
    input: &EpisodeInput,
) -> Result<(episodes::Model, bool), DbErr>
where
    C: ConnectionTrait,
{
    let existing = episodes::Entity::find()
        .filter(episodes::Column::SeriesId.eq(series_id))
        .filter(episodes::Column::EpisodeNumber.eq(input.episode_number))
        .filter(episodes::Column::Status.eq(input.status))
        .one(conn)
        .await?;

    match existing {
        Some(episode) => {
            let mut model: episodes::ActiveModel = episode.into();
            model.hash_code = Set(input.hash_code.clone());
            model.release_date = Set(input.release_date);
            model.duration = Set(input.duration);
            Ok((model.update(conn).await?, false))
        }
        None => {
            let episode = episodes::ActiveModel {
                series_id: Set(series_id),
                episode_number: Set(input.episode_number),
                release_date: Set(input.release_date),
                hash_code: Set(input.hash_code.clone()),
                status: Set(input.status),
                duration: Set(input.duration),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            Ok((episode, true))
        }
    }
}

fn concurrent_write(e: DbErr) -> ApiError {
    conflict_on_duplicate(e, "Episode was written concurrently, please retry")
}

pub async fn upsert_one(
    db: &DatabaseConnection,
    series_id: i32,
    input: EpisodeInput,
) -> ApiResult<UpsertedEpisode> {
    input.validate()?;
    super::series::get(db, series_id).await?;

    let (episode, created) = upsert(db, series_id, &input)
        .await
        .map_err(concurrent_write)?;
    log::info!(
        "{} episode {} ({:?}) of series {}",
        if created { "Added" } else { "Updated" },
        episode.episode_number,
        episode.status,
        series_id
    );

    Ok(UpsertedEpisode {
        episode: episode.into(),
        created,
    })
}

/// All-or-nothing: any failure rolls back every episode in the batch.
pub async fn upsert_bulk(
    db: &DatabaseConnection,
    series_id: i32,
    inputs: Vec<EpisodeInput>,
) -> ApiResult<Vec<UpsertedEpisode>> {
    if inputs.is_empty() {
        return Err(ApiError::bad_request("No episodes provided"));
    }
    for input in &inputs {
        input.validate()?;
    }
    super::series::get(db, series_id).await?;

    let txn = db.begin().await?;
    let mut results = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let (episode, created) = upsert(&txn, series_id, input)
            .await
            .map_err(concurrent_write)?;
        results.push(UpsertedEpisode {
            episode: episode.into(),
            created,
        });
    }
    txn.commit().await?;

    log::info!(
        "Upserted {} episodes for series {}",
        results.len(),
        series_id
    );
    Ok(results)
}

pub async fn delete(
    db: &DatabaseConnection,
    series_id: i32,
    episode_id: i32,
) -> ApiResult<episodes::Model> {
    let episode = episodes::Entity::find_by_id(episode_id)
        .filter(episodes::Column::SeriesId.eq(series_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Episode not found"))?;

    episodes::Entity::delete_by_id(episode.id).exec(db).await?;
    log::info!("Deleted episode {} of series {}", episode.id, series_id);
    Ok(episode)
}
