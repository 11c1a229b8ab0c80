//! Likes and comments on movies, series and episodes.

use crate::content_id::IdParam;
use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::orm::{comments, episodes, likes, movies, series, users};
use chrono::{NaiveDateTime, Utc};
use sea_orm::{entity::*, query::*, sea_query::Condition, ActiveValue::Set, DatabaseConnection};
use serde::{Deserialize, Serialize};

pub const MAX_COMMENT_LENGTH: usize = 5000;

/// What a like or comment is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Movie(i32),
    Series(i32),
    Episode(i32),
}

/// Target ids as they arrive in a query string or JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct TargetParams {
    pub movie_id: Option<IdParam>,
    pub series_id: Option<IdParam>,
    pub episode_id: Option<i32>,
}

impl TargetParams {
    pub fn exactly_one(&self) -> ApiResult<Target> {
        match (&self.movie_id, &self.series_id, self.episode_id) {
            (Some(id), None, None) => Ok(Target::Movie(id.0)),
            (None, Some(id), None) => Ok(Target::Series(id.0)),
            (None, None, Some(id)) => Ok(Target::Episode(id)),
            (None, None, None) => Err(ApiError::bad_request(
                "movie_id, series_id or episode_id required",
            )),
            _ => Err(ApiError::bad_request(
                "Only one of movie_id, series_id or episode_id may be given",
            )),
        }
    }
}

impl Target {
    fn columns(self) -> (Option<i32>, Option<i32>, Option<i32>) {
        match self {
            Target::Movie(id) => (Some(id), None, None),
            Target::Series(id) => (None, Some(id), None),
            Target::Episode(id) => (None, None, Some(id)),
        }
    }

    fn like_condition(self) -> Condition {
        match self {
            Target::Movie(id) => Condition::all().add(likes::Column::MovieId.eq(id)),
            Target::Series(id) => Condition::all().add(likes::Column::SeriesId.eq(id)),
            Target::Episode(id) => Condition::all().add(likes::Column::EpisodeId.eq(id)),
        }
    }

    async fn ensure_exists(self, db: &DatabaseConnection) -> ApiResult<()> {
        let found = match self {
            Target::Movie(id) => movies::Entity::find_by_id(id).one(db).await?.is_some(),
            Target::Series(id) => series::Entity::find_by_id(id).one(db).await?.is_some(),
            Target::Episode(id) => episodes::Entity::find_by_id(id).one(db).await?.is_some(),
        };

        if found {
            Ok(())
        } else {
            Err(ApiError::not_found(match self {
                Target::Movie(_) => "Movie not found",
                Target::Series(_) => "Series not found",
                Target::Episode(_) => "Episode not found",
            }))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeView {
    pub id: i32,
    pub user_id: i32,
    pub movie_id: Option<i32>,
    pub series_id: Option<i32>,
    pub episode_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl From<likes::Model> for LikeView {
    fn from(like: likes::Model) -> Self {
        Self {
            id: like.id,
            user_id: like.user_id,
            movie_id: like.movie_id,
            series_id: like.series_id,
            episode_id: like.episode_id,
            created_at: like.created_at,
        }
    }
}

pub async fn count_likes(db: &DatabaseConnection, target: Target) -> ApiResult<u64> {
    Ok(likes::Entity::find()
        .filter(target.like_condition())
        .count(db)
        .await? as u64)
}

pub async fn add_like(
    db: &DatabaseConnection,
    user: &AuthUser,
    target: Target,
) -> ApiResult<likes::Model> {
    target.ensure_exists(db).await?;

    let existing = likes::Entity::find()
        .filter(likes::Column::UserId.eq(user.user_id))
        .filter(target.like_condition())
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Already liked"));
    }

    let (movie_id, series_id, episode_id) = target.columns();
    Ok(likes::ActiveModel {
        user_id: Set(user.user_id),
        movie_id: Set(movie_id),
        series_id: Set(series_id),
        episode_id: Set(episode_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?)
}

pub async fn remove_like(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: i32,
) -> ApiResult<likes::Model> {
    let like = likes::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Like not found"))?;

    if !user.can_modify(like.user_id) {
        return Err(ApiError::forbidden("You can only remove your own likes"));
    }

    likes::Entity::delete_by_id(like.id).exec(db).await?;
    Ok(like)
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    #[serde(flatten)]
    pub target: TargetParams,
    pub comment_text: String,
    pub parent_comment_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub movie_id: Option<i32>,
    pub series_id: Option<i32>,
    pub episode_id: Option<i32>,
    pub comment_text: String,
    pub parent_comment_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

impl CommentView {
    pub fn new(comment: comments::Model, username: Option<String>) -> Self {
        Self {
            id: comment.id,
            user_id: comment.user_id,
            username,
            movie_id: comment.movie_id,
            series_id: comment.series_id,
            episode_id: comment.episode_id,
            comment_text: comment.comment_text,
            parent_comment_id: comment.parent_comment_id,
            created_at: comment.created_at,
        }
    }
}

/// Newest first, each with its author's username. Filters combine.
pub async fn list_comments(
    db: &DatabaseConnection,
    params: &TargetParams,
) -> ApiResult<Vec<CommentView>> {
    let mut select = comments::Entity::find();
    if let Some(id) = &params.movie_id {
        select = select.filter(comments::Column::MovieId.eq(id.0));
    }
    if let Some(id) = &params.series_id {
        select = select.filter(comments::Column::SeriesId.eq(id.0));
    }
    if let Some(id) = params.episode_id {
        select = select.filter(comments::Column::EpisodeId.eq(id));
    }

    Ok(select
        .order_by_desc(comments::Column::CreatedAt)
        .order_by_desc(comments::Column::Id)
        .find_also_related(users::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(comment, author)| CommentView::new(comment, author.map(|u| u.username)))
        .collect())
}

pub async fn add_comment(
    db: &DatabaseConnection,
    user: &AuthUser,
    input: NewComment,
) -> ApiResult<comments::Model> {
    let target = input.target.exactly_one()?;

    let text = input.comment_text.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("Comment text is required"));
    }
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LENGTH
        )));
    }

    target.ensure_exists(db).await?;
    let (movie_id, series_id, episode_id) = target.columns();

    if let Some(parent_id) = input.parent_comment_id {
        let parent = comments::Entity::find_by_id(parent_id).one(db).await?;
        let same_target = parent.map_or(false, |p| {
            (p.movie_id, p.series_id, p.episode_id) == (movie_id, series_id, episode_id)
        });
        if !same_target {
            return Err(ApiError::bad_request(
                "Parent comment not found on this content",
            ));
        }
    }

    let comment = comments::ActiveModel {
        user_id: Set(user.user_id),
        movie_id: Set(movie_id),
        series_id: Set(series_id),
        episode_id: Set(episode_id),
        comment_text: Set(text.to_string()),
        parent_comment_id: Set(input.parent_comment_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!("user_id {} commented ({})", user.user_id, comment.id);
    Ok(comment)
}

pub async fn remove_comment(
    db: &DatabaseConnection,
    user: &AuthUser,
    id: i32,
) -> ApiResult<comments::Model> {
    let comment = comments::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if !user.can_modify(comment.user_id) {
        return Err(ApiError::forbidden("You can only delete your own comments"));
    }

    comments::Entity::delete_by_id(comment.id).exec(db).await?;
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(json: &str) -> TargetParams {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_exactly_one_target() {
        assert_eq!(
            params(r#"{"movie_id":"m_4"}"#).exactly_one().unwrap(),
            Target::Movie(4)
        );
        assert_eq!(
            params(r#"{"series_id":9}"#).exactly_one().unwrap(),
            Target::Series(9)
        );
        assert_eq!(
            params(r#"{"episode_id":12}"#).exactly_one().unwrap(),
            Target::Episode(12)
        );
        assert!(params("{}").exactly_one().is_err());
        assert!(params(r#"{"movie_id":1,"series_id":2}"#)
            .exactly_one()
            .is_err());
    }
}
