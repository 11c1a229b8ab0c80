/// Integration tests for poster deletion and catalog clean-up
mod common;

use common::*;
use nikoflix::content_id::IdParam;
use nikoflix::error::ApiError;
use nikoflix::media::{delete_image, DeleteImage};
use nikoflix::orm::{movies, series};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection};
use std::sync::Arc;

const POSTER: &str = "https://res.cloudinary.com/demo/image/upload/v1712/posters/dune.jpg";
const WIDE: &str = "https://res.cloudinary.com/demo/image/upload/v1712/posters/dune_wide.jpg";

fn request(url: &str, content_type: Option<&str>, content_id: Option<i32>) -> DeleteImage {
    DeleteImage {
        image_url: url.to_string(),
        content_type: content_type.map(str::to_string),
        content_id: content_id.map(IdParam),
    }
}

async fn movie_with_posters(db: &DatabaseConnection) -> movies::Model {
    movies::ActiveModel {
        title: Set("Dune".to_string()),
        poster_url: Set(Some(POSTER.to_string())),
        wide_poster_url: Set(Some(WIDE.to_string())),
        is_premium: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create movie")
}

#[actix_rt::test]
async fn test_named_row_clears_matching_column_only() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let movie = movie_with_posters(&db).await;
    let store = Arc::new(RecordingStore::default());

    let outcome = delete_image(&db, store.as_ref(), request(POSTER, Some("movies"), Some(movie.id)))
        .await
        .unwrap();

    assert_eq!(store.deleted_ids(), vec!["posters/dune".to_string()]);
    assert_eq!(outcome.resource_type, "image");
    let update = outcome.database_update.expect("Row should be reported");
    assert_eq!(update.table, "movies");
    assert_eq!(update.record.id, format!("m_{}", movie.id));

    let row = movies::Entity::find_by_id(movie.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.poster_url.as_deref(), Some(""));
    assert_eq!(row.wide_poster_url.as_deref(), Some(WIDE));
}

#[actix_rt::test]
async fn test_search_prefers_series() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let movie = movie_with_posters(&db).await;
    let show = series::ActiveModel {
        title: Set("Dune: Prophecy".to_string()),
        wide_poster_url: Set(Some(WIDE.to_string())),
        is_animated: Set(false),
        is_premium: Set(false),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    let outcome = delete_image(&db, &RecordingStore::default(), request(WIDE, None, None))
        .await
        .unwrap();
    let update = outcome.database_update.unwrap();
    assert_eq!(update.table, "series");
    assert_eq!(update.record.id, format!("s_{}", show.id));

    // The movie still references the same URL; it is left alone.
    let row = movies::Entity::find_by_id(movie.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.wide_poster_url.as_deref(), Some(WIDE));
}

#[actix_rt::test]
async fn test_unreferenced_image_is_still_deleted() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let store = RecordingStore::default();

    let outcome = delete_image(
        &db,
        &store,
        request("https://res.cloudinary.com/demo/image/upload/orphan.png", None, None),
    )
    .await
    .unwrap();

    assert!(outcome.database_update.is_none());
    assert_eq!(store.deleted_ids(), vec!["orphan".to_string()]);
}

#[actix_rt::test]
async fn test_storage_failure_leaves_catalog_untouched() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let movie = movie_with_posters(&db).await;

    let err = delete_image(&db, &FailingStore, request(POSTER, None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Upstream(_)));

    let row = movies::Entity::find_by_id(movie.id).one(&db).await.unwrap().unwrap();
    assert_eq!(row.poster_url.as_deref(), Some(POSTER));
}

#[actix_rt::test]
async fn test_request_validation() {
    let db = setup_test_database().await.expect("Failed to set up database");
    let store = RecordingStore::default();

    let err = delete_image(&db, &store, request("  ", None, None)).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = delete_image(&db, &store, request(POSTER, Some("episodes"), Some(3)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = delete_image(&db, &store, request("not a url", None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    assert!(store.deleted_ids().is_empty());
}
