use super::content_path;
use crate::catalog::episodes::{self, BulkEpisodes, EpisodeInput, EpisodeView, UpsertedEpisode};
use crate::catalog::series::{self, SeriesInput, SeriesView};
use crate::catalog::CatalogQuery;
use crate::error::ApiResult;
use crate::middleware::AdminUser;
use crate::storage::AssetStore;
use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_series)
        .service(view_series)
        .service(create_series)
        .service(update_series)
        .service(delete_series)
        .service(upsert_episodes_bulk)
        .service(upsert_episode)
        .service(delete_episode);
}

/// 201 when the episode was inserted, 200 when an existing one was updated.
pub(super) fn upserted_response(result: UpsertedEpisode) -> HttpResponse {
    if result.created {
        HttpResponse::Created().json(result)
    } else {
        HttpResponse::Ok().json(result)
    }
}

#[get("/series")]
pub async fn list_series(
    db: web::Data<DatabaseConnection>,
    query: web::Query<CatalogQuery>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(series::list(&db, &query).await?))
}

#[get("/series/{id}")]
pub async fn view_series(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let detail = series::get_with_episodes(&db, content_path(&path)?).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[post("/series")]
pub async fn create_series(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<SeriesInput>,
) -> ApiResult<HttpResponse> {
    let series = series::create(&db, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(SeriesView::from(series)))
}

#[put("/series/{id}")]
pub async fn update_series(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    form: web::Json<SeriesInput>,
) -> ApiResult<HttpResponse> {
    let series = series::update(&db, content_path(&path)?, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SeriesView::from(series)))
}

#[delete("/series/{id}")]
pub async fn delete_series(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    store: web::Data<dyn AssetStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let removed = series::delete(&db, store.get_ref(), content_path(&path)?).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Series and its episodes deleted successfully",
        "deleted": SeriesView::from(removed.model),
        "trending_removed": removed.trending,
    })))
}

#[post("/series/{id}/episodes/bulk")]
pub async fn upsert_episodes_bulk(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    form: web::Json<BulkEpisodes>,
) -> ApiResult<HttpResponse> {
    let series_id = content_path(&path)?;
    let results = episodes::upsert_bulk(&db, series_id, form.into_inner().episodes).await?;
    let created = results.iter().filter(|r| r.created).count();

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Processed {} episodes", results.len()),
        "created": created,
        "updated": results.len() - created,
        "episodes": results,
    })))
}

#[post("/series/{id}/episodes")]
pub async fn upsert_episode(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    form: web::Json<EpisodeInput>,
) -> ApiResult<HttpResponse> {
    let result = episodes::upsert_one(&db, content_path(&path)?, form.into_inner()).await?;
    Ok(upserted_response(result))
}

#[delete("/series/{id}/episodes/{episode_id}")]
pub async fn delete_episode(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(String, i32)>,
) -> ApiResult<HttpResponse> {
    let (series_id, episode_id) = path.into_inner();
    let episode = episodes::delete(&db, content_path(&series_id)?, episode_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Episode deleted successfully",
        "deleted": EpisodeView::from(episode),
    })))
}
