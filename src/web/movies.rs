use super::content_path;
use crate::catalog::movies::{self, MovieInput, MovieView};
use crate::catalog::CatalogQuery;
use crate::error::ApiResult;
use crate::middleware::AdminUser;
use crate::storage::AssetStore;
use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde_json::json;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(list_movies)
        .service(view_movie)
        .service(create_movie)
        .service(update_movie)
        .service(delete_movie);
}

#[get("/movies")]
pub async fn list_movies(
    db: web::Data<DatabaseConnection>,
    query: web::Query<CatalogQuery>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(movies::list(&db, &query).await?))
}

#[get("/movies/{id}")]
pub async fn view_movie(
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let movie = movies::get(&db, content_path(&path)?).await?;
    Ok(HttpResponse::Ok().json(MovieView::from(movie)))
}

#[post("/movies")]
pub async fn create_movie(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<MovieInput>,
) -> ApiResult<HttpResponse> {
    let movie = movies::create(&db, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(MovieView::from(movie)))
}

#[put("/movies/{id}")]
pub async fn update_movie(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    form: web::Json<MovieInput>,
) -> ApiResult<HttpResponse> {
    let movie = movies::update(&db, content_path(&path)?, form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MovieView::from(movie)))
}

#[delete("/movies/{id}")]
pub async fn delete_movie(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    store: web::Data<dyn AssetStore>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let removed = movies::delete(&db, store.get_ref(), content_path(&path)?).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Movie deleted successfully",
        "deleted": MovieView::from(removed.model),
        "trending_removed": removed.trending,
    })))
}
