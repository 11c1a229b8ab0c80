//! `/api/admin` aliases used by the admin dashboard. Each one performs the
//! same operation as its public-prefix counterpart.

use super::content_path;
use super::requests::request_views;
use super::series::upserted_response;
use crate::catalog::episodes::{self, EpisodeInput};
use crate::catalog::movies::{self, MovieInput, MovieView};
use crate::catalog::series::{self, SeriesInput, SeriesView};
use crate::error::ApiResult;
use crate::middleware::AdminUser;
use crate::requests::{self, RequestStatusUpdate, RequestView};
use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

pub(super) fn configure(conf: &mut web::ServiceConfig) {
    conf.service(create_movie)
        .service(create_series)
        .service(upsert_episode)
        .service(list_requests)
        .service(update_request);
}

#[post("/admin/movies")]
pub async fn create_movie(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<MovieInput>,
) -> ApiResult<HttpResponse> {
    let movie = movies::create(&db, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(MovieView::from(movie)))
}

#[post("/admin/series")]
pub async fn create_series(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    form: web::Json<SeriesInput>,
) -> ApiResult<HttpResponse> {
    let series = series::create(&db, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(SeriesView::from(series)))
}

#[post("/admin/series/{id}/episodes")]
pub async fn upsert_episode(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    form: web::Json<EpisodeInput>,
) -> ApiResult<HttpResponse> {
    let result = episodes::upsert_one(&db, content_path(&path)?, form.into_inner()).await?;
    Ok(upserted_response(result))
}

#[get("/admin/requests")]
pub async fn list_requests(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(request_views(&db).await?))
}

#[put("/admin/requests/{id}")]
pub async fn update_request(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
    form: web::Json<RequestStatusUpdate>,
) -> ApiResult<HttpResponse> {
    let request = requests::set_status(&db, path.into_inner(), form.status).await?;
    Ok(HttpResponse::Ok().json(RequestView::from(request)))
}
